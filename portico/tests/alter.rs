//! Operation dispatch against live handlers.

use portico::{
    AddInboundRequest, AddUser, AlterInboundRequest, AlterOutboundRequest, Capabilities,
    ControlError, Direction, ErrorKind, HandlerService, InboundHandlerConfig, OperationRegistry,
    OverrideBalancerTarget, ProxyHandler, RemoveUser, ServiceConfig, ServiceError, TypedMessage,
    TypedOperation, User,
    testing::{MockManager, PlainHandler},
};
use std::sync::Arc;

mod common;
use common::{
    add_inbound, add_outbound, add_user_message, cx, has_user, inbound, managers, service,
    service_with, user_count,
};

#[tokio::test]
async fn test_add_user_reaches_handler() {
    let service = service();
    add_inbound(&service, "vmess", "c1").await;

    service
        .alter_inbound(
            &cx(),
            AlterInboundRequest::new("vmess", add_user_message("love@example.com")),
        )
        .await
        .unwrap();

    let handler = service.inbound_manager().handler("vmess").unwrap();
    assert!(has_user(&handler, "love@example.com").await);

    service
        .alter_inbound(
            &cx(),
            AlterInboundRequest::operation(
                "vmess",
                &RemoveUser {
                    email: "love@example.com".into(),
                },
            )
            .unwrap(),
        )
        .await
        .unwrap();
    assert!(!has_user(&handler, "love@example.com").await);
}

#[tokio::test]
async fn test_unknown_operation_leaves_handler_untouched() {
    let service = service();
    add_inbound(&service, "vmess", "c1").await;

    let err = service
        .alter_inbound(
            &cx(),
            AlterInboundRequest::new("vmess", TypedMessage::new("acme.Nope", b"{}".to_vec())),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownOperation);
    assert!(err.is_caller_error());
    assert_eq!(
        err.display_chain(),
        "unknown operation: acme.Nope for inbound handler `vmess`"
    );

    let handler = service.inbound_manager().handler("vmess").unwrap();
    assert_eq!(user_count(&handler).await, 0);
}

#[tokio::test]
async fn test_malformed_payload_is_a_decode_error() {
    let service = service();
    add_inbound(&service, "vmess", "c1").await;

    let err = service
        .alter_inbound(
            &cx(),
            AlterInboundRequest::new("vmess", TypedMessage::new(AddUser::TYPE_NAME, b"[".to_vec())),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert!(matches!(
        &err,
        ControlError::Decode { target: Some(target), .. }
            if target.direction == Direction::Inbound && target.tag == "vmess"
    ));
    let expected = format!(
        "failed to decode operation `{}` for inbound handler `vmess`: ",
        AddUser::TYPE_NAME
    );
    assert!(err.display_chain().starts_with(&expected));
}

#[tokio::test]
async fn test_handler_without_capability_is_rejected() {
    let inbound_manager = Arc::new(MockManager::<InboundHandlerConfig>::plain_handlers(
        Direction::Inbound,
    ));
    let (_, outbound_manager) = managers();
    let service = service_with(inbound_manager, outbound_manager);
    add_inbound(&service, "socks", "c1").await;

    let err = service
        .alter_inbound(
            &cx(),
            AlterInboundRequest::new("socks", add_user_message("love@example.com")),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedCapability);
    assert!(matches!(
        err,
        ControlError::UnsupportedCapability { ref tag, .. } if tag == "socks"
    ));
}

#[tokio::test]
async fn test_handler_error_is_a_domain_error() {
    let service = service();
    add_inbound(&service, "vmess", "c1").await;
    let request = AlterInboundRequest::new("vmess", add_user_message("dup@example.com"));

    service.alter_inbound(&cx(), request.clone()).await.unwrap();
    let err = service.alter_inbound(&cx(), request).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Domain);
    assert!(!err.is_caller_error());
    assert_eq!(
        err.display_chain(),
        format!(
            "`{}` failed on inbound handler `vmess`: user dup@example.com already exists",
            AddUser::TYPE_NAME
        )
    );
}

#[tokio::test]
async fn test_invalid_user_is_a_domain_error() {
    let service = service();
    add_inbound(&service, "vmess", "c1").await;

    let err = service
        .alter_inbound(
            &cx(),
            AlterInboundRequest::operation(
                "vmess",
                &AddUser {
                    user: User::new("not an email", 0),
                },
            )
            .unwrap(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Domain);

    let handler = service.inbound_manager().handler("vmess").unwrap();
    assert_eq!(user_count(&handler).await, 0);
}

#[tokio::test]
async fn test_balancer_override_on_outbound() {
    let service = service();
    add_outbound(&service, "balanced").await;

    service
        .alter_outbound(
            &cx(),
            AlterOutboundRequest::operation(
                "balanced",
                &OverrideBalancerTarget {
                    target: "direct".into(),
                },
            )
            .unwrap(),
        )
        .await
        .unwrap();

    let handler = service.outbound_manager().handler("balanced").unwrap();
    let balancer = handler.balancer().unwrap();
    assert_eq!(balancer.current_override_dyn(), Some("direct".to_string()));
}

#[tokio::test]
async fn test_outbound_only_operation_rejected_on_inbound() {
    let service = service();
    add_inbound(&service, "vmess", "c1").await;

    let err = service
        .alter_inbound(
            &cx(),
            AlterInboundRequest::operation(
                "vmess",
                &OverrideBalancerTarget {
                    target: "direct".into(),
                },
            )
            .unwrap(),
        )
        .await
        .unwrap_err();
    assert!(matches!(&err, ControlError::OperationDirection { tag, .. } if tag == "vmess"));
    assert_eq!(err.kind(), ErrorKind::UnsupportedCapability);
}

#[tokio::test]
async fn test_user_operation_on_balancer_outbound() {
    let service = service();
    add_outbound(&service, "balanced").await;

    let err = service
        .alter_outbound(
            &cx(),
            AlterOutboundRequest::new("balanced", add_user_message("love@example.com")),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedCapability);
}

#[tokio::test]
async fn test_handler_of_wrong_direction_is_rejected() {
    let (inbound_manager, outbound_manager) = managers();
    let service = service_with(inbound_manager.clone(), outbound_manager);

    // A misbehaving engine files an outbound handler under the inbound manager.
    let stray: Arc<dyn ProxyHandler> = Arc::new(PlainHandler::new("stray", Direction::Outbound));
    inbound_manager.insert_handler(stray);

    let err = service
        .alter_inbound(
            &cx(),
            AlterInboundRequest::new("stray", add_user_message("love@example.com")),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ControlError::HandlerDirection { .. }));
}

#[tokio::test]
async fn test_alter_does_not_touch_index() {
    let service = service();
    add_inbound(&service, "vmess", "c1").await;

    service
        .alter_inbound(
            &cx(),
            AlterInboundRequest::new("vmess", add_user_message("love@example.com")),
        )
        .await
        .unwrap();

    assert_eq!(
        service.inbound_index().get("vmess"),
        Some(inbound("vmess", "c1"))
    );
}

#[tokio::test]
async fn test_allow_list_limits_operations() {
    let (inbound_manager, outbound_manager) = managers();
    let config = ServiceConfig::from_json_str(&format!(
        r#"{{"operations":["{}"]}}"#,
        AddUser::TYPE_NAME
    ))
    .unwrap();
    let service = HandlerService::builder(inbound_manager, outbound_manager)
        .config(config)
        .build()
        .unwrap();
    service
        .add_inbound(&cx(), AddInboundRequest::new(inbound("vmess", "c1")))
        .await
        .unwrap();

    let err = service
        .alter_inbound(
            &cx(),
            AlterInboundRequest::operation(
                "vmess",
                &RemoveUser {
                    email: "love@example.com".into(),
                },
            )
            .unwrap(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownOperation);
}

#[test]
fn test_allow_list_with_unregistered_name_fails_to_build() {
    let (inbound_manager, outbound_manager) = managers();
    let config = ServiceConfig::from_json_str(r#"{"operations":["acme.Ghost"]}"#).unwrap();
    let result = HandlerService::builder(inbound_manager, outbound_manager)
        .operations(OperationRegistry::builtin())
        .config(config)
        .build();
    assert!(matches!(result, Err(ServiceError::Registry(_))));
}

#[tokio::test]
async fn test_capabilities_reflect_live_handlers() {
    let service = service();
    add_inbound(&service, "vmess", "c1").await;
    add_outbound(&service, "balanced").await;

    let inbound_caps = service.inbound_capabilities(&cx(), "vmess").await.unwrap();
    assert_eq!(inbound_caps, Capabilities::INBOUND | Capabilities::USER_MANAGER);

    let outbound_caps = service
        .outbound_capabilities(&cx(), "balanced")
        .await
        .unwrap();
    assert!(outbound_caps.contains(Capabilities::OUTBOUND | Capabilities::BALANCER));
    assert!(!outbound_caps.contains(Capabilities::USER_MANAGER));

    let err = service
        .inbound_capabilities(&cx(), "balanced")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
