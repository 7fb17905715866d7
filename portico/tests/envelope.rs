//! The JSON envelope end to end.

use portico::{ControlRequest, ControlResponse, ErrorKind};

mod common;
use common::{add_user_message, cx, service};

async fn round_trip(service: &common::TestService, line: &str) -> ControlResponse {
    let request = ControlRequest::from_json_line(line).unwrap();
    let response = service.dispatch(&cx(), request).await;
    let rendered = response.to_json_line().unwrap();
    ControlResponse::from_json_line(&rendered).unwrap()
}

#[tokio::test]
async fn test_dispatch_lifecycle() {
    let service = service();

    let response = round_trip(
        &service,
        r#"{"method":"add_inbound","inbound":{"tag":"web"}}"#,
    )
    .await;
    assert!(matches!(response, ControlResponse::AddInbound(_)));

    let response = round_trip(&service, r#"{"method":"list_inbound_conf"}"#).await;
    match response {
        ControlResponse::ListInboundConf(list) => {
            assert_eq!(list.inbounds.len(), 1);
            assert_eq!(list.inbounds[0].tag, "web");
        }
        other => panic!("unexpected response: {other:?}"),
    }

    let alter = serde_json::json!({
        "method": "alter_inbound",
        "tag": "web",
        "operation": add_user_message("love@example.com"),
    });
    let response = round_trip(&service, &alter.to_string()).await;
    assert!(matches!(response, ControlResponse::AlterInbound(_)));

    let response = round_trip(&service, r#"{"method":"remove_inbound","tag":"web"}"#).await;
    assert!(matches!(response, ControlResponse::RemoveInbound(_)));

    let response = round_trip(&service, r#"{"method":"get_inbound_conf","tag":"web"}"#).await;
    let error = response.error().unwrap();
    assert_eq!(error.kind, ErrorKind::NotFound);
    assert_eq!(error.message, "inbound handler not found: web");
}

#[tokio::test]
async fn test_dispatch_reports_unknown_operation() {
    let service = service();
    let response = round_trip(
        &service,
        r#"{"method":"add_outbound","outbound":{"tag":"direct"}}"#,
    )
    .await;
    assert!(!response.is_error());

    let response = round_trip(
        &service,
        r#"{"method":"alter_outbound","tag":"direct","operation":{"type":"acme.Nope"}}"#,
    )
    .await;
    let reply = response.error().unwrap();
    assert_eq!(reply.kind, ErrorKind::UnknownOperation);
    assert_eq!(
        reply.message,
        "unknown operation: acme.Nope for outbound handler `direct`"
    );
}
