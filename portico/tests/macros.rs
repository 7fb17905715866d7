//! Custom operations declared with `#[derive(TypedOperation)]`.

#![cfg(feature = "macros")]

use portico::{
    AlterInboundRequest, BoxError, Capability, CapabilityRef, ErrorKind, Operation,
    OperationRegistry, TypedOperation,
};
use serde::{Deserialize, Serialize};

mod common;
use common::{add_inbound, cx, has_user, managers, user_count};

/// Installs a batch of users in one operation.
#[derive(Debug, Serialize, Deserialize, TypedOperation)]
#[operation(name = "acme.command.AddUsers")]
struct AddUsers {
    emails: Vec<String>,
}

impl Operation for AddUsers {
    const CAPABILITY: Capability = Capability::UserManager;

    async fn apply(&self, target: CapabilityRef<'_>) -> Result<(), BoxError> {
        let users = target.user_manager()?;
        for email in &self.emails {
            let user = portico::User::new(email.clone(), 1).to_memory_user()?;
            users.add_user_dyn(user).await?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, TypedOperation)]
struct Unnamed;

#[test]
fn test_explicit_and_default_names() {
    assert_eq!(AddUsers::TYPE_NAME, "acme.command.AddUsers");
    assert!(Unnamed::TYPE_NAME.ends_with("::Unnamed"));
}

#[tokio::test]
async fn test_custom_operation_is_dispatched() {
    let (inbound_manager, outbound_manager) = managers();
    let registry = OperationRegistry::builder()
        .with_builtin()
        .register_type::<AddUsers>()
        .build();
    let service = portico::HandlerService::builder(inbound_manager, outbound_manager)
        .operations(registry)
        .build()
        .unwrap();
    add_inbound(&service, "vmess", "c1").await;

    let op = AddUsers {
        emails: vec!["a@example.com".into(), "b@example.com".into()],
    };
    service
        .alter_inbound(&cx(), AlterInboundRequest::operation("vmess", &op).unwrap())
        .await
        .unwrap();

    let handler = service.inbound_manager().handler("vmess").unwrap();
    assert_eq!(user_count(&handler).await, 2);
    assert!(has_user(&handler, "b@example.com").await);
}

#[tokio::test]
async fn test_unregistered_custom_operation_is_unknown() {
    let service = common::service();
    add_inbound(&service, "vmess", "c1").await;

    let op = AddUsers {
        emails: vec!["a@example.com".into()],
    };
    let err = service
        .alter_inbound(&cx(), AlterInboundRequest::operation("vmess", &op).unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownOperation);
}
