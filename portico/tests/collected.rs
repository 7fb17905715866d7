//! Operations collected through `inventory`.

#![cfg(all(feature = "macros", feature = "inventory"))]

use portico::{
    AlterInboundRequest, BoxError, Capability, CapabilityRef, Operation, OperationRegistry,
    TypedOperation,
};
use serde::{Deserialize, Serialize};

mod common;
use common::{add_inbound, cx, has_user, service};

#[derive(Debug, Serialize, Deserialize, TypedOperation)]
#[operation(name = "acme.command.AddVipUser", collect)]
struct AddVipUser {
    email: String,
}

impl Operation for AddVipUser {
    const CAPABILITY: Capability = Capability::UserManager;

    async fn apply(&self, target: CapabilityRef<'_>) -> Result<(), BoxError> {
        let user = portico::User::new(self.email.clone(), 9).to_memory_user()?;
        target.user_manager()?.add_user_dyn(user).await
    }
}

#[test]
fn test_collected_type_is_registered() {
    let registry = OperationRegistry::builder()
        .with_builtin()
        .with_collected()
        .build();
    assert!(registry.contains(AddVipUser::TYPE_NAME));
}

#[tokio::test]
async fn test_default_service_picks_up_collected_types() {
    let service = service();
    add_inbound(&service, "vmess", "c1").await;

    let op = AddVipUser {
        email: "vip@example.com".into(),
    };
    service
        .alter_inbound(&cx(), AlterInboundRequest::operation("vmess", &op).unwrap())
        .await
        .unwrap();

    let handler = service.inbound_manager().handler("vmess").unwrap();
    assert!(has_user(&handler, "vip@example.com").await);
}
