#![allow(dead_code)]

use portico::{
    AddInboundRequest, AddOutboundRequest, AddUser, Direction, HandlerService,
    InboundHandlerConfig, OutboundHandlerConfig, ProxyHandler, RequestContext, TypedMessage,
    TypedOperation, User,
    testing::{MockBalancerHandler, MockManager},
};
use std::sync::Arc;

// ============================================================================
// Service Fixtures
// ============================================================================

pub type InboundManager = Arc<MockManager<InboundHandlerConfig>>;
pub type OutboundManager = Arc<MockManager<OutboundHandlerConfig>>;
pub type TestService = HandlerService<InboundManager, OutboundManager>;

/// Inbound handlers manage users; outbound handlers are balancers.
pub fn managers() -> (InboundManager, OutboundManager) {
    let inbound = MockManager::<InboundHandlerConfig>::user_handlers(Direction::Inbound);
    let outbound = MockManager::new(|config: &OutboundHandlerConfig| {
        Ok(Arc::new(MockBalancerHandler::new(config.tag.clone())) as Arc<dyn ProxyHandler>)
    });
    (Arc::new(inbound), Arc::new(outbound))
}

pub fn service() -> TestService {
    let (inbound, outbound) = managers();
    service_with(inbound, outbound)
}

pub fn service_with(inbound: InboundManager, outbound: OutboundManager) -> TestService {
    HandlerService::builder(inbound, outbound).build().unwrap()
}

pub fn cx() -> RequestContext {
    RequestContext::new()
}

// ============================================================================
// Configurations
// ============================================================================

/// An inbound config whose proxy settings carry `marker`, so two configs
/// with the same tag can be told apart.
pub fn inbound(tag: &str, marker: &str) -> InboundHandlerConfig {
    InboundHandlerConfig::new(tag)
        .with_proxy_settings(TypedMessage::new("test.Marker", marker.as_bytes().to_vec()))
}

pub fn outbound(tag: &str) -> OutboundHandlerConfig {
    OutboundHandlerConfig::new(tag)
}

pub async fn add_inbound(service: &TestService, tag: &str, marker: &str) {
    service
        .add_inbound(&cx(), AddInboundRequest::new(inbound(tag, marker)))
        .await
        .unwrap();
}

pub async fn add_outbound(service: &TestService, tag: &str) {
    service
        .add_outbound(&cx(), AddOutboundRequest::new(outbound(tag)))
        .await
        .unwrap();
}

pub fn sorted_inbound_tags(configs: &[InboundHandlerConfig]) -> Vec<String> {
    let mut tags: Vec<_> = configs.iter().map(|c| c.tag.clone()).collect();
    tags.sort();
    tags
}

// ============================================================================
// Operations
// ============================================================================

pub fn add_user_message(email: &str) -> TypedMessage {
    TypedMessage::from_json(
        AddUser::TYPE_NAME,
        &AddUser {
            user: User::new(email, 0),
        },
    )
    .unwrap()
}

pub async fn has_user(handler: &Arc<dyn ProxyHandler>, email: &str) -> bool {
    match handler.user_manager() {
        Some(users) => users.get_user_dyn(email).await.is_some(),
        None => false,
    }
}

pub async fn user_count(handler: &Arc<dyn ProxyHandler>) -> usize {
    match handler.user_manager() {
        Some(users) => users.user_count_dyn().await,
        None => 0,
    }
}
