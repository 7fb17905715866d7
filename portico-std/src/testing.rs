//! Testing utilities for Portico.
//!
//! This module provides in-memory doubles for the engine side of the
//! control plane, so registries and services can be exercised without a
//! real proxy.
//!
//! # Features
//!
//! - [`MockManager`]: An in-memory [`HandlerManager`] with failure injection
//! - [`MockUserHandler`]: A handler exposing user management
//! - [`MockBalancerHandler`]: An outbound handler exposing balancer control
//! - [`PlainHandler`]: A handler exposing no capability at all

use portico_core::{
    BalancerControl, BoxError, Direction, DynBalancerControl, DynUserManager, HandlerConfig,
    HandlerManager, MemoryUser, ProxyHandler, UserManager,
};
use std::{
    collections::{BTreeMap, HashMap},
    marker::PhantomData,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Handlers
// ============================================================================

/// A handler with no capability beyond its direction.
#[derive(Debug, Clone)]
pub struct PlainHandler {
    tag: String,
    direction: Direction,
}

impl PlainHandler {
    /// Create a plain handler.
    pub fn new(tag: impl Into<String>, direction: Direction) -> Self {
        Self {
            tag: tag.into(),
            direction,
        }
    }
}

impl ProxyHandler for PlainHandler {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn direction(&self) -> Direction {
        self.direction
    }
}

/// A handler that keeps its users in memory.
///
/// Adding an existing email or removing an unknown one fails, like a real
/// proxy's user table.
///
/// # Example
///
/// ```rust,ignore
/// let handler = MockUserHandler::new("vmess-in", Direction::Inbound);
/// // ... apply an AddUser operation through the service ...
/// assert!(handler.has_user("love@example.com"));
/// ```
#[derive(Debug)]
pub struct MockUserHandler {
    tag: String,
    direction: Direction,
    users: Mutex<BTreeMap<String, MemoryUser>>,
}

impl MockUserHandler {
    /// Create a handler with no users.
    pub fn new(tag: impl Into<String>, direction: Direction) -> Self {
        Self {
            tag: tag.into(),
            direction,
            users: Mutex::new(BTreeMap::new()),
        }
    }

    /// Whether a user with `email` is installed.
    pub fn has_user(&self, email: &str) -> bool {
        lock(&self.users).contains_key(email)
    }

    /// Installed emails, sorted.
    pub fn user_emails(&self) -> Vec<String> {
        lock(&self.users).keys().cloned().collect()
    }
}

impl UserManager for MockUserHandler {
    async fn add_user(&self, user: MemoryUser) -> Result<(), BoxError> {
        let mut users = lock(&self.users);
        if users.contains_key(&user.email) {
            return Err(format!("user {} already exists", user.email).into());
        }
        users.insert(user.email.clone(), user);
        Ok(())
    }

    async fn remove_user(&self, email: &str) -> Result<(), BoxError> {
        match lock(&self.users).remove(email) {
            Some(_) => Ok(()),
            None => Err(format!("user {email} not found").into()),
        }
    }

    async fn get_user(&self, email: &str) -> Option<MemoryUser> {
        lock(&self.users).get(email).cloned()
    }

    async fn user_count(&self) -> usize {
        lock(&self.users).len()
    }
}

impl ProxyHandler for MockUserHandler {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn direction(&self) -> Direction {
        self.direction
    }

    fn user_manager(&self) -> Option<&dyn DynUserManager> {
        Some(self)
    }
}

/// An outbound handler whose balancer target can be pinned.
#[derive(Debug)]
pub struct MockBalancerHandler {
    tag: String,
    pinned: Mutex<Option<String>>,
}

impl MockBalancerHandler {
    /// Create an outbound handler with no override.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            pinned: Mutex::new(None),
        }
    }

    /// The currently pinned target.
    pub fn pinned(&self) -> Option<String> {
        lock(&self.pinned).clone()
    }
}

impl BalancerControl for MockBalancerHandler {
    async fn override_target(&self, target: Option<String>) -> Result<(), BoxError> {
        *lock(&self.pinned) = target;
        Ok(())
    }

    fn current_override(&self) -> Option<String> {
        self.pinned()
    }
}

impl ProxyHandler for MockBalancerHandler {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn direction(&self) -> Direction {
        Direction::Outbound
    }

    fn balancer(&self) -> Option<&dyn DynBalancerControl> {
        Some(self)
    }
}

// ============================================================================
// Mock Manager
// ============================================================================

/// Builds a live handler from a configuration.
pub type HandlerFactory<C> =
    Box<dyn Fn(&C) -> Result<Arc<dyn ProxyHandler>, BoxError> + Send + Sync>;

/// An in-memory engine for one direction.
///
/// Tagged handlers are kept by tag, anonymous ones in a side list. Failures
/// and latency can be injected to exercise the control plane's error and
/// cancellation paths.
///
/// # Example
///
/// ```rust,ignore
/// let manager = MockManager::<MyConfig>::user_handlers(Direction::Inbound)
///     .with_delay(Duration::from_millis(50));
/// manager.fail_next_instantiate("port already in use");
/// ```
pub struct MockManager<C> {
    factory: HandlerFactory<C>,
    handlers: Mutex<HashMap<String, Arc<dyn ProxyHandler>>>,
    anonymous: Mutex<Vec<Arc<dyn ProxyHandler>>>,
    next_failure: Mutex<Option<String>>,
    reject_duplicates: bool,
    delay: Option<Duration>,
    add_delay: Option<Duration>,
    instantiated: AtomicUsize,
    _config: PhantomData<fn(&C)>,
}

impl<C: HandlerConfig> MockManager<C> {
    /// Create a manager building handlers with `factory`.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(&C) -> Result<Arc<dyn ProxyHandler>, BoxError> + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            handlers: Mutex::new(HashMap::new()),
            anonymous: Mutex::new(Vec::new()),
            next_failure: Mutex::new(None),
            reject_duplicates: false,
            delay: None,
            add_delay: None,
            instantiated: AtomicUsize::new(0),
            _config: PhantomData,
        }
    }

    /// A manager whose handlers all manage users.
    pub fn user_handlers(direction: Direction) -> Self {
        Self::new(move |config: &C| {
            Ok(Arc::new(MockUserHandler::new(config.tag(), direction)) as Arc<dyn ProxyHandler>)
        })
    }

    /// A manager whose handlers expose no capability.
    pub fn plain_handlers(direction: Direction) -> Self {
        Self::new(move |config: &C| {
            Ok(Arc::new(PlainHandler::new(config.tag(), direction)) as Arc<dyn ProxyHandler>)
        })
    }

    /// Refuse to register a tag that is already live.
    pub fn rejecting_duplicates(mut self) -> Self {
        self.reject_duplicates = true;
        self
    }

    /// Delay every instantiate and remove call by `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Delay every add call by `delay`.
    pub fn with_add_delay(mut self, delay: Duration) -> Self {
        self.add_delay = Some(delay);
        self
    }

    /// Make the next instantiate call fail with `message`.
    pub fn fail_next_instantiate(&self, message: impl Into<String>) {
        *lock(&self.next_failure) = Some(message.into());
    }

    /// Register `handler` directly, bypassing the control plane.
    pub fn insert_handler(&self, handler: Arc<dyn ProxyHandler>) {
        if handler.tag().is_empty() {
            lock(&self.anonymous).push(handler);
        } else {
            lock(&self.handlers).insert(handler.tag().to_owned(), handler);
        }
    }

    /// Drop the handler under `tag`, bypassing the control plane.
    pub fn drop_handler(&self, tag: &str) -> Option<Arc<dyn ProxyHandler>> {
        lock(&self.handlers).remove(tag)
    }

    /// The live handler under `tag`, without going through the trait.
    pub fn handler(&self, tag: &str) -> Option<Arc<dyn ProxyHandler>> {
        lock(&self.handlers).get(tag).cloned()
    }

    /// Live tagged handlers, sorted by tag.
    pub fn live_tags(&self) -> Vec<String> {
        let mut tags: Vec<_> = lock(&self.handlers).keys().cloned().collect();
        tags.sort();
        tags
    }

    /// Number of live anonymous handlers.
    pub fn anonymous_count(&self) -> usize {
        lock(&self.anonymous).len()
    }

    /// Number of successful instantiate calls.
    pub fn instantiate_count(&self) -> usize {
        self.instantiated.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

impl<C: HandlerConfig> HandlerManager for MockManager<C> {
    type Config = C;

    async fn instantiate(&self, config: &C) -> Result<Arc<dyn ProxyHandler>, BoxError> {
        self.pause().await;
        if let Some(message) = lock(&self.next_failure).take() {
            return Err(message.into());
        }
        let handler = (self.factory)(config)?;
        self.instantiated.fetch_add(1, Ordering::SeqCst);
        Ok(handler)
    }

    async fn add_handler(&self, handler: Arc<dyn ProxyHandler>) -> Result<(), BoxError> {
        if let Some(delay) = self.add_delay {
            tokio::time::sleep(delay).await;
        }
        let tag = handler.tag().to_owned();
        if tag.is_empty() {
            lock(&self.anonymous).push(handler);
            return Ok(());
        }

        let mut handlers = lock(&self.handlers);
        if self.reject_duplicates && handlers.contains_key(&tag) {
            return Err(format!("existing tag found: {tag}").into());
        }
        handlers.insert(tag, handler);
        Ok(())
    }

    async fn get_handler(&self, tag: &str) -> Option<Arc<dyn ProxyHandler>> {
        self.handler(tag)
    }

    async fn remove_handler(&self, tag: &str) -> Result<(), BoxError> {
        self.pause().await;
        match lock(&self.handlers).remove(tag) {
            Some(_) => Ok(()),
            None => Err(format!("handler not found: {tag}").into()),
        }
    }
}

impl<C> std::fmt::Debug for MockManager<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tags: Vec<_> = lock(&self.handlers).keys().cloned().collect();
        tags.sort();
        f.debug_struct("MockManager")
            .field("handlers", &tags)
            .field("anonymous", &lock(&self.anonymous).len())
            .field("reject_duplicates", &self.reject_duplicates)
            .field("delay", &self.delay)
            .field("add_delay", &self.add_delay)
            .finish()
    }
}
