//! Dynamic component resolver.
//!
//! Turns a `(plugin_id, component_name)` reference into a renderable
//! component. Loading happens on a spawned task; callers get a
//! [`ResolutionHandle`] that starts in [`ResolutionState::Loading`] and
//! moves exactly once to `Ready` or `Failed`. Resolution never fails
//! synchronously.
//!
//! With caching on, handles are shared per key: concurrent callers join the
//! single in-flight load, and settled resolutions live for the lifetime of
//! the resolver. Repeated `resolve` calls never restart a settled load; a
//! failed entry is only reloaded through [`ComponentResolver::retry`] (if
//! the [`FailurePolicy`] allows it) or [`ComponentResolver::invalidate`].
//! Resolutions that settle without a load (unregistered plugin, no runtime)
//! are not cached.

use crate::core::{millis, ComponentKey, ResolveErrorKind};
use crate::plugin::PluginRegistry;
use crate::widget::component::ComponentRef;
use crate::widget::loader::ModuleLoader;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, warn};

/// What a cached failure means for the next caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Keep the failure until an explicit `retry` reloads it
    RetryOnDemand,
    /// Keep the failure; `retry` is a no-op, only `invalidate` clears it
    Sticky,
}

/// Resolver configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Share loads and cache resolutions per component key
    pub cache: bool,
    /// Handling of cached failures
    pub failure_policy: FailurePolicy,
    /// Per-load timeout in milliseconds; absent or zero disables it
    pub load_timeout_ms: Option<u64>,
}

impl ResolverConfig {
    /// Configuration without caching: every resolve triggers a load.
    pub fn uncached() -> Self {
        Self {
            cache: false,
            ..Default::default()
        }
    }

    /// Set failure policy.
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Set load timeout.
    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Load timeout as a duration.
    pub fn load_timeout(&self) -> Option<Duration> {
        millis(self.load_timeout_ms)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            cache: true,
            failure_policy: FailurePolicy::RetryOnDemand,
            load_timeout_ms: Some(15_000),
        }
    }
}

/// State of one component resolution.
#[derive(Clone)]
pub enum ResolutionState {
    /// Load in progress
    Loading,
    /// Component resolved
    Ready(ComponentRef),
    /// Resolution failed
    Failed(ResolveErrorKind),
}

impl ResolutionState {
    /// Whether the load is still in progress.
    pub fn is_loading(&self) -> bool {
        matches!(self, ResolutionState::Loading)
    }

    /// Whether the component resolved.
    pub fn is_ready(&self) -> bool {
        matches!(self, ResolutionState::Ready(_))
    }

    /// Whether the resolution failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, ResolutionState::Failed(_))
    }

    /// Resolved component, if ready.
    pub fn component(&self) -> Option<&ComponentRef> {
        match self {
            ResolutionState::Ready(component) => Some(component),
            _ => None,
        }
    }

    /// Failure kind, if failed.
    pub fn error(&self) -> Option<&ResolveErrorKind> {
        match self {
            ResolutionState::Failed(kind) => Some(kind),
            _ => None,
        }
    }
}

impl fmt::Debug for ResolutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionState::Loading => write!(f, "Loading"),
            ResolutionState::Ready(component) => write!(f, "Ready({})", component.name()),
            ResolutionState::Failed(kind) => write!(f, "Failed({:?})", kind),
        }
    }
}

/// Caller-side view of a resolution.
#[derive(Clone)]
pub struct ResolutionHandle {
    key: ComponentKey,
    rx: watch::Receiver<ResolutionState>,
    // false when the handle settled without running a load
    loaded: bool,
}

impl ResolutionHandle {
    fn settled_with(key: ComponentKey, state: ResolutionState) -> Self {
        let (tx, rx) = watch::channel(ResolutionState::Loading);
        tx.send_replace(state);
        Self {
            key,
            rx,
            loaded: false,
        }
    }

    /// Key being resolved.
    pub fn key(&self) -> &ComponentKey {
        &self.key
    }

    /// Current state, without waiting.
    pub fn state(&self) -> ResolutionState {
        let state = self.rx.borrow().clone();
        if state.is_loading() && self.rx.has_changed().is_err() {
            return aborted();
        }
        state
    }

    /// Wait for the terminal state.
    pub async fn settled(&self) -> ResolutionState {
        let mut rx = self.rx.clone();
        let result = rx.wait_for(|state| !state.is_loading()).await;
        match result {
            Ok(state) => state.clone(),
            Err(_) => aborted(),
        }
    }
}

impl fmt::Debug for ResolutionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolutionHandle")
            .field("key", &self.key)
            .field("state", &self.state())
            .finish()
    }
}

// The load task went away without publishing a result (panic or runtime
// shutdown).
fn aborted() -> ResolutionState {
    ResolutionState::Failed(ResolveErrorKind::ComponentLoadError(
        "resolution task ended without a result".to_string(),
    ))
}

/// Dynamic component resolver.
pub struct ComponentResolver {
    registry: Arc<PluginRegistry>,
    loader: Arc<dyn ModuleLoader>,
    config: ResolverConfig,
    cache: Mutex<HashMap<ComponentKey, ResolutionHandle>>,
    loads: AtomicU64,
}

impl ComponentResolver {
    /// Create a resolver.
    pub fn new(
        registry: Arc<PluginRegistry>,
        loader: Arc<dyn ModuleLoader>,
        config: ResolverConfig,
    ) -> Self {
        Self {
            registry,
            loader,
            config,
            cache: Mutex::new(HashMap::new()),
            loads: AtomicU64::new(0),
        }
    }

    /// Resolver configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Start or join the resolution of a component.
    ///
    /// Must be called from within a tokio runtime for the load to make
    /// progress; outside one the handle settles as a load error.
    pub fn resolve(&self, plugin_id: &str, component_name: &str) -> ResolutionHandle {
        self.resolve_key(ComponentKey::new(plugin_id, component_name), false)
    }

    /// Resolve again after a failure.
    ///
    /// Under [`FailurePolicy::RetryOnDemand`] a cached failure is dropped and
    /// the load restarts; otherwise this behaves like [`Self::resolve`].
    pub fn retry(&self, plugin_id: &str, component_name: &str) -> ResolutionHandle {
        let reload = self.config.failure_policy == FailurePolicy::RetryOnDemand;
        self.resolve_key(ComponentKey::new(plugin_id, component_name), reload)
    }

    /// Resolve and wait for the terminal state.
    pub async fn resolve_settled(&self, plugin_id: &str, component_name: &str) -> ResolutionState {
        self.resolve(plugin_id, component_name).settled().await
    }

    fn resolve_key(&self, key: ComponentKey, reload_failed: bool) -> ResolutionHandle {
        if !self.registry.contains(&key.plugin_id) {
            debug!(component = %key, "plugin not registered");
            return ResolutionHandle::settled_with(
                key,
                ResolutionState::Failed(ResolveErrorKind::PluginNotFound),
            );
        }
        if !self.config.cache {
            return self.start(key);
        }

        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = cache.get(&key) {
            if !(reload_failed && handle.state().is_failed()) {
                return handle.clone();
            }
            debug!(component = %key, "retrying failed resolution");
        }

        let handle = self.start(key.clone());
        if handle.loaded {
            cache.insert(key, handle.clone());
        } else {
            cache.remove(&key);
        }
        handle
    }

    fn start(&self, key: ComponentKey) -> ResolutionHandle {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!(component = %key, error = %e, "cannot load component outside a runtime");
                return ResolutionHandle::settled_with(
                    key,
                    ResolutionState::Failed(ResolveErrorKind::ComponentLoadError(e.to_string())),
                );
            }
        };

        let (tx, rx) = watch::channel(ResolutionState::Loading);
        self.loads.fetch_add(1, Ordering::Relaxed);

        let loader = Arc::clone(&self.loader);
        let timeout = self.config.load_timeout();
        let task_key = key.clone();
        runtime.spawn(async move {
            let state = load_component(loader.as_ref(), &task_key, timeout).await;
            tx.send_replace(state);
        });

        ResolutionHandle {
            key,
            rx,
            loaded: true,
        }
    }

    /// Drop every cached resolution of a plugin, e.g. after it was updated.
    pub fn invalidate(&self, plugin_id: &str) {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.retain(|key, _| key.plugin_id != plugin_id);
    }

    /// Number of loads started so far.
    pub fn load_count(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }

    /// Number of cached resolutions.
    pub fn cached_count(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl fmt::Debug for ComponentResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentResolver")
            .field("config", &self.config)
            .field("loads", &self.load_count())
            .finish()
    }
}

async fn load_component(
    loader: &dyn ModuleLoader,
    key: &ComponentKey,
    timeout: Option<Duration>,
) -> ResolutionState {
    debug!(component = %key, "loading plugin module");

    let load = loader.load(&key.plugin_id);
    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, load).await {
            Ok(result) => result,
            Err(_) => {
                let kind = ResolveErrorKind::LoadTimeout(limit.as_millis() as u64);
                warn!(component = %key, error = %kind, "component resolution failed");
                return ResolutionState::Failed(kind);
            }
        },
        None => load.await,
    };

    let state = match result {
        Ok(exports) => match exports.get(&key.component_name) {
            Some(component) => ResolutionState::Ready(component),
            None => ResolutionState::Failed(ResolveErrorKind::ComponentNotFound),
        },
        Err(e) => ResolutionState::Failed(e.into()),
    };

    match &state {
        ResolutionState::Failed(kind) => {
            warn!(component = %key, error = %kind, "component resolution failed")
        }
        _ => debug!(component = %key, "component resolved"),
    }
    state
}
