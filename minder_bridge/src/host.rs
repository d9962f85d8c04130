use std::{collections::HashMap, future::Future, sync::Arc, time::Duration};

use serde_json::Value;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::error::{BridgeError, BridgeResult};

// -------------------------------------------------------------------------------------------------------

/// Name of the event the host fires once its method table is available.
pub const DEFAULT_READINESS_EVENT: &str = "pywebviewready";

/// Name of the method whose presence marks a method table as usable.
pub const DEFAULT_READINESS_PROBE: &str = "info";

/// One backend operation, invoked with positional json arguments.
#[async_trait::async_trait]
pub trait RemoteMethod: Send + Sync {
    async fn invoke(&self, args: Vec<Value>) -> anyhow::Result<Value>;
}

struct FnMethod<F>(F);

#[async_trait::async_trait]
impl<F, Fut> RemoteMethod for FnMethod<F>
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
{
    async fn invoke(&self, args: Vec<Value>) -> anyhow::Result<Value> {
        (self.0)(args).await
    }
}

/// The backend's invocable surface, keyed by method name.
#[derive(Clone, Default)]
pub struct MethodTable {
    methods: HashMap<String, Arc<dyn RemoteMethod>>,
}

impl std::fmt::Debug for MethodTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, method: Arc<dyn RemoteMethod>) -> &mut Self {
        let name = name.into();
        if self.methods.insert(name.clone(), method).is_some() {
            warn!("Method {} was already registered and was overwritten", name);
        }
        self
    }

    pub fn with_method(mut self, name: impl Into<String>, method: impl RemoteMethod + 'static) -> Self {
        self.insert(name, Arc::new(method));
        self
    }

    /// adapts an async closure into a method
    /// ```
    /// # use minder_bridge::host::MethodTable;
    /// # use serde_json::Value;
    /// let table = MethodTable::new().with_fn("info", |args: Vec<Value>| async move {
    ///     println!("backend got {:?}", args);
    ///     Ok(Value::Null)
    /// });
    /// assert!(table.contains("info"));
    /// ```
    pub fn with_fn<F, Fut>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        self.with_method(name, FnMethod(f))
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn RemoteMethod>> {
        self.methods.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

// -------------------------------------------------------------------------------------------------------

/// The host's global object: empty until the host installs its method table.
///
/// Cloning shares the slot.
#[derive(Clone)]
pub struct HostHandle {
    slot: Arc<watch::Sender<Option<Arc<MethodTable>>>>,
    readiness_event: String,
}

impl Default for HostHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HostHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostHandle")
            .field("readiness_event", &self.readiness_event)
            .field("ready", &self.is_ready())
            .finish()
    }
}

impl HostHandle {
    pub fn new() -> Self {
        Self::with_readiness_event(DEFAULT_READINESS_EVENT)
    }

    pub fn with_readiness_event(readiness_event: impl Into<String>) -> Self {
        let (tx, _rx) = watch::channel(None);
        HostHandle {
            slot: Arc::new(tx),
            readiness_event: readiness_event.into(),
        }
    }

    /// a host whose table is already in place
    pub fn with_table(table: MethodTable) -> Self {
        let host = Self::new();
        host.install(table);
        host
    }

    /// Installs the method table and fires the readiness event.
    /// The event fires exactly once: later installs are ignored and return `false`.
    pub fn install(&self, table: MethodTable) -> bool {
        let table = Arc::new(table);
        let installed = self.slot.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = Some(table.clone());
            true
        });

        if installed {
            info!(
                "Host fired {} with {} methods",
                self.readiness_event,
                table.len()
            );
        } else {
            warn!(
                "Host already fired {}, ignoring the new method table",
                self.readiness_event
            );
        }
        installed
    }

    pub fn method_table(&self) -> Option<Arc<MethodTable>> {
        self.slot.borrow().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.slot.borrow().is_some()
    }

    pub fn readiness_event(&self) -> &str {
        &self.readiness_event
    }

    /// resolves once the readiness event has fired (immediately if it already has)
    pub async fn wait_ready(&self) -> BridgeResult<()> {
        let mut rx = self.slot.subscribe();
        rx.wait_for(Option::is_some)
            .await
            .map(|_| ())
            .map_err(|_| BridgeError::NotConnected)
    }

    pub async fn wait_ready_timeout(&self, timeout: Duration) -> BridgeResult<()> {
        match tokio::time::timeout(timeout, self.wait_ready()).await {
            Ok(result) => result,
            Err(_) => Err(BridgeError::Timeout {
                method: self.readiness_event.clone(),
                timeout,
            }),
        }
    }
}

// -------------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------------
