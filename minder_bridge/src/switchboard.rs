use std::{
    collections::HashMap,
    pin::Pin,
    sync::{Arc, Mutex},
    task::{Context, Poll},
};

use futures::Stream;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    correlation::{CorrelationId, DEFAULT_ID_LENGTH},
    deferred::Deferred,
    error::{BridgeError, BridgeResult},
    inbound::InboundMessage,
    util::lock,
};

// -------------------------------------------------------------------------------------------------------

/// A registered continuation. Receives the positional arguments of one notification.
pub type Handler = Arc<dyn Fn(Vec<Value>) + Send + Sync + 'static>;

/// Registry of continuations keyed by correlation id.
///
/// Routes out-of-band notifications from the backend to whoever asked for them. Two delivery
/// disciplines exist:
/// - one-shot ([`Switchboard::register`] + [`Switchboard::return_val`]): exactly one result, then the
///   registration is gone.
/// - repeating ([`Switchboard::generate`] + [`Switchboard::call_back`]): any number of notifications
///   until the backend calls [`Switchboard::finished`].
///
/// Cloning shares the registry. Create one per application and hand it to everything that mints or
/// dispatches ids.
#[derive(Clone)]
pub struct Switchboard {
    callbacks: Arc<Mutex<HashMap<CorrelationId, Handler>>>,
    id_length: usize,
}

impl Default for Switchboard {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Switchboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Switchboard")
            .field("registered", &self.len())
            .field("id_length", &self.id_length)
            .finish()
    }
}

impl Switchboard {
    pub fn new() -> Self {
        Self::with_id_length(DEFAULT_ID_LENGTH)
    }

    pub fn with_id_length(id_length: usize) -> Self {
        Switchboard {
            callbacks: Arc::new(Mutex::new(HashMap::new())),
            id_length,
        }
    }

    /// mints an id that is not currently registered and stores the handler under it
    fn insert(&self, handler: Handler) -> CorrelationId {
        let mut callbacks = lock(&self.callbacks);
        let id = loop {
            let candidate = CorrelationId::random(self.id_length);
            if !callbacks.contains_key(&candidate) {
                break candidate;
            }
        };
        callbacks.insert(id.clone(), handler);
        id
    }

    fn handler(&self, id: &CorrelationId) -> Option<Handler> {
        lock(&self.callbacks).get(id).cloned()
    }

    /// Registers a repeating handler and returns the id to pass to the backend.
    pub fn generate<F>(&self, callback: F) -> CorrelationId
    where
        F: Fn(Vec<Value>) + Send + Sync + 'static,
    {
        let id = self.insert(Arc::new(callback));
        debug!(%id, "registered repeating callback");
        id
    }

    /// Registers a one-shot handler that fulfills `deferred` with the first notification argument.
    pub fn register(&self, deferred: &Deferred<Value>) -> CorrelationId {
        let deferred = deferred.clone();
        let id = self.insert(Arc::new(move |args: Vec<Value>| {
            let result = args.into_iter().next().unwrap_or(Value::Null);
            if let Err(err) = deferred.callback(result) {
                warn!("Dropping notification for a settled request: {}", err);
            }
        }));
        debug!(%id, "registered deferred");
        id
    }

    /// Registers a repeating handler that feeds a stream. The stream ends once the registration is
    /// removed.
    pub fn subscribe(&self) -> (CorrelationId, Subscription) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let id = self.generate(move |args| {
            let _ = tx.send(args);
        });
        let subscription = Subscription {
            id: id.clone(),
            rx,
        };
        (id, subscription)
    }

    /// Removes the registration if present. Returns whether anything was removed.
    pub fn deregister(&self, id: &CorrelationId) -> bool {
        let removed = lock(&self.callbacks).remove(id);
        // drop the handler outside the lock, it may own things that reach back into the registry
        let removed = removed.is_some();
        if removed {
            debug!(%id, "deregistered callback");
        }
        removed
    }

    /// The backend signals that no more notifications will arrive for `id`.
    pub fn finished(&self, id: &CorrelationId) {
        self.deregister(id);
    }

    /// Repeating delivery. Unknown ids are ignored, late notifications after `finished` are expected.
    /// Returns whether a handler was invoked.
    pub fn call_back(&self, id: &CorrelationId, args: Vec<Value>) -> bool {
        match self.handler(id) {
            Some(handler) => {
                debug!(%id, ?args, "callBack");
                handler(args);
                true
            }
            None => {
                debug!(%id, "callBack for unknown identifier ignored");
                false
            }
        }
    }

    /// Repeating delivery for ids the backend asserts must exist.
    pub fn critical_call_back(&self, id: &CorrelationId, args: Vec<Value>) -> BridgeResult<()> {
        let handler = self
            .handler(id)
            .ok_or_else(|| BridgeError::UnknownCorrelationId { id: id.clone() })?;
        debug!(%id, ?args, "criticalCallBack");
        handler(args);
        Ok(())
    }

    /// One-shot delivery: the registration is removed and invoked with `result`.
    /// Unknown ids are a no-op. Returns whether a handler was invoked.
    pub fn return_val(&self, id: &CorrelationId, result: Value) -> bool {
        let handler = lock(&self.callbacks).remove(id);
        match handler {
            Some(handler) => {
                debug!(%id, ?result, "returnVal");
                handler(vec![result]);
                true
            }
            None => {
                debug!(%id, "returnVal for unknown identifier ignored");
                false
            }
        }
    }

    /// Routes one host envelope to the matching entry point.
    pub fn dispatch(&self, message: InboundMessage) -> BridgeResult<()> {
        match message {
            InboundMessage::ReturnCall { id, result } => {
                self.return_val(&id, result);
            }
            InboundMessage::CallBack { id, args } => {
                self.call_back(&id, args);
            }
            InboundMessage::CriticalCall { id, args } => {
                self.critical_call_back(&id, args)?;
            }
            InboundMessage::EndCallback { id } => {
                self.finished(&id);
            }
        }
        Ok(())
    }

    pub fn contains(&self, id: &CorrelationId) -> bool {
        lock(&self.callbacks).contains_key(id)
    }

    pub fn len(&self) -> usize {
        lock(&self.callbacks).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.callbacks).is_empty()
    }
}

// -------------------------------------------------------------------------------------------------------

/// Stream of notifications for one repeating registration, see [`Switchboard::subscribe`].
pub struct Subscription {
    id: CorrelationId,
    rx: tokio::sync::mpsc::UnboundedReceiver<Vec<Value>>,
}

impl Subscription {
    pub fn id(&self) -> &CorrelationId {
        &self.id
    }

    /// the next notification, or `None` once the registration was removed and everything
    /// delivered before that has been read
    pub async fn recv(&mut self) -> Option<Vec<Value>> {
        self.rx.recv().await
    }
}

impl Stream for Subscription {
    type Item = Vec<Value>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

// -------------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------------
