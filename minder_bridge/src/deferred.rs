use std::sync::{Arc, Mutex};

use crate::error::{BridgeError, BridgeResult};
use crate::util::lock;

// -------------------------------------------------------------------------------------------------------

type DeferredCallback<T> = Box<dyn FnOnce(T) + Send + 'static>;

struct DeferredState<T> {
    result: Option<T>,
    callbacks: Vec<DeferredCallback<T>>,
}

/// A single-shot result cell. Callbacks added before the result arrives are queued and run in
/// registration order once it does; callbacks added afterwards run immediately.
///
/// Cloning yields another handle to the same cell.
pub struct Deferred<T> {
    inner: Arc<Mutex<DeferredState<T>>>,
}

impl<T> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Deferred {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + Send + 'static> Default for Deferred<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = lock(&self.inner);
        f.debug_struct("Deferred")
            .field("fulfilled", &state.result.is_some())
            .field("pending_callbacks", &state.callbacks.len())
            .finish()
    }
}

impl<T: Clone + Send + 'static> Deferred<T> {
    pub fn new() -> Self {
        Deferred {
            inner: Arc::new(Mutex::new(DeferredState {
                result: None,
                callbacks: Vec::new(),
            })),
        }
    }

    pub fn add_callback<F>(&self, callback: F) -> &Self
    where
        F: FnOnce(T) + Send + 'static,
    {
        let ready = {
            let mut state = lock(&self.inner);
            state.callbacks.push(Box::new(callback));
            state
                .result
                .clone()
                .map(|result| (result, std::mem::take(&mut state.callbacks)))
        };

        // the lock is released here, callbacks may re-enter this deferred
        if let Some((result, callbacks)) = ready {
            run_callbacks(callbacks, result);
        }

        self
    }

    pub fn then<F>(&self, callback: F) -> &Self
    where
        F: FnOnce(T) + Send + 'static,
    {
        self.add_callback(callback)
    }

    /// Fulfills the deferred. A second fulfillment is rejected and leaves the first result in place.
    pub fn callback(&self, result: T) -> BridgeResult<()> {
        let callbacks = {
            let mut state = lock(&self.inner);
            if state.result.is_some() {
                return Err(BridgeError::AlreadyFulfilled);
            }
            state.result = Some(result.clone());
            std::mem::take(&mut state.callbacks)
        };

        run_callbacks(callbacks, result);
        Ok(())
    }

    pub fn is_fulfilled(&self) -> bool {
        lock(&self.inner).result.is_some()
    }

    pub fn result(&self) -> Option<T> {
        lock(&self.inner).result.clone()
    }

    pub fn pending_callbacks(&self) -> usize {
        lock(&self.inner).callbacks.len()
    }

    /// Waits for the result.
    ///
    /// Consumes this handle: if every other handle is dropped while the deferred is still
    /// unfulfilled, the queued sender goes with it and this returns [`BridgeError::Abandoned`].
    pub async fn wait(self) -> BridgeResult<T> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.add_callback(move |result| {
            let _ = tx.send(result);
        });
        drop(self);

        rx.await.map_err(|_| BridgeError::Abandoned)
    }
}

fn run_callbacks<T: Clone>(callbacks: Vec<DeferredCallback<T>>, result: T) {
    for callback in callbacks {
        callback(result.clone());
    }
}

// -------------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------------
