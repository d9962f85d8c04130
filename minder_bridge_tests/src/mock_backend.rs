use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::StreamExt;
use futures::channel::mpsc;
use minder_bridge::conduit::{ConduitMessage, ConduitSource};
use minder_bridge::{CorrelationId, InboundMessage, MethodTable};
use serde_json::{Value, json};

/// An in-process backend. Answers direct calls from its method table and pushes notifications back
/// as json envelopes, the way the host does.
#[derive(Clone)]
pub struct MockBackend {
    outbox: mpsc::UnboundedSender<ConduitMessage>,
    timer_listener: Arc<Mutex<Option<CorrelationId>>>,
    log: Arc<Mutex<Vec<String>>>,
}

impl MockBackend {
    pub fn new() -> (Self, ConduitSource) {
        let (tx, rx) = mpsc::unbounded::<ConduitMessage>();
        let source: ConduitSource = Box::pin(rx.map(Ok));
        let backend = MockBackend {
            outbox: tx,
            timer_listener: Arc::new(Mutex::new(None)),
            log: Arc::new(Mutex::new(Vec::new())),
        };
        (backend, source)
    }

    pub fn push(&self, message: InboundMessage) {
        let text = message.to_json().unwrap();
        self.outbox.unbounded_send(ConduitMessage::Text(text)).unwrap();
    }

    pub fn push_raw(&self, text: &str) {
        self.outbox
            .unbounded_send(ConduitMessage::Text(text.to_string()))
            .unwrap();
    }

    pub fn close(&self) {
        self.outbox
            .unbounded_send(ConduitMessage::Close(Some("backend shut down".to_string())))
            .unwrap();
    }

    /// sends one tick to whoever currently listens to the timer, the way the backend does: one
    /// array argument `[h, m, s]`
    pub fn tick(&self, hours: u64, minutes: u64, seconds: u64) {
        let listener = self.timer_listener.lock().unwrap().clone();
        if let Some(id) = listener {
            self.push(InboundMessage::CriticalCall {
                id,
                args: vec![json!([hours, minutes, seconds])],
            });
        }
    }

    pub fn timer_listener(&self) -> Option<CorrelationId> {
        self.timer_listener.lock().unwrap().clone()
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn method_table(&self) -> MethodTable {
        let log = self.log.clone();
        let echo = self.clone();
        let start = self.clone();
        let stop = self.clone();
        let redirect = self.clone();

        MethodTable::new()
            .with_fn("info", move |args: Vec<Value>| {
                let message = args.first().and_then(Value::as_str).unwrap_or_default();
                log.lock().unwrap().push(message.to_string());
                async { Ok(Value::Null) }
            })
            .with_fn("client_create", |args: Vec<Value>| async move {
                let name = args.first().cloned().unwrap_or(Value::Null);
                Ok(json!({"id": 1, "name": name}))
            })
            .with_fn("clients_list", |_| async {
                Ok(json!([{"id": 1, "name": "ACME"}, {"id": 2, "name": "Initech"}]))
            })
            .with_fn("project_get", |_| async { Err(anyhow::anyhow!("no such project")) })
            // answers out of band: the last argument is the correlation id
            .with_fn("echo_later", move |mut args: Vec<Value>| {
                let echo = echo.clone();
                async move {
                    let id = match args.pop() {
                        Some(Value::String(id)) => CorrelationId::new(id),
                        other => anyhow::bail!("expected a correlation id, got {:?}", other),
                    };
                    let result = args.into_iter().next().unwrap_or(Value::Null);
                    tokio::spawn(async move {
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        echo.push(InboundMessage::ReturnCall { id, result });
                    });
                    Ok(Value::Null)
                }
            })
            .with_fn("timer_start", move |args: Vec<Value>| {
                // a running timer keeps ticking into its first listener
                let mut current = start.timer_listener.lock().unwrap();
                if current.is_none() {
                    *current = args.first().and_then(Value::as_str).map(CorrelationId::new);
                }
                async { Ok(json!({"id": 9, "task_id": 4, "entries": []})) }
            })
            .with_fn("timer_stop", move |_| {
                let previous = stop.timer_listener.lock().unwrap().take();
                if let Some(id) = &previous {
                    stop.push(InboundMessage::EndCallback { id: id.clone() });
                }
                let stopped = previous.is_some();
                async move { Ok(json!(stopped)) }
            })
            .with_fn("timer_override", move |args: Vec<Value>| {
                let new_receiver = args.first().and_then(Value::as_str).map(CorrelationId::new);
                let mut current = redirect.timer_listener.lock().unwrap();
                // without a running timer there is nothing to redirect
                if current.is_some() {
                    if let Some(id) = std::mem::replace(&mut *current, new_receiver) {
                        redirect.push(InboundMessage::EndCallback { id });
                    }
                }
                async { Ok(Value::Null) }
            })
    }
}
