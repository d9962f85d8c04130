//! An in-memory stand-in for the native backend: a tiny record store plus a ticking timer that
//! talks back through the conduit, the way the real host does.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;

use futures::{StreamExt, channel::mpsc, future};
use log::{debug, info};
use minder_bridge::{
    CorrelationId, InboundMessage, MethodTable,
    api::{Client, Event, Project, RecordId, Task},
    conduit::{ConduitMessage, ConduitSource},
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

// -------------------------------------------------------------------------------------------------------

struct RunningTimer {
    listener: Arc<Mutex<CorrelationId>>,
    paused: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
}

#[derive(Default)]
struct Store {
    next_id: RecordId,
    clients: Vec<Client>,
    projects: Vec<Project>,
    tasks: Vec<Task>,
    events: Vec<Event>,
}

impl Store {
    fn next_id(&mut self) -> RecordId {
        self.next_id += 1;
        self.next_id
    }
}

pub struct DemoBackend {
    store: Mutex<Store>,
    timer: Mutex<Option<RunningTimer>>,
    outbox: mpsc::UnboundedSender<ConduitMessage>,
    interval: Duration,
}

impl DemoBackend {
    /// the backend and the conduit it pushes notifications into
    pub fn new(interval: Duration) -> (Arc<Self>, ConduitSource) {
        let (tx, rx) = mpsc::unbounded::<ConduitMessage>();
        let backend = DemoBackend {
            store: Mutex::new(Store::default()),
            timer: Mutex::new(None),
            outbox: tx,
            interval,
        };
        (Arc::new(backend), Box::pin(rx.map(Ok)))
    }

    pub fn method_table(self: &Arc<Self>) -> MethodTable {
        MethodTable::new()
            .with_fn("info", method(self, |backend, args| backend.info(args)))
            .with_fn("client_create", method(self, |backend, args| backend.client_create(args)))
            .with_fn("clients_list", method(self, |backend, args| backend.clients_list(args)))
            .with_fn("project_create", method(self, |backend, args| backend.project_create(args)))
            .with_fn("task_create", method(self, |backend, args| backend.task_create(args)))
            .with_fn("timer_check", method(self, |backend, args| backend.timer_check(args)))
            .with_fn("timer_start", method(self, |backend, args| backend.timer_start(args)))
            .with_fn("timer_stop", method(self, |backend, args| backend.timer_stop(args)))
            .with_fn("timer_pause", method(self, |backend, args| backend.timer_pause(args)))
            .with_fn("timer_resume", method(self, |backend, args| backend.timer_resume(args)))
            .with_fn("timer_override", method(self, |backend, args| backend.timer_override(args)))
    }

    /// closes the conduit, which stops the dispatcher on the other end
    pub fn shutdown(&self) {
        let _ = self
            .outbox
            .unbounded_send(ConduitMessage::Close(Some("backend shut down".to_string())));
    }

    fn push(&self, message: InboundMessage) -> anyhow::Result<()> {
        let text = message.to_json()?;
        self.outbox
            .unbounded_send(ConduitMessage::Text(text))
            .map_err(|err| anyhow::anyhow!("conduit closed: {}", err))
    }

    // methods
    // ---------------------------------------------------------------------------------------------------

    fn info(&self, args: Vec<Value>) -> anyhow::Result<Value> {
        let message: Option<String> = arg(&args, 0)?;
        info!("frontend-> {}", message.unwrap_or_default());
        Ok(Value::Null)
    }

    fn client_create(&self, args: Vec<Value>) -> anyhow::Result<Value> {
        let name: String = arg(&args, 0)?;
        let mut store = self.store.lock().map_err(poisoned)?;
        let client = Client {
            id: store.next_id(),
            name,
        };
        store.clients.push(client.clone());
        Ok(serde_json::to_value(client)?)
    }

    fn clients_list(&self, _args: Vec<Value>) -> anyhow::Result<Value> {
        let store = self.store.lock().map_err(poisoned)?;
        Ok(serde_json::to_value(&store.clients)?)
    }

    fn project_create(&self, args: Vec<Value>) -> anyhow::Result<Value> {
        let client_id: RecordId = arg(&args, 0)?;
        let name: String = arg(&args, 1)?;
        let mut store = self.store.lock().map_err(poisoned)?;
        if !store.clients.iter().any(|c| c.id == client_id) {
            anyhow::bail!("client {} does not exist", client_id);
        }
        let project = Project {
            id: store.next_id(),
            name,
            client_id,
            ..Default::default()
        };
        store.projects.push(project.clone());
        Ok(serde_json::to_value(project)?)
    }

    fn task_create(&self, args: Vec<Value>) -> anyhow::Result<Value> {
        let project_id: RecordId = arg(&args, 0)?;
        let name: String = arg(&args, 1)?;
        let mut store = self.store.lock().map_err(poisoned)?;
        if !store.projects.iter().any(|p| p.id == project_id) {
            anyhow::bail!("project {} does not exist", project_id);
        }
        let task = Task {
            id: store.next_id(),
            name,
            project_id,
            ..Default::default()
        };
        store.tasks.push(task.clone());
        Ok(serde_json::to_value(task)?)
    }

    fn timer_check(&self, _args: Vec<Value>) -> anyhow::Result<Value> {
        let timer = self.timer.lock().map_err(poisoned)?;
        let running = timer
            .as_ref()
            .is_some_and(|t| t.running.load(Ordering::SeqCst));
        Ok(json!(running))
    }

    fn timer_start(self: &Arc<Self>, args: Vec<Value>) -> anyhow::Result<Value> {
        let listener: CorrelationId = arg(&args, 0)?;
        let task_id: RecordId = arg(&args, 1)?;

        let event = {
            let mut store = self.store.lock().map_err(poisoned)?;
            if !store.tasks.iter().any(|t| t.id == task_id) {
                anyhow::bail!("task {} does not exist", task_id);
            }
            let event = Event {
                id: store.next_id(),
                task_id,
                ..Default::default()
            };
            store.events.push(event.clone());
            event
        };

        let mut timer = self.timer.lock().map_err(poisoned)?;
        if timer.is_none() {
            let running = RunningTimer {
                listener: Arc::new(Mutex::new(listener)),
                paused: Arc::new(AtomicBool::new(false)),
                running: Arc::new(AtomicBool::new(true)),
            };
            tokio::spawn(self.clone().run_timer(
                running.listener.clone(),
                running.paused.clone(),
                running.running.clone(),
            ));
            *timer = Some(running);
        }

        Ok(serde_json::to_value(event)?)
    }

    fn timer_stop(&self, _args: Vec<Value>) -> anyhow::Result<Value> {
        let timer = self.timer.lock().map_err(poisoned)?.take();
        match timer {
            Some(timer) => {
                timer.running.store(false, Ordering::SeqCst);
                Ok(json!(true))
            }
            None => Ok(json!(false)),
        }
    }

    /// redirects ticks to a new listener and releases the old one, a no-op without a timer
    fn timer_override(&self, args: Vec<Value>) -> anyhow::Result<Value> {
        let new_receiver: CorrelationId = arg(&args, 0)?;
        let timer = self.timer.lock().map_err(poisoned)?;
        let Some(timer) = timer.as_ref() else {
            return Ok(Value::Null);
        };
        let previous = std::mem::replace(
            &mut *timer.listener.lock().map_err(poisoned)?,
            new_receiver,
        );
        self.push(InboundMessage::EndCallback { id: previous })?;
        Ok(Value::Null)
    }

    fn timer_pause(&self, _args: Vec<Value>) -> anyhow::Result<Value> {
        self.set_paused(true)
    }

    fn timer_resume(&self, _args: Vec<Value>) -> anyhow::Result<Value> {
        self.set_paused(false)
    }

    fn set_paused(&self, paused: bool) -> anyhow::Result<Value> {
        let timer = self.timer.lock().map_err(poisoned)?;
        match timer.as_ref() {
            Some(timer) => {
                timer.paused.store(paused, Ordering::SeqCst);
                Ok(json!(true))
            }
            None => Ok(json!(false)),
        }
    }

    // timer
    // ---------------------------------------------------------------------------------------------------

    async fn run_timer(
        self: Arc<Self>,
        listener: Arc<Mutex<CorrelationId>>,
        paused: Arc<AtomicBool>,
        running: Arc<AtomicBool>,
    ) {
        let mut ticker = tokio::time::interval(self.interval);
        let mut elapsed = Duration::ZERO;

        debug!("Timer started");
        while running.load(Ordering::SeqCst) {
            ticker.tick().await;
            if paused.load(Ordering::SeqCst) || !running.load(Ordering::SeqCst) {
                continue;
            }

            elapsed += self.interval;
            let total = elapsed.as_secs();
            let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);

            let Some(id) = current(&listener) else { break };
            let tick = InboundMessage::CriticalCall {
                id,
                args: vec![json!([hours, minutes, seconds])],
            };
            if self.push(tick).is_err() {
                break;
            }
        }

        debug!("Timer stopping");
        if let Some(id) = current(&listener) {
            let _ = self.push(InboundMessage::EndCallback { id });
        }
    }
}

// -------------------------------------------------------------------------------------------------------

fn current(listener: &Mutex<CorrelationId>) -> Option<CorrelationId> {
    listener.lock().ok().map(|id| id.clone())
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> anyhow::Error {
    anyhow::anyhow!("backend state is poisoned")
}

/// positional argument `index`; a missing trailing argument reads as `null`
fn arg<T: DeserializeOwned>(args: &[Value], index: usize) -> anyhow::Result<T> {
    let value = args.get(index).cloned().unwrap_or(Value::Null);
    serde_json::from_value(value)
        .map_err(|err| anyhow::anyhow!("argument {} is invalid: {}", index, err))
}

fn method<F>(
    backend: &Arc<DemoBackend>,
    f: F,
) -> impl Fn(Vec<Value>) -> future::Ready<anyhow::Result<Value>> + Send + Sync + 'static
where
    F: Fn(&Arc<DemoBackend>, Vec<Value>) -> anyhow::Result<Value> + Send + Sync + 'static,
{
    let backend = backend.clone();
    move |args| future::ready(f(&backend, args))
}
