use std::{
    pin::Pin,
    sync::{Arc, Mutex},
    task::{Context, Poll},
};

use futures::{Stream, StreamExt};
use tracing::{info, warn};

use super::{
    operations::{TimerOverride, TimerPause, TimerResume, TimerStart, TimerStop},
    types::{Event, RecordId, TimerTick},
};
use crate::{
    boundary::Boundary,
    correlation::CorrelationId,
    error::BridgeResult,
    switchboard::Subscription,
    util::lock,
};

// -------------------------------------------------------------------------------------------------------

/// Drives the backend timer and owns the subscription its ticks arrive on.
///
/// The backend pushes one tick per interval to the listener id given at start, and ends that
/// subscription with `endCallback` when the timer stops or is redirected. Ticks already in flight
/// are still delivered before the stream ends.
pub struct TimerBroker {
    boundary: Arc<Boundary>,
    listener: Mutex<Option<CorrelationId>>,
}

impl std::fmt::Debug for TimerBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerBroker")
            .field("listener", &self.listener())
            .finish()
    }
}

impl TimerBroker {
    pub fn new(boundary: Arc<Boundary>) -> Self {
        TimerBroker {
            boundary,
            listener: Mutex::new(None),
        }
    }

    /// id the ticks are currently routed to
    pub fn listener(&self) -> Option<CorrelationId> {
        lock(&self.listener).clone()
    }

    /// Starts the timer on today's event of `task_id`.
    ///
    /// A running timer keeps ticking into its first listener on the backend, so a timer this broker
    /// already drives is first redirected to the new stream. The previous stream then ends.
    pub async fn start(&self, task_id: RecordId) -> BridgeResult<(Event, TimerTicks)> {
        let switchboard = self.boundary.switchboard();
        let (listener_id, subscription) = switchboard.subscribe();

        let redirected = match self.listener() {
            Some(previous) => {
                let moved = self
                    .boundary
                    .call(TimerOverride {
                        new_receiver: listener_id.clone(),
                    })
                    .await;
                if let Err(err) = moved {
                    // the backend cannot end it for us anymore
                    warn!(%previous, "Unable to redirect the running timer: {}", err);
                    switchboard.deregister(&previous);
                }
                true
            }
            None => false,
        };

        let started = self
            .boundary
            .call(TimerStart {
                listener_id: listener_id.clone(),
                task_id,
            })
            .await;

        match started {
            Ok(event) => {
                info!(%listener_id, task_id, event_id = event.id, "Timer started");
                self.replace_listener(Some(listener_id));
                Ok((event, TimerTicks { subscription }))
            }
            Err(err) => {
                switchboard.deregister(&listener_id);
                if redirected {
                    self.replace_listener(None);
                }
                Err(err)
            }
        }
    }

    /// Stops the timer. Returns whether a timer was running; the tick stream ends either way.
    pub async fn stop(&self) -> BridgeResult<bool> {
        let stopped = self.boundary.call(TimerStop).await?;
        let previous = self.replace_listener(None);
        info!(stopped, "Timer stop requested");

        // nothing was running, so nobody will end the subscription for us
        if let Some(previous) = previous.filter(|_| !stopped) {
            self.boundary.switchboard().deregister(&previous);
        }
        Ok(stopped)
    }

    pub async fn pause(&self) -> BridgeResult<bool> {
        self.boundary.call(TimerPause).await
    }

    pub async fn resume(&self) -> BridgeResult<bool> {
        self.boundary.call(TimerResume).await
    }

    /// Routes the running timer's ticks to a fresh stream. The previous stream ends once the backend
    /// releases it.
    pub async fn override_listener(&self) -> BridgeResult<TimerTicks> {
        let switchboard = self.boundary.switchboard();
        let (new_receiver, subscription) = switchboard.subscribe();

        if let Err(err) = self
            .boundary
            .call(TimerOverride {
                new_receiver: new_receiver.clone(),
            })
            .await
        {
            switchboard.deregister(&new_receiver);
            return Err(err);
        }

        info!(%new_receiver, "Timer listener overridden");
        self.replace_listener(Some(new_receiver));
        Ok(TimerTicks { subscription })
    }

    fn replace_listener(&self, listener: Option<CorrelationId>) -> Option<CorrelationId> {
        std::mem::replace(&mut *lock(&self.listener), listener)
    }
}

// -------------------------------------------------------------------------------------------------------

/// Ticks of one timer listener. Ends when the listener is deregistered.
pub struct TimerTicks {
    subscription: Subscription,
}

impl TimerTicks {
    pub fn listener(&self) -> &CorrelationId {
        self.subscription.id()
    }

    pub async fn next_tick(&mut self) -> Option<TimerTick> {
        self.next().await
    }
}

impl Stream for TimerTicks {
    type Item = TimerTick;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match Pin::new(&mut self.subscription).poll_next(cx) {
                Poll::Ready(Some(args)) => match TimerTick::from_args(&args) {
                    Ok(tick) => return Poll::Ready(Some(tick)),
                    Err(err) => warn!("Skipping timer notification: {}", err),
                },
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

// -------------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::{
        error::BridgeError,
        host::{HostHandle, MethodTable},
        switchboard::Switchboard,
    };

    fn timer_backend(switchboard: Switchboard) -> MethodTable {
        let listener: Arc<Mutex<Option<CorrelationId>>> = Arc::new(Mutex::new(None));

        let start_listener = listener.clone();
        let stop_listener = listener.clone();
        let stop_switchboard = switchboard.clone();

        MethodTable::new()
            .with_fn("info", |_| async { Ok(Value::Null) })
            .with_fn("timer_start", move |args: Vec<Value>| {
                let id = CorrelationId::new(args[0].as_str().unwrap_or_default());
                *start_listener.lock().unwrap() = Some(id);
                async { Ok(json!({"id": 11, "task_id": 4, "entries": []})) }
            })
            .with_fn("timer_stop", move |_| {
                if let Some(id) = stop_listener.lock().unwrap().take() {
                    stop_switchboard.finished(&id);
                }
                async { Ok(json!(true)) }
            })
            .with_fn("timer_pause", |_| async { Ok(json!(true)) })
            .with_fn("timer_override", |_| async { Err(anyhow::anyhow!("no timer running")) })
    }

    #[tokio::test]
    async fn ticks_flow_until_stop() -> anyhow::Result<()> {
        let switchboard = Switchboard::new();
        let host = HostHandle::with_table(timer_backend(switchboard.clone()));
        let broker = TimerBroker::new(Arc::new(Boundary::new(host, switchboard.clone())));

        let (event, mut ticks) = broker.start(4).await?;
        assert_eq!(event.id, 11);
        assert_eq!(broker.listener().as_ref(), Some(ticks.listener()));

        let id = ticks.listener().clone();
        switchboard.critical_call_back(&id, vec![json!([0, 0, 1])])?;
        switchboard.critical_call_back(&id, vec![json!("garbage")])?;
        switchboard.critical_call_back(&id, vec![json!(0), json!(0), json!(2)])?;

        assert_eq!(ticks.next_tick().await.map(|t| t.seconds), Some(1));
        assert_eq!(ticks.next_tick().await.map(|t| t.seconds), Some(2));

        assert!(broker.pause().await?);
        assert!(broker.stop().await?);
        assert_eq!(ticks.next_tick().await, None);
        assert!(broker.listener().is_none());
        assert!(switchboard.is_empty());
        Ok(())
    }

    /// answers like the real backend: a running timer keeps its first listener
    fn keep_first_backend(
        switchboard: Switchboard,
        listener: Arc<Mutex<Option<CorrelationId>>>,
    ) -> MethodTable {
        let start_listener = listener.clone();
        let override_listener = listener.clone();
        let override_switchboard = switchboard.clone();
        let stop_listener = listener;
        let stop_switchboard = switchboard;

        MethodTable::new()
            .with_fn("info", |_| async { Ok(Value::Null) })
            .with_fn("timer_start", move |args: Vec<Value>| {
                let mut current = start_listener.lock().unwrap();
                if current.is_none() {
                    *current = Some(CorrelationId::new(args[0].as_str().unwrap_or_default()));
                }
                async { Ok(json!({"id": 11, "task_id": 4, "entries": []})) }
            })
            .with_fn("timer_override", move |args: Vec<Value>| {
                let mut current = override_listener.lock().unwrap();
                if current.is_some() {
                    let new_receiver = CorrelationId::new(args[0].as_str().unwrap_or_default());
                    if let Some(old) = current.replace(new_receiver) {
                        override_switchboard.finished(&old);
                    }
                }
                async { Ok(Value::Null) }
            })
            .with_fn("timer_stop", move |_| {
                let previous = stop_listener.lock().unwrap().take();
                if let Some(id) = &previous {
                    stop_switchboard.finished(id);
                }
                let stopped = previous.is_some();
                async move { Ok(json!(stopped)) }
            })
    }

    #[tokio::test]
    async fn starting_twice_moves_ticks_to_the_new_stream() -> anyhow::Result<()> {
        let switchboard = Switchboard::new();
        let backend_listener: Arc<Mutex<Option<CorrelationId>>> = Arc::default();
        let host = HostHandle::with_table(keep_first_backend(
            switchboard.clone(),
            backend_listener.clone(),
        ));
        let broker = TimerBroker::new(Arc::new(Boundary::new(host, switchboard.clone())));

        let (_event, mut first) = broker.start(4).await?;
        let (_event, mut second) = broker.start(4).await?;

        assert_eq!(first.next_tick().await, None);
        assert_eq!(
            backend_listener.lock().unwrap().as_ref(),
            Some(second.listener())
        );
        assert_eq!(broker.listener().as_ref(), Some(second.listener()));
        assert_eq!(switchboard.len(), 1);

        let id = second.listener().clone();
        switchboard.critical_call_back(&id, vec![json!([0, 0, 5])])?;
        assert_eq!(second.next_tick().await.map(|t| t.seconds), Some(5));

        assert!(broker.stop().await?);
        assert_eq!(second.next_tick().await, None);
        assert!(switchboard.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn failed_redirect_on_restart_releases_the_old_stream() -> anyhow::Result<()> {
        let switchboard = Switchboard::new();
        let host = HostHandle::with_table(timer_backend(switchboard.clone()));
        let broker = TimerBroker::new(Arc::new(Boundary::new(host, switchboard.clone())));

        let (_event, mut first) = broker.start(4).await?;
        let (_event, second) = broker.start(4).await?;

        assert_eq!(first.next_tick().await, None);
        assert_eq!(broker.listener().as_ref(), Some(second.listener()));
        assert_eq!(switchboard.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn failed_override_keeps_the_current_listener() -> anyhow::Result<()> {
        let switchboard = Switchboard::new();
        let host = HostHandle::with_table(timer_backend(switchboard.clone()));
        let broker = TimerBroker::new(Arc::new(Boundary::new(host, switchboard.clone())));

        let (_event, ticks) = broker.start(4).await?;
        let result = broker.override_listener().await;

        assert!(matches!(result, Err(BridgeError::Remote { .. })));
        assert_eq!(broker.listener().as_ref(), Some(ticks.listener()));
        assert_eq!(switchboard.len(), 1);
        Ok(())
    }
}
