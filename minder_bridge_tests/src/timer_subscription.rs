use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use minder_bridge::api::{Api, TimerTick, TimerTicks};
use minder_bridge::{Boundary, HostHandle, Switchboard, conduit};

use crate::mock_backend::MockBackend;

async fn next_tick(ticks: &mut TimerTicks) -> anyhow::Result<Option<TimerTick>> {
    Ok(tokio::time::timeout(Duration::from_secs(1), ticks.next_tick()).await?)
}

#[tokio::test]
pub async fn ticks_arrive_through_the_conduit() -> anyhow::Result<()> {
    let (backend, source) = MockBackend::new();
    let switchboard = Switchboard::new();
    let _dispatcher = conduit::from_source(switchboard.clone(), "timer".to_string(), source).await?;

    let host = HostHandle::with_table(backend.method_table());
    let api = Api::new(Arc::new(Boundary::new(host, switchboard.clone())));
    let timer = api.timer();

    let (event, mut ticks) = timer.start(4).await?;
    assert_eq!(event.task_id, 4);
    assert_eq!(backend.timer_listener().as_ref(), Some(ticks.listener()));

    backend.tick(0, 0, 1);
    backend.tick(0, 0, 2);
    backend.tick(1, 2, 3);

    assert_eq!(next_tick(&mut ticks).await?.map(|t| t.seconds), Some(1));
    assert_eq!(next_tick(&mut ticks).await?.map(|t| t.seconds), Some(2));
    assert_eq!(
        next_tick(&mut ticks).await?,
        Some(TimerTick {
            hours: 1,
            minutes: 2,
            seconds: 3
        })
    );

    assert!(timer.stop().await?);
    assert_eq!(next_tick(&mut ticks).await?, None);
    assert!(switchboard.is_empty());
    Ok(())
}

#[tokio::test]
pub async fn override_moves_ticks_to_a_new_stream() -> anyhow::Result<()> {
    let (backend, source) = MockBackend::new();
    let switchboard = Switchboard::new();
    let _dispatcher = conduit::from_source(switchboard.clone(), "timer".to_string(), source).await?;

    let host = HostHandle::with_table(backend.method_table());
    let api = Api::new(Arc::new(Boundary::new(host, switchboard.clone())));
    let timer = api.timer();

    let (_event, first) = timer.start(4).await?;
    backend.tick(0, 0, 1);

    let second = timer.override_listener().await?;
    assert_ne!(first.listener(), second.listener());
    assert_eq!(timer.listener().as_ref(), Some(second.listener()));
    backend.tick(0, 0, 2);
    backend.tick(0, 0, 3);

    // the old stream drains what was sent before the override, then ends
    let old: Vec<u64> = tokio::time::timeout(Duration::from_secs(1), first.map(|t| t.seconds).collect())
        .await?;
    assert_eq!(old, vec![1]);

    assert!(timer.stop().await?);
    let new: Vec<u64> = tokio::time::timeout(Duration::from_secs(1), second.map(|t| t.seconds).collect())
        .await?;
    assert_eq!(new, vec![2, 3]);
    assert!(switchboard.is_empty());
    Ok(())
}

#[tokio::test]
pub async fn restarting_a_running_timer_leaves_no_registration_behind() -> anyhow::Result<()> {
    let (backend, source) = MockBackend::new();
    let switchboard = Switchboard::new();
    let _dispatcher = conduit::from_source(switchboard.clone(), "timer".to_string(), source).await?;

    let host = HostHandle::with_table(backend.method_table());
    let api = Api::new(Arc::new(Boundary::new(host, switchboard.clone())));
    let timer = api.timer();

    let (_event, first) = timer.start(4).await?;
    let (_event, mut second) = timer.start(4).await?;
    assert_eq!(backend.timer_listener().as_ref(), Some(second.listener()));

    let old: Vec<TimerTick> = tokio::time::timeout(Duration::from_secs(1), first.collect()).await?;
    assert!(old.is_empty());

    backend.tick(0, 0, 1);
    assert_eq!(next_tick(&mut second).await?.map(|t| t.seconds), Some(1));

    assert!(timer.stop().await?);
    assert_eq!(next_tick(&mut second).await?, None);
    assert!(switchboard.is_empty());
    Ok(())
}
