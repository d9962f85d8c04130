use std::sync::Arc;
use std::time::Duration;

use minder_bridge::{
    Boundary, BridgeConfig, HostHandle, Switchboard,
    api::Api,
    conduit,
    dispatcher::{DispatcherMessage, DispatcherStats},
    util::ActorRef_Ask,
};

use crate::backend::DemoBackend;

/// how long the host takes before its api object shows up
const HOST_STARTUP: Duration = Duration::from_millis(150);

pub async fn run(config: BridgeConfig, ticks: usize, interval: Duration) -> Result<(), anyhow::Error> {
    let switchboard = Switchboard::with_id_length(config.id_length);
    let host = HostHandle::with_readiness_event(config.readiness_event.clone());

    let (backend, source) = DemoBackend::new(interval);
    let dispatcher = conduit::from_source(switchboard.clone(), "demo".to_string(), source).await?;

    let boundary = Arc::new(Boundary::with_config(host.clone(), switchboard.clone(), config));
    let api = Api::new(boundary.clone());

    {
        let host = host.clone();
        let table = backend.method_table();
        tokio::spawn(async move {
            tokio::time::sleep(HOST_STARTUP).await;
            host.install(table);
        });
    }

    // only logged locally, the backend is not there yet
    boundary.info("waiting for the backend").await;
    host.wait_ready_timeout(Duration::from_secs(5)).await?;
    api.info("ui connected").await?;

    let client = api.client_create("ACME").await?;
    let project = api.project_create(client.id, "Website").await?;
    let task = api.task_create(project.id, "Landing page").await?;
    println!(
        "Tracking task '{}' of project '{}' for client '{}'",
        task.name, project.name, client.name
    );

    let timer = api.timer();
    let (event, mut stream) = timer.start(task.id).await?;
    println!(
        "Timer running on event {} (listener {})",
        event.id,
        stream.listener()
    );

    for _ in 0..ticks {
        match stream.next_tick().await {
            Some(tick) => println!("  {}", tick),
            None => break,
        }
    }

    println!("Timer still running: {}", api.timer_check().await?);
    timer.stop().await?;

    // ticks already on their way are still delivered, then the backend ends the stream
    let mut late = 0;
    while tokio::time::timeout(Duration::from_secs(5), stream.next_tick())
        .await?
        .is_some()
    {
        late += 1;
    }
    println!("Timer stopped, stream ended after {} late ticks", late);

    let stats: DispatcherStats = dispatcher
        .ask(DispatcherMessage::Stats, Some(Duration::from_secs(1)))
        .await?;
    println!(
        "Dispatcher delivered {} notifications, rejected {}",
        stats.delivered, stats.rejected
    );
    println!("Open registrations: {}", switchboard.len());

    backend.shutdown();
    Ok(())
}
