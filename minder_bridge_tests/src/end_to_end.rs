use std::sync::{Arc, Mutex};
use std::time::Duration;

use minder_bridge::api::Api;
use minder_bridge::dispatcher::{DispatcherMessage, DispatcherStats};
use minder_bridge::util::ActorRef_Ask;
use minder_bridge::{
    Boundary, BridgeError, CorrelationId, HostHandle, InboundMessage, MethodTable, Switchboard,
    conduit,
};
use ractor::ActorStatus;
use serde_json::json;

use crate::mock_backend::MockBackend;

/// boundary, dispatcher and mock backend, sharing one switchboard
async fn wire_up() -> anyhow::Result<(
    Arc<Boundary>,
    MockBackend,
    ractor::ActorRef<DispatcherMessage>,
)> {
    let (backend, source) = MockBackend::new();
    let switchboard = Switchboard::new();

    let dispatcher =
        conduit::from_source(switchboard.clone(), "e2e".to_string(), source).await?;

    let host = HostHandle::with_table(backend.method_table());
    let boundary = Arc::new(Boundary::new(host, switchboard));
    Ok((boundary, backend, dispatcher))
}

/// the conduit pumps into the dispatcher on its own task, so poll until it caught up
async fn wait_for_stats(
    dispatcher: &ractor::ActorRef<DispatcherMessage>,
    done: impl Fn(&DispatcherStats) -> bool,
) -> anyhow::Result<DispatcherStats> {
    let poll = async {
        loop {
            let stats: DispatcherStats = dispatcher
                .ask(DispatcherMessage::Stats, Some(Duration::from_secs(1)))
                .await?;
            if done(&stats) {
                return Ok::<_, anyhow::Error>(stats);
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    };
    tokio::time::timeout(Duration::from_secs(1), poll).await?
}

#[tokio::test]
async fn repeating_subscription_until_finished() -> anyhow::Result<()> {
    let (boundary, backend, dispatcher) = wire_up().await?;
    let switchboard = boundary.switchboard();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    let id = switchboard.generate(move |args| seen_clone.lock().unwrap().push(args));

    for n in [1, 2, 3] {
        backend.push(InboundMessage::CallBack {
            id: id.clone(),
            args: vec![json!(n)],
        });
    }
    backend.push(InboundMessage::EndCallback { id: id.clone() });
    backend.push(InboundMessage::CallBack {
        id: id.clone(),
        args: vec![json!(4)],
    });

    let stats = wait_for_stats(&dispatcher, |stats| stats.delivered >= 5).await?;
    assert_eq!(stats.rejected, 0);
    assert_eq!(
        *seen.lock().unwrap(),
        vec![vec![json!(1)], vec![json!(2)], vec![json!(3)]]
    );
    assert!(!switchboard.contains(&id));
    Ok(())
}

#[tokio::test]
async fn request_is_fulfilled_by_out_of_band_return() -> anyhow::Result<()> {
    let (boundary, _backend, _dispatcher) = wire_up().await?;

    let deferred = boundary.request("echo_later", vec![json!({"answer": 42})])?;
    assert!(!deferred.is_fulfilled());
    assert_eq!(boundary.switchboard().len(), 1);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    deferred.add_callback(move |value| seen_clone.lock().unwrap().push(value));

    let value = tokio::time::timeout(Duration::from_secs(1), deferred.clone().wait()).await??;
    assert_eq!(value, json!({"answer": 42}));
    assert_eq!(*seen.lock().unwrap(), vec![json!({"answer": 42})]);

    // one-shot: the registration is gone once answered
    assert!(boundary.switchboard().is_empty());
    Ok(())
}

#[tokio::test]
async fn late_and_duplicate_returns_are_harmless() -> anyhow::Result<()> {
    let (boundary, backend, dispatcher) = wire_up().await?;

    let deferred = boundary.request("echo_later", vec![json!("first")])?;
    let value = tokio::time::timeout(Duration::from_secs(1), deferred.clone().wait()).await??;
    assert_eq!(value, json!("first"));

    // the backend answers again, and also talks to an id nobody minted
    let stale = CorrelationId::new("staleStale00");
    backend.push(InboundMessage::ReturnCall {
        id: stale.clone(),
        result: json!("second"),
    });
    backend.push(InboundMessage::CallBack {
        id: stale.clone(),
        args: vec![json!(1)],
    });
    backend.push(InboundMessage::EndCallback { id: stale });
    backend.push_raw(r#"{"entry": "teleport", "id": "x"}"#);
    backend.push(InboundMessage::CriticalCall {
        id: CorrelationId::new("criticalNone"),
        args: vec![],
    });

    // return/callBack/endCallback to unknown ids are quietly ignored; the malformed envelope and
    // the critical call are not
    let stats = wait_for_stats(&dispatcher, |stats| stats.delivered + stats.rejected >= 6).await?;
    assert_eq!(
        stats,
        DispatcherStats {
            delivered: 4,
            rejected: 2
        }
    );
    assert_eq!(deferred.result(), Some(json!("first")));
    Ok(())
}

#[tokio::test]
async fn failed_request_is_abandoned() -> anyhow::Result<()> {
    let (boundary, _backend, _dispatcher) = wire_up().await?;

    // `project_get` fails on the backend, nothing will ever answer the id
    let deferred = boundary.request("project_get", vec![json!(3)])?;
    let result = tokio::time::timeout(Duration::from_secs(1), deferred.wait()).await?;
    assert_eq!(result, Err(BridgeError::Abandoned));
    assert!(boundary.switchboard().is_empty());

    let result = boundary.request("no_such_method", vec![]);
    assert!(matches!(result, Err(BridgeError::UnknownMethod { .. })));
    assert!(boundary.switchboard().is_empty());
    Ok(())
}

#[tokio::test]
async fn calls_wait_for_the_readiness_event() -> anyhow::Result<()> {
    let (backend, _source) = MockBackend::new();
    let host = HostHandle::new();
    let api = Api::new(Arc::new(Boundary::new(host.clone(), Switchboard::new())));

    // before the host is ready, nothing gets through and nothing is cached
    assert_eq!(
        api.clients_list().await.err(),
        Some(BridgeError::NotConnected)
    );
    api.boundary().info("too early").await;
    assert!(!api.boundary().is_connected());

    let installer = {
        let host = host.clone();
        let table = backend.method_table();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            host.install(table)
        })
    };

    host.wait_ready_timeout(Duration::from_secs(1)).await?;
    assert!(installer.await?);

    let clients = api.clients_list().await?;
    assert_eq!(clients.len(), 2);
    assert!(api.boundary().is_connected());

    let client = api.client_create("Globex").await?;
    assert_eq!(client.name, "Globex");

    api.boundary().info("now connected").await;
    api.info("typed").await?;
    assert_eq!(backend.log(), vec!["now connected", "typed"]);
    Ok(())
}

#[tokio::test]
async fn host_without_probe_never_connects() -> anyhow::Result<()> {
    let table = MethodTable::new().with_fn("clients_list", |_| async { Ok(json!([])) });
    let api = Api::new(Arc::new(Boundary::new(
        HostHandle::with_table(table),
        Switchboard::new(),
    )));

    assert_eq!(
        api.clients_list().await.err(),
        Some(BridgeError::NotConnected)
    );
    Ok(())
}

#[tokio::test]
async fn closing_the_conduit_stops_the_dispatcher() -> anyhow::Result<()> {
    let (_boundary, backend, dispatcher) = wire_up().await?;

    backend.close();

    tokio::time::timeout(Duration::from_secs(1), async {
        while !matches!(dispatcher.get_status(), ActorStatus::Stopped) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await?;

    Ok(())
}
