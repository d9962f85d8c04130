use futures::{Stream, StreamExt};
use log::{error, info};
use ractor::ActorRef;
use std::pin::Pin;

use crate::{
    dispatcher::{DispatcherMessage, start_dispatcher},
    switchboard::Switchboard,
};

// -------------------------------------------------------------------------------------------------------

/// raw messages pushed by the host towards the ui
pub enum ConduitMessage {
    /// a json encoded [`crate::inbound::InboundMessage`]
    Text(String),
    Close(Option<String>),
}

pub type ConduitError = anyhow::Error;

pub type ConduitSource = Pin<Box<dyn Stream<Item = Result<ConduitMessage, ConduitError>> + Send>>;

// -------------------------------------------------------------------------------------------------------

/// Starts a dispatcher for `switchboard` and pumps everything arriving on `source` into it.
/// The dispatcher stops when the source closes.
pub async fn from_source(
    switchboard: Switchboard,
    identifier: String,
    source: ConduitSource,
) -> Result<ActorRef<DispatcherMessage>, anyhow::Error> {
    let (dispatcher, _handle) = start_dispatcher(identifier.clone(), switchboard)
        .await
        .map_err(|err| anyhow::anyhow!(err))?;

    tokio::spawn(receive_loop(source, identifier, dispatcher.clone()));

    Ok(dispatcher)
}

pub async fn receive_loop(
    mut source: ConduitSource,
    identifier: String,
    actor_ref: ActorRef<DispatcherMessage>,
) {
    while let Some(msg) = source.next().await {
        match msg {
            Ok(ConduitMessage::Text(text)) => {
                if let Err(err) = actor_ref.cast(DispatcherMessage::Text(text)) {
                    error!("Error sending text message to dispatcher: {}", err);
                    break;
                }
            }
            Ok(ConduitMessage::Close(reason)) => {
                info!(
                    "Conduit {} closed because of reason: {:?}",
                    identifier, reason
                );
                break;
            }
            Err(e) => {
                error!("Error receiving message from {}: {}", identifier, e);
                break;
            }
        }
    }

    info!("Conduit {} closed", identifier);
    let _ = actor_ref.cast(DispatcherMessage::Close);
}
