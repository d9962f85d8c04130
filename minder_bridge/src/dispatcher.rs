use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort, async_trait};
use tracing::{error, info, warn};

use crate::{
    error::BridgeResult,
    inbound::InboundMessage,
    switchboard::Switchboard,
};

// -------------------------------------------------------------------------------------------------------

// Messages for the dispatcher actor
pub enum DispatcherMessage {
    /// a json envelope as received from the host
    Text(String),
    /// an already decoded envelope
    Notification(InboundMessage),
    /// like `Notification`, but reports the outcome, so a host shim can surface strict-path failures
    Dispatch(InboundMessage, RpcReplyPort<BridgeResult<()>>),
    /// report how many notifications were delivered and rejected so far
    Stats(RpcReplyPort<DispatcherStats>),
    Close,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatcherStats {
    pub delivered: u64,
    pub rejected: u64,
}

// -------------------------------------------------------------------------------------------------------

/// Serializes inbound notifications into the switchboard, so deliveries for one id keep the order
/// in which the host sent them.
pub struct DispatcherActor;

pub struct DispatcherActorState {
    args: DispatcherActorArgs,
    stats: DispatcherStats,
}

pub struct DispatcherActorArgs {
    pub identifier: String,
    pub switchboard: Switchboard,
}

impl DispatcherActorState {
    fn dispatch(&mut self, message: InboundMessage) -> BridgeResult<()> {
        let result = self.args.switchboard.dispatch(message);
        match &result {
            Ok(()) => self.stats.delivered += 1,
            Err(err) => {
                self.stats.rejected += 1;
                error!(
                    "Dispatcher {} rejected a notification: {}",
                    self.args.identifier, err
                );
            }
        }
        result
    }
}

#[async_trait]
impl Actor for DispatcherActor {
    type Msg = DispatcherMessage;
    type State = DispatcherActorState;
    type Arguments = DispatcherActorArgs;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        info!("Starting dispatcher {}", args.identifier);
        Ok(DispatcherActorState {
            args,
            stats: DispatcherStats::default(),
        })
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            DispatcherMessage::Text(text) => match InboundMessage::parse(&text) {
                Ok(notification) => {
                    let _ = state.dispatch(notification);
                }
                Err(err) => {
                    state.stats.rejected += 1;
                    warn!(
                        "Dispatcher {} dropped a message: {} ({})",
                        state.args.identifier, err, text
                    );
                }
            },
            DispatcherMessage::Notification(notification) => {
                let _ = state.dispatch(notification);
            }
            DispatcherMessage::Dispatch(notification, reply) => {
                let result = state.dispatch(notification);
                if reply.send(result).is_err() {
                    warn!("Dispatch reply port was dropped before the result arrived");
                }
            }
            DispatcherMessage::Stats(reply) => {
                let _ = reply.send(state.stats);
            }
            DispatcherMessage::Close => {
                info!("Closing dispatcher {}", state.args.identifier);
                myself.stop(Some("Conduit closed".into()));
            }
        }
        Ok(())
    }
}

// Helper function to create and start the dispatcher actor
pub async fn start_dispatcher(
    identifier: String,
    switchboard: Switchboard,
) -> Result<(ActorRef<DispatcherMessage>, ractor::concurrency::JoinHandle<()>), ractor::SpawnErr>
{
    Actor::spawn(
        None,
        DispatcherActor,
        DispatcherActorArgs {
            identifier,
            switchboard,
        },
    )
    .await
}

// -------------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------------
