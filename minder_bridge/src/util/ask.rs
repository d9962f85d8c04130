use ractor::{ActorRef, RpcReplyPort, async_trait, concurrency::Duration, rpc::CallResult};

use crate::error::{BridgeError, BridgeResult};

// -------------------------------------------------------------------------------------------------------

/// Request/response against one of the bridge's actors, e.g. `DispatcherMessage::Stats`.
#[allow(non_camel_case_types)]
#[async_trait]
pub trait ActorRef_Ask<TMessage: ractor::Message + 'static> {
    async fn ask<TReply: Send + 'static, TMsgBuilder>(
        &self,
        msg_builder: TMsgBuilder,
        timeout_option: Option<Duration>,
    ) -> BridgeResult<TReply>
    where
        TMsgBuilder: FnOnce(RpcReplyPort<TReply>) -> TMessage + Send;
}

#[async_trait]
impl<TMessage: ractor::Message + 'static> ActorRef_Ask<TMessage> for ActorRef<TMessage> {
    async fn ask<TReply: Send + 'static, TMsgBuilder>(
        &self,
        msg_builder: TMsgBuilder,
        timeout_option: Option<Duration>,
    ) -> BridgeResult<TReply>
    where
        TMsgBuilder: FnOnce(RpcReplyPort<TReply>) -> TMessage + Send,
    {
        let unreachable = |reason: String| BridgeError::Unreachable {
            actor: format!("{} [{}]", self.get_id(), std::any::type_name::<TMessage>()),
            reason,
        };

        match self
            .call(msg_builder, timeout_option)
            .await
            .map_err(|err| unreachable(err.to_string()))?
        {
            CallResult::Success(reply) => Ok(reply),
            CallResult::Timeout => Err(unreachable(format!(
                "no reply within {:?}",
                timeout_option
            ))),
            CallResult::SenderError => Err(unreachable("reply port was dropped".to_string())),
        }
    }
}
