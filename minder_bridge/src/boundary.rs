use std::{
    fmt::Display,
    sync::{Arc, Mutex},
};

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::{
    config::BridgeConfig,
    deferred::Deferred,
    error::{BridgeError, BridgeResult},
    host::{HostHandle, MethodTable, RemoteMethod},
    operation::RemoteOperation,
    switchboard::Switchboard,
    util::lock,
};

// -------------------------------------------------------------------------------------------------------

pub enum ConnectionState {
    Disconnected,
    /// the cached method table; never invalidated
    Connected(Arc<MethodTable>),
}

/// Outbound transport into the host's method table.
///
/// Connects lazily on the first call and stays connected for the rest of the session. The
/// switchboard is injected so that ids minted for [`Boundary::request`] are the ones the inbound
/// dispatcher routes.
pub struct Boundary {
    host: HostHandle,
    switchboard: Switchboard,
    config: BridgeConfig,
    state: Mutex<ConnectionState>,
}

impl std::fmt::Debug for Boundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Boundary")
            .field("connected", &self.is_connected())
            .field("host", &self.host)
            .field("switchboard", &self.switchboard)
            .finish()
    }
}

impl Boundary {
    pub fn new(host: HostHandle, switchboard: Switchboard) -> Self {
        Self::with_config(host, switchboard, BridgeConfig::default())
    }

    pub fn with_config(host: HostHandle, switchboard: Switchboard, config: BridgeConfig) -> Self {
        Boundary {
            host,
            switchboard,
            config,
            state: Mutex::new(ConnectionState::Disconnected),
        }
    }

    pub fn host(&self) -> &HostHandle {
        &self.host
    }

    pub fn switchboard(&self) -> &Switchboard {
        &self.switchboard
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        matches!(*lock(&self.state), ConnectionState::Connected(_))
    }

    fn connect(&self) -> BridgeResult<Arc<MethodTable>> {
        let mut state = lock(&self.state);
        if let ConnectionState::Connected(table) = &*state {
            return Ok(table.clone());
        }

        match self.host.method_table() {
            Some(table) if table.contains(&self.config.readiness_probe) => {
                *state = ConnectionState::Connected(table.clone());
                info!("Connected! {} backend methods available", table.len());
                Ok(table)
            }
            Some(_) => {
                warn!(
                    "Unable to connect to backend; method table lacks the {} probe",
                    self.config.readiness_probe
                );
                Err(BridgeError::NotConnected)
            }
            None => {
                warn!(
                    "Unable to connect to backend; host has not fired {} yet",
                    self.host.readiness_event()
                );
                Err(BridgeError::NotConnected)
            }
        }
    }

    fn resolve(&self, name: &str) -> BridgeResult<Arc<dyn RemoteMethod>> {
        self.connect()?
            .get(name)
            .ok_or_else(|| BridgeError::UnknownMethod {
                name: name.to_string(),
            })
    }

    async fn invoke(
        &self,
        name: &str,
        method: Arc<dyn RemoteMethod>,
        args: Vec<Value>,
    ) -> BridgeResult<Value> {
        let call = method.invoke(args);
        let result = match self.config.call_timeout() {
            Some(timeout) => tokio::time::timeout(timeout, call)
                .await
                .map_err(|_| BridgeError::Timeout {
                    method: name.to_string(),
                    timeout,
                })?,
            None => call.await,
        };
        result.map_err(|err| BridgeError::remote(name, err))
    }

    /// Calls `name` with positional `args` and returns its answer.
    pub async fn remote(&self, name: &str, args: Vec<Value>) -> BridgeResult<Value> {
        info!(method = name, ?args, "Calling {}", name);
        let method = self.resolve(name)?;
        let result = self.invoke(name, method, args).await;
        if let Err(err) = &result {
            error!(method = name, "{}", err);
        }
        result
    }

    /// Calls `name` with a fresh correlation id appended to `args` and returns the deferred the
    /// backend fulfills later through `returnCall`.
    ///
    /// The method is resolved before anything is registered, so an unknown method or a missing
    /// host fails right here. The call itself runs in the background and its direct return value
    /// is discarded; if it fails, the registration is dropped and waiting on the deferred reports
    /// [`BridgeError::Abandoned`]. Outside a tokio runtime nothing is sent and the call fails with
    /// [`BridgeError::NoRuntime`].
    pub fn request(&self, name: &str, mut args: Vec<Value>) -> BridgeResult<Deferred<Value>> {
        let method = self.resolve(name)?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| BridgeError::NoRuntime {
            method: name.to_string(),
        })?;

        let deferred = Deferred::new();
        let id = self.switchboard.register(&deferred);
        args.push(id.clone().into());
        info!(method = name, %id, ?args, "Requesting {}", name);

        let switchboard = self.switchboard.clone();
        let timeout = self.config.call_timeout();
        let name = name.to_string();
        runtime.spawn(async move {
            let call = method.invoke(args);
            let outcome = match timeout {
                Some(timeout) => match tokio::time::timeout(timeout, call).await {
                    Ok(result) => result.map_err(|err| BridgeError::remote(&name, err)),
                    Err(_) => Err(BridgeError::Timeout {
                        method: name.clone(),
                        timeout,
                    }),
                },
                None => call.await.map_err(|err| BridgeError::remote(&name, err)),
            };

            match outcome {
                Ok(value) => debug!(method = %name, %id, ?value, "request dispatched"),
                Err(err) => {
                    error!(method = %name, %id, "{}", err);
                    switchboard.deregister(&id);
                }
            }
        });

        Ok(deferred)
    }

    /// Typed call: encodes the operation's arguments and decodes its answer.
    pub async fn call<O: RemoteOperation>(&self, operation: O) -> BridgeResult<O::Response> {
        let args = operation
            .into_arguments()
            .map_err(|err| BridgeError::Encode {
                method: O::METHOD.to_string(),
                reason: err.to_string(),
            })?;

        let value = self.remote(O::METHOD, args).await?;

        serde_json::from_value(value).map_err(|err| BridgeError::Decode {
            method: O::METHOD.to_string(),
            reason: err.to_string(),
        })
    }

    /// Logs `message` and, if already connected, forwards it to the backend's own log.
    /// Never fails; forwarding problems are only logged.
    pub async fn info(&self, message: impl Display) {
        let message = message.to_string();
        info!("{}", message);

        if !self.is_connected() {
            return;
        }

        let probe = self.config.readiness_probe.clone();
        match self.resolve(&probe) {
            Ok(method) => {
                if let Err(err) = self.invoke(&probe, method, vec![Value::String(message)]).await {
                    warn!("Unable to forward info to backend: {}", err);
                }
            }
            Err(err) => warn!("Unable to forward info to backend: {}", err),
        }
    }
}

// -------------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------------
