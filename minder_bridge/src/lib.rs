//! Bridge between a webview ui and the native backend hosting it.
//!
//! Outbound, [`Boundary`] invokes the backend's method table by name. Inbound, the backend pushes
//! notifications addressed by [`CorrelationId`], which a [`Switchboard`] routes to the continuation
//! registered for them, either once ([`Deferred`]) or repeatedly (subscriptions).
//!
//! ```text
//!  ui ── Api ── Boundary::remote/request ──────────────▶ MethodTable (backend)
//!                     │ register / generate                    │
//!                     ▼                                        │ returnCall / callBack /
//!                Switchboard ◀── DispatcherActor ◀── conduit ◀─┘ criticalCall / endCallback
//! ```
#![recursion_limit = "256"]

pub mod api;
pub mod boundary;
pub mod conduit;
pub mod config;
pub mod correlation;
pub mod deferred;
pub mod dispatcher;
pub mod error;
pub mod host;
pub mod inbound;
pub mod operation;
pub mod switchboard;
pub mod util;

extern crate self as minder_bridge;

pub use api::Api;
pub use boundary::Boundary;
pub use config::BridgeConfig;
pub use correlation::CorrelationId;
pub use deferred::Deferred;
pub use error::{BridgeError, BridgeResult};
pub use host::{HostHandle, MethodTable, RemoteMethod};
pub use inbound::InboundMessage;
pub use switchboard::{Subscription, Switchboard};

#[cfg(feature = "derive")]
pub use minder_bridge_derive::RemoteOperation;
