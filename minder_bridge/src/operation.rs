use serde::de::DeserializeOwned;
use serde_json::Value;

// -------------------------------------------------------------------------------------------------------

/// Typed contract of one backend method: its name, its positional arguments and the shape of its
/// answer. Usually derived:
///
/// ```
/// use minder_bridge::{RemoteOperation, operation::RemoteOperation as _};
///
/// #[derive(RemoteOperation)]
/// #[remote(method = "client_update", response = Option<String>)]
/// struct RenameClient {
///     client_id: i64,
///     client_name: String,
/// }
///
/// let op = RenameClient { client_id: 3, client_name: "ACME".into() };
/// assert_eq!(RenameClient::METHOD, "client_update");
/// assert_eq!(op.into_arguments().unwrap(), vec![serde_json::json!(3), serde_json::json!("ACME")]);
/// ```
pub trait RemoteOperation: Send {
    const METHOD: &'static str;
    type Response: DeserializeOwned + Send;

    /// the positional arguments, in declaration order
    fn into_arguments(self) -> Result<Vec<Value>, serde_json::Error>;
}

/// re-exports used by the code `#[derive(RemoteOperation)]` generates
pub mod proxies {
    pub use serde_json;
}
