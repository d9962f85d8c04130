mod derive_remote_operation;
mod util;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;

use derive_remote_operation::derive_remote_operation_impl;

/// Derives `minder_bridge::operation::RemoteOperation`.
///
/// ```ignore
/// #[derive(RemoteOperation)]
/// #[remote(method = "project_create", response = Project)]
/// pub struct ProjectCreate {
///     pub client_id: RecordId,
///     pub name: String,
/// }
/// ```
///
/// `method` defaults to the struct name in snake_case, `response` to `()`.
#[proc_macro_derive(RemoteOperation, attributes(remote))]
pub fn derive_remote_operation(input: TokenStream) -> TokenStream {
    let result = derive_remote_operation_impl(TokenStream2::from(input));
    match result {
        Ok(ts) => TokenStream::from(ts),
        Err(e) => TokenStream::from(e.to_compile_error()),
    }
}
