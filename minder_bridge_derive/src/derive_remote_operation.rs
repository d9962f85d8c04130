use crate::util::{bail, error_fn, split_arguments, string_literal, to_snake_case};

use proc_macro2::{Literal, TokenStream, TokenTree};
use quote::quote;

// Usage
// -----------------------------------------------------------------------------------------------------------------------------------

// Applied to a struct, derives minder_bridge::operation::RemoteOperation.
// Fields become the positional arguments of the backend call, in declaration order.

// -----------------------------------------------------------------------------------------------------------------------------------
// <begin of example>

#[cfg(false)]
#[remote(method = "task_update", response = ())]
pub struct TaskUpdate {
    pub task_id: i64,
    pub name: Option<String>,
}

#[cfg(false)]
impl ::minder_bridge::operation::RemoteOperation for TaskUpdate {
    const METHOD: &'static str = "task_update";
    type Response = ();

    fn into_arguments(
        self,
    ) -> ::core::result::Result<
        ::std::vec::Vec<::minder_bridge::operation::proxies::serde_json::Value>,
        ::minder_bridge::operation::proxies::serde_json::Error,
    > {
        ::core::result::Result::Ok(::std::vec![
            ::minder_bridge::operation::proxies::serde_json::to_value(self.task_id)?,
            ::minder_bridge::operation::proxies::serde_json::to_value(self.name)?,
        ])
    }
}

// <end of example>
// -----------------------------------------------------------------------------------------------------------------------------------

#[derive(Default)]
struct RemoteAttributes {
    method: Option<String>,
    response: Option<TokenStream>,
}

fn parse_remote_attributes(
    attributes: &[venial::Attribute],
) -> Result<RemoteAttributes, venial::Error> {
    let mut parsed = RemoteAttributes::default();

    for attr in attributes {
        let is_remote = matches!(
            attr.get_single_path_segment()
                .map(|s| s.to_string())
                .as_deref(),
            Some("remote")
        );
        if !is_remote {
            continue;
        }

        for entry in split_arguments(attr.get_value_tokens()) {
            let (key, value) = match entry.as_slice() {
                [TokenTree::Ident(key), TokenTree::Punct(eq), value @ ..]
                    if eq.as_char() == '=' && !value.is_empty() =>
                {
                    (key.to_string(), value)
                }
                _ => {
                    return bail!(
                        attr,
                        "Expected `method = \"...\"` or `response = Type` in #[remote(...)]."
                    );
                }
            };

            match key.as_str() {
                "method" => {
                    if parsed.method.is_some() {
                        return bail!(attr, "`method` is given more than once.");
                    }
                    let method = string_literal(value)
                        .ok_or_else(|| error_fn("`method` must be a string literal.", attr))?;
                    if method.is_empty() {
                        return bail!(attr, "`method` must not be empty.");
                    }
                    parsed.method = Some(method);
                }
                "response" => {
                    if parsed.response.is_some() {
                        return bail!(attr, "`response` is given more than once.");
                    }
                    parsed.response = Some(value.iter().cloned().collect());
                }
                other => {
                    return bail!(attr, "Unknown #[remote] option `{other}`.");
                }
            }
        }
    }

    Ok(parsed)
}

fn derive_struct(input: venial::Struct) -> Result<TokenStream, venial::Error> {
    let struct_name = &input.name;

    if input.generic_params.is_some() {
        return bail!(
            &input,
            "RemoteOperation cannot be derived for generic structs, {struct_name} has type parameters."
        );
    }

    let attributes = parse_remote_attributes(&input.attributes)?;
    let method = attributes
        .method
        .unwrap_or_else(|| to_snake_case(&struct_name.to_string()));
    let response = attributes.response.unwrap_or_else(|| quote! { () });

    let arguments: Vec<TokenStream> = match &input.fields {
        venial::Fields::Named(named_fields) => named_fields
            .fields
            .iter()
            .map(|(field, _)| {
                let field_name = &field.name;
                quote! { self.#field_name }
            })
            .collect(),
        venial::Fields::Tuple(tuple_fields) => tuple_fields
            .fields
            .iter()
            .enumerate()
            .map(|(i, _)| {
                let index = Literal::usize_unsuffixed(i);
                quote! { self.#index }
            })
            .collect(),
        venial::Fields::Unit => Vec::new(),
    };

    let q = quote! {
        impl ::minder_bridge::operation::RemoteOperation for #struct_name {
            const METHOD: &'static str = #method;
            type Response = #response;

            fn into_arguments(
                self,
            ) -> ::core::result::Result<
                ::std::vec::Vec<::minder_bridge::operation::proxies::serde_json::Value>,
                ::minder_bridge::operation::proxies::serde_json::Error,
            > {
                ::core::result::Result::Ok(::std::vec![
                    #(::minder_bridge::operation::proxies::serde_json::to_value(#arguments)?),*
                ])
            }
        }
    };

    Ok(q)
}

pub fn derive_remote_operation_impl(input: TokenStream) -> Result<TokenStream, venial::Error> {
    let input_decl = venial::parse_item(input)?;

    match input_decl {
        venial::Item::Struct(struct_decl) => derive_struct(struct_decl),
        _ => bail!(
            input_decl,
            "RemoteOperation can only be derived for structs, one struct per backend method."
        ),
    }
}

// -----------------------------------------------------------------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(input: &str) -> Result<String, venial::Error> {
        let tokens: TokenStream = input.parse().unwrap();
        derive_remote_operation_impl(tokens).map(|ts| ts.to_string().replace(' ', ""))
    }

    #[test]
    fn method_defaults_to_snake_case_name() {
        let out = expand("struct ProjectsListByClientId { client_id: i64 }").unwrap();
        assert!(out.contains("\"projects_list_by_client_id\""));
        assert!(out.contains("typeResponse=();"));
        assert!(out.contains("to_value(self.client_id)?"));
    }

    #[test]
    fn explicit_method_and_generic_response() {
        let out = expand(
            "#[remote(method = \"tasks_lists_by_project_id\", response = Vec<Option<Task>>)] struct Tasks(i64);",
        )
        .unwrap();
        assert!(out.contains("\"tasks_lists_by_project_id\""));
        assert!(out.contains("typeResponse=Vec<Option<Task>>;"));
        assert!(out.contains("to_value(self.0)?"));
    }

    #[test]
    fn rejects_enums_generics_and_unknown_options() {
        assert!(expand("enum Op { A, B }").is_err());
        assert!(expand("struct Op<T> { value: T }").is_err());
        assert!(expand("#[remote(name = \"x\")] struct Op;").is_err());
        assert!(expand("#[remote(method = x)] struct Op;").is_err());
    }
}
