use proc_macro2::{Spacing, TokenTree};
use quote::spanned::Spanned;

pub type ParseResult<T> = Result<T, venial::Error>;

pub fn error_fn<T>(msg: impl AsRef<str>, tokens: T) -> venial::Error
where
    T: Spanned,
{
    venial::Error::new_at_span(tokens.__span(), msg.as_ref())
}

pub fn bail_fn<R, T>(msg: impl AsRef<str>, tokens: T) -> ParseResult<R>
where
    T: Spanned,
{
    Err(error_fn(msg, tokens))
}

macro_rules! bail {
    ($tokens:expr, $format_string:literal $($rest:tt)*) => {
        $crate::util::bail_fn(format!($format_string $($rest)*), $tokens)
    }
}

pub(crate) use bail;

/// `ClientCreate` -> `client_create`, `HTTPStatus` -> `http_status`
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
            {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }

    out
}

/// splits attribute arguments at top level commas; commas between `<` and `>` belong to a type
pub fn split_arguments(tokens: &[TokenTree]) -> Vec<Vec<TokenTree>> {
    let mut entries = Vec::new();
    let mut current = Vec::new();
    let mut depth: usize = 0;
    let mut after_joint_dash = false;

    for token in tokens {
        let mut joint_dash = false;
        if let TokenTree::Punct(punct) = token {
            match punct.as_char() {
                ',' if depth == 0 => {
                    if !current.is_empty() {
                        entries.push(std::mem::take(&mut current));
                    }
                    continue;
                }
                '<' => depth += 1,
                // `->` in a fn type is not a closing bracket
                '>' if !after_joint_dash => depth = depth.saturating_sub(1),
                '-' => joint_dash = punct.spacing() == Spacing::Joint,
                _ => {}
            }
        }
        after_joint_dash = joint_dash;
        current.push(token.clone());
    }

    if !current.is_empty() {
        entries.push(current);
    }
    entries
}

/// the contents of a plain `"..."` literal
pub fn string_literal(tokens: &[TokenTree]) -> Option<String> {
    let [TokenTree::Literal(literal)] = tokens else {
        return None;
    };
    let text = literal.to_string();
    text.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .map(str::to_string)
}
