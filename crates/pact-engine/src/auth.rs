//! Authorization scheme handling shared by the matcher and the redactor.

/// Schemes whose leading word is treated as interchangeable.
const SCHEMES: [&str; 2] = ["Bearer", "Basic"];

/// Whether a field name is the `Authorization` header.
pub(crate) fn is_authorization(name: &str, ignore_case: bool) -> bool {
    if ignore_case {
        name.eq_ignore_ascii_case("authorization")
    } else {
        name == "Authorization" || name == "authorization"
    }
}

/// Split `"Bearer abc"` into `("Bearer", "abc")`, keeping the original
/// casing of the scheme word. Returns `None` when there is no known scheme
/// or the token is empty.
pub(crate) fn split_scheme(value: &str) -> Option<(&str, &str)> {
    let trimmed = value.trim_start();
    let (scheme, rest) = trimmed.split_once(char::is_whitespace)?;
    if !SCHEMES.iter().any(|known| known.eq_ignore_ascii_case(scheme)) {
        return None;
    }
    let token = rest.trim();
    if token.is_empty() {
        None
    } else {
        Some((scheme, token))
    }
}

/// The credential part of an authorization value, with any known scheme
/// word removed.
pub(crate) fn strip_scheme(value: &str) -> &str {
    split_scheme(value).map_or(value, |(_, token)| token)
}
