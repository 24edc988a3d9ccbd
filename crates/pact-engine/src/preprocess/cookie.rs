//! Addressing single cookies inside `Cookie` and `Set-Cookie` headers.
//!
//! A path such as `request.headers.cookie.session` names the `session` cookie
//! inside the `cookie` header. The header value (a string or an array of
//! strings) is parsed, only the named cookie is edited, and the rest is
//! written back untouched.

use crate::path::{names_equal, resolve, KeyPath, Segment};
use serde_json::Value;

/// A cookie addressed through its header.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CookieTarget {
    pub header: KeyPath,
    pub cookie: String,
}

/// Recognize `<...>.cookie.<name>` and `<...>.set-cookie.<name>` paths.
pub(crate) fn cookie_target(path: &KeyPath) -> Option<CookieTarget> {
    let (header, leaf) = path.split_last()?;
    let Segment::Key(cookie) = leaf else {
        return None;
    };
    let (_, header_segment) = header.split_last()?;
    let Segment::Key(header_name) = header_segment else {
        return None;
    };
    if !is_cookie_header(header_name) {
        return None;
    }
    Some(CookieTarget {
        cookie: cookie.clone(),
        header,
    })
}

fn is_cookie_header(name: &str) -> bool {
    name.eq_ignore_ascii_case("cookie") || name.eq_ignore_ascii_case("set-cookie")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CookieHeader {
    /// `name=value; other=value`
    Cookie,
    /// `name=value; Path=/; HttpOnly`, one cookie per string
    SetCookie,
}

/// What to do with the named cookie.
#[derive(Debug, Clone, Copy)]
pub(crate) enum CookieEdit<'a> {
    Redact(&'a str),
    Remove,
}

enum Edited {
    Unchanged,
    Changed(String),
    Emptied,
}

/// Edit the named cookie in every header the target resolves to.
///
/// Returns `false` when no header holding a cookie jar was found, so the
/// caller can fall back to plain path handling.
pub(crate) fn apply(
    record: &mut Value,
    target: &CookieTarget,
    edit: CookieEdit<'_>,
    ignore_case: bool,
) -> bool {
    let mut handled = false;

    for location in resolve(record, &target.header, ignore_case).iter().rev() {
        let kind = match location.last_key() {
            Some(key) if key.eq_ignore_ascii_case("set-cookie") => CookieHeader::SetCookie,
            _ => CookieHeader::Cookie,
        };
        let Some(value) = location.get_mut(record) else {
            continue;
        };

        let emptied = match value {
            Value::String(header) => {
                handled = true;
                match edit_header(header, kind, &target.cookie, edit, ignore_case) {
                    Edited::Unchanged => false,
                    Edited::Changed(updated) => {
                        *header = updated;
                        false
                    }
                    Edited::Emptied => true,
                }
            }
            Value::Array(items) => {
                handled = true;
                let mut changed = false;
                let mut kept = Vec::with_capacity(items.len());
                for item in items.drain(..) {
                    let edited = match &item {
                        Value::String(header) => {
                            edit_header(header, kind, &target.cookie, edit, ignore_case)
                        }
                        _ => Edited::Unchanged,
                    };
                    match edited {
                        Edited::Unchanged => kept.push(item),
                        Edited::Changed(updated) => {
                            changed = true;
                            kept.push(Value::String(updated));
                        }
                        Edited::Emptied => changed = true,
                    }
                }
                *items = kept;
                changed && items.is_empty()
            }
            _ => false,
        };

        if emptied {
            location.remove(record);
        }
    }

    handled
}

fn edit_header(
    header: &str,
    kind: CookieHeader,
    cookie: &str,
    edit: CookieEdit<'_>,
    ignore_case: bool,
) -> Edited {
    match kind {
        CookieHeader::Cookie => edit_cookie_pairs(header, cookie, edit, ignore_case),
        CookieHeader::SetCookie => edit_set_cookie(header, cookie, edit, ignore_case),
    }
}

fn cookie_name(pair: &str) -> &str {
    pair.split_once('=').map_or(pair, |(name, _)| name).trim()
}

fn edit_cookie_pairs(header: &str, cookie: &str, edit: CookieEdit<'_>, ignore_case: bool) -> Edited {
    let mut changed = false;
    let mut pairs = Vec::new();

    for pair in header.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let name = cookie_name(pair);
        if !names_equal(name, cookie, ignore_case) {
            pairs.push(pair.to_string());
            continue;
        }
        changed = true;
        if let CookieEdit::Redact(mask) = edit {
            pairs.push(format!("{name}={mask}"));
        }
    }

    if !changed {
        Edited::Unchanged
    } else if pairs.is_empty() {
        Edited::Emptied
    } else {
        Edited::Changed(pairs.join("; "))
    }
}

fn edit_set_cookie(header: &str, cookie: &str, edit: CookieEdit<'_>, ignore_case: bool) -> Edited {
    let (first, attributes) = match header.find(';') {
        Some(split) => header.split_at(split),
        None => (header, ""),
    };
    let name = cookie_name(first);
    if !names_equal(name, cookie, ignore_case) {
        return Edited::Unchanged;
    }
    match edit {
        CookieEdit::Redact(mask) => Edited::Changed(format!("{name}={mask}{attributes}")),
        CookieEdit::Remove => Edited::Emptied,
    }
}
