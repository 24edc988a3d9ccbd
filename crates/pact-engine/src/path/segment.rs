//! Parsing of key-path strings.

use std::fmt;

/// One segment of a parsed key path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Object key (fans out when applied to an array)
    Key(String),
    /// Array index, or the decimal key when applied to an object
    Index(usize),
    /// Key matched at any depth beneath the current node (`..name`)
    Descend(String),
}

impl Segment {
    /// The key name this segment addresses, with indices rendered in decimal.
    pub fn name(&self) -> String {
        match self {
            Segment::Key(name) | Segment::Descend(name) => name.clone(),
            Segment::Index(index) => index.to_string(),
        }
    }

    fn from_name(name: &str, descend: bool) -> Self {
        if descend {
            Segment::Descend(name.to_string())
        } else if let Some(index) = parse_index(name) {
            Segment::Index(index)
        } else {
            Segment::Key(name.to_string())
        }
    }
}

/// A parsed key path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct KeyPath {
    segments: Vec<Segment>,
}

impl KeyPath {
    /// Parse a path string. Parsing never fails; empty segments are dropped.
    pub fn parse(path: &str) -> Self {
        let mut segments = Vec::new();
        let mut descend = false;

        for (position, part) in split_dots(path).into_iter().enumerate() {
            if part.is_empty() {
                // A single leading dot is tolerated, any other empty part
                // marks the next name as a recursive-descent leaf.
                if position > 0 {
                    descend = true;
                }
                continue;
            }

            let (name, brackets) = split_brackets(part);
            if !name.is_empty() {
                segments.push(Segment::from_name(name, descend));
            }
            descend = false;

            for inner in brackets {
                match unquote(&inner) {
                    Some(key) => segments.push(Segment::Key(key.to_string())),
                    None => segments.push(Segment::from_name(inner.trim(), false)),
                }
            }
        }

        Self { segments }
    }

    /// Build a path from already-parsed segments.
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Split off the final segment, returning the parent path and the leaf.
    pub fn split_last(&self) -> Option<(KeyPath, &Segment)> {
        let (last, parent) = self.segments.split_last()?;
        Some((KeyPath::from_segments(parent.to_vec()), last))
    }

    /// Concatenate two paths.
    pub fn join(&self, other: &KeyPath) -> KeyPath {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        KeyPath { segments }
    }
}

impl From<&str> for KeyPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Index(index) => write!(f, "[{index}]")?,
                Segment::Key(name) if position == 0 => write!(f, "{name}")?,
                Segment::Key(name) => write!(f, ".{name}")?,
                Segment::Descend(name) => write!(f, "..{name}")?,
            }
        }
        Ok(())
    }
}

/// Split on dots, but never inside a bracketed segment.
fn split_dots(path: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (offset, ch) in path.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            '.' if depth == 0 => {
                parts.push(&path[start..offset]);
                start = offset + 1;
            }
            _ => {}
        }
    }
    parts.push(&path[start..]);
    parts
}

/// Split `items[0][1]` into `("items", ["0", "1"])`.
fn split_brackets(part: &str) -> (&str, Vec<String>) {
    let Some(open) = part.find('[') else {
        return (part, Vec::new());
    };

    let name = &part[..open];
    let mut brackets = Vec::new();
    let mut rest = &part[open..];
    while let Some(stripped) = rest.strip_prefix('[') {
        match stripped.find(']') {
            Some(close) => {
                brackets.push(stripped[..close].to_string());
                rest = &stripped[close + 1..];
            }
            None => {
                // Unterminated bracket: keep the remainder as a literal key
                brackets.push(format!("\"{stripped}\""));
                break;
            }
        }
    }
    (name, brackets)
}

fn unquote(inner: &str) -> Option<&str> {
    let trimmed = inner.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| trimmed.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
}

fn parse_index(name: &str) -> Option<usize> {
    if !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()) {
        name.parse().ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> Segment {
        Segment::Key(name.to_string())
    }

    #[test]
    fn test_parse_dotted_keys() {
        let path = KeyPath::parse("response.body.name");
        assert_eq!(path.segments(), &[key("response"), key("body"), key("name")]);
    }

    #[test]
    fn test_parse_indices() {
        let bracketed = KeyPath::parse("items[0].id");
        assert_eq!(bracketed.segments(), &[key("items"), Segment::Index(0), key("id")]);

        let bare = KeyPath::parse("items.12.id");
        assert_eq!(bare.segments(), &[key("items"), Segment::Index(12), key("id")]);

        let nested = KeyPath::parse("matrix[1][2]");
        assert_eq!(
            nested.segments(),
            &[key("matrix"), Segment::Index(1), Segment::Index(2)]
        );
    }

    #[test]
    fn test_parse_recursive_descent() {
        let prefixed = KeyPath::parse("request.body..password");
        assert_eq!(
            prefixed.segments(),
            &[
                key("request"),
                key("body"),
                Segment::Descend("password".to_string())
            ]
        );

        let rooted = KeyPath::parse("..token");
        assert_eq!(rooted.segments(), &[Segment::Descend("token".to_string())]);
    }

    #[test]
    fn test_parse_quoted_bracket_key() {
        let path = KeyPath::parse(r#"headers["x.trace.id"]"#);
        assert_eq!(path.segments(), &[key("headers"), key("x.trace.id")]);
    }

    #[test]
    fn test_parse_empty_and_leading_dot() {
        assert!(KeyPath::parse("").is_empty());
        assert_eq!(KeyPath::parse(".status").segments(), &[key("status")]);
    }

    #[test]
    fn test_display_round_trip() {
        for raw in ["response.body.items[0].id", "body..password", "status"] {
            assert_eq!(KeyPath::parse(raw).to_string(), raw);
        }
    }

    #[test]
    fn test_split_last() {
        let path = KeyPath::parse("request.headers.cookie.session");
        let (parent, leaf) = path.split_last().unwrap();
        assert_eq!(parent.to_string(), "request.headers.cookie");
        assert_eq!(leaf, &key("session"));
        assert!(KeyPath::default().split_last().is_none());
    }
}
