//! Resolving key paths into concrete locations.

use super::segment::{KeyPath, Segment};
use serde_json::{Map, Value};
use std::fmt;

/// One concrete step from a parent value to a child value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Step {
    /// Object key, in the casing found in the document
    Key(String),
    /// Array index
    Index(usize),
}

/// A concrete location inside a JSON tree, produced by [`resolve`].
///
/// Locations carry the actual key casing found in the document, so mutations
/// made through them never rename fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Location {
    steps: Vec<Step>,
}

impl Location {
    /// The location of the root value.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    /// Location of a child of this location.
    pub fn child(&self, step: Step) -> Self {
        let mut steps = self.steps.clone();
        steps.push(step);
        Self { steps }
    }

    /// The object key of the final step, if the final step is a key.
    pub fn last_key(&self) -> Option<&str> {
        match self.steps.last() {
            Some(Step::Key(key)) => Some(key),
            _ => None,
        }
    }

    pub fn get<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        let mut node = root;
        for step in &self.steps {
            node = match (node, step) {
                (Value::Object(map), Step::Key(key)) => map.get(key)?,
                (Value::Array(items), Step::Index(index)) => items.get(*index)?,
                _ => return None,
            };
        }
        Some(node)
    }

    pub fn get_mut<'a>(&self, root: &'a mut Value) -> Option<&'a mut Value> {
        walk_mut(root, &self.steps)
    }

    /// Replace the value at this location. An object key that does not exist
    /// yet is inserted; returns `false` if the parent cannot hold the value.
    pub fn set(&self, root: &mut Value, value: Value) -> bool {
        let Some((last, parent_steps)) = self.steps.split_last() else {
            *root = value;
            return true;
        };
        match (walk_mut(root, parent_steps), last) {
            (Some(Value::Object(map)), Step::Key(key)) => {
                map.insert(key.clone(), value);
                true
            }
            (Some(Value::Array(items)), Step::Index(index)) if *index < items.len() => {
                items[*index] = value;
                true
            }
            _ => false,
        }
    }

    /// Remove the value at this location from its parent.
    pub fn remove(&self, root: &mut Value) -> Option<Value> {
        let (last, parent_steps) = self.steps.split_last()?;
        match (walk_mut(root, parent_steps)?, last) {
            (Value::Object(map), Step::Key(key)) => map.remove(key),
            (Value::Array(items), Step::Index(index)) if *index < items.len() => {
                Some(items.remove(*index))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return f.write_str("<root>");
        }
        for (position, step) in self.steps.iter().enumerate() {
            match step {
                Step::Index(index) => write!(f, "[{index}]")?,
                Step::Key(key) if position == 0 => write!(f, "{key}")?,
                Step::Key(key) => write!(f, ".{key}")?,
            }
        }
        Ok(())
    }
}

fn walk_mut<'a>(root: &'a mut Value, steps: &[Step]) -> Option<&'a mut Value> {
    let mut node = root;
    for step in steps {
        node = match (node, step) {
            (Value::Object(map), Step::Key(key)) => map.get_mut(key)?,
            (Value::Array(items), Step::Index(index)) => items.get_mut(*index)?,
            _ => return None,
        };
    }
    Some(node)
}

/// Compare two key names, optionally ignoring ASCII case.
#[inline]
pub fn names_equal(a: &str, b: &str, ignore_case: bool) -> bool {
    if ignore_case {
        a.eq_ignore_ascii_case(b)
    } else {
        a == b
    }
}

/// Look up a key in an object, preferring an exact match over a
/// case-folded one when `ignore_case` is set.
pub fn lookup_key<'a>(
    map: &'a Map<String, Value>,
    name: &str,
    ignore_case: bool,
) -> Option<(&'a String, &'a Value)> {
    let mut folded = None;
    for (key, value) in map {
        if key == name {
            return Some((key, value));
        }
        if ignore_case && folded.is_none() && key.eq_ignore_ascii_case(name) {
            folded = Some((key, value));
        }
    }
    folded
}

/// Resolve a key path against `root`, returning every concrete location it
/// addresses. Unresolvable paths return an empty list.
pub fn resolve(root: &Value, path: &KeyPath, ignore_case: bool) -> Vec<Location> {
    let mut frontier = vec![Location::root()];

    for segment in path.segments() {
        let mut next = Vec::new();
        for location in &frontier {
            if let Some(node) = location.get(root) {
                expand(node, location, segment, ignore_case, &mut next);
            }
        }
        if next.is_empty() {
            return next;
        }
        frontier = next;
    }

    frontier
}

fn expand(
    node: &Value,
    location: &Location,
    segment: &Segment,
    ignore_case: bool,
    out: &mut Vec<Location>,
) {
    match (segment, node) {
        (Segment::Key(name), Value::Object(map)) => {
            if let Some((key, _)) = lookup_key(map, name, ignore_case) {
                out.push(location.child(Step::Key(key.clone())));
            }
        }
        (Segment::Key(_), Value::Array(items)) => {
            // Fan out over composite elements; primitives have no keys
            for (index, item) in items.iter().enumerate() {
                if item.is_object() || item.is_array() {
                    let element = location.child(Step::Index(index));
                    expand(item, &element, segment, ignore_case, out);
                }
            }
        }
        (Segment::Index(index), Value::Array(items)) => {
            if *index < items.len() {
                out.push(location.child(Step::Index(*index)));
            }
        }
        (Segment::Index(index), Value::Object(map)) => {
            if let Some((key, _)) = lookup_key(map, &index.to_string(), ignore_case) {
                out.push(location.child(Step::Key(key.clone())));
            }
        }
        (Segment::Descend(name), _) => descend(node, location, name, ignore_case, out),
        _ => {}
    }
}

fn descend(node: &Value, location: &Location, name: &str, ignore_case: bool, out: &mut Vec<Location>) {
    match node {
        Value::Object(map) => {
            for (key, child) in map {
                let child_location = location.child(Step::Key(key.clone()));
                if names_equal(key, name, ignore_case) {
                    out.push(child_location.clone());
                }
                descend(child, &child_location, name, ignore_case, out);
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                descend(item, &location.child(Step::Index(index)), name, ignore_case, out);
            }
        }
        _ => {}
    }
}
