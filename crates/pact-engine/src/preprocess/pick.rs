//! The pick stage: keep only what an allow-list reaches.

use super::options::PickSpec;
use crate::path::{names_equal, KeyPath, Segment};
use serde_json::Value;

/// Allow-list compiled into a tree of key names.
#[derive(Debug, Default)]
struct AllowNode {
    /// Everything beneath this node is kept
    terminal: bool,
    children: Vec<(String, AllowNode)>,
}

impl AllowNode {
    fn child_mut(&mut self, name: &str, ignore_case: bool) -> &mut AllowNode {
        let position = self
            .children
            .iter()
            .position(|(existing, _)| names_equal(existing, name, ignore_case));
        let index = match position {
            Some(index) => index,
            None => {
                self.children.push((name.to_string(), AllowNode::default()));
                self.children.len() - 1
            }
        };
        &mut self.children[index].1
    }

    fn child(&self, name: &str, ignore_case: bool) -> Option<&AllowNode> {
        self.children
            .iter()
            .find(|(existing, _)| names_equal(existing, name, ignore_case))
            .map(|(_, node)| node)
    }

    fn insert(&mut self, path: &KeyPath, ignore_case: bool) {
        let mut node = self;
        for segment in path.segments() {
            node = node.child_mut(&segment_name(segment), ignore_case);
        }
        node.terminal = true;
    }
}

fn segment_name(segment: &Segment) -> String {
    // Indices are treated as decimal keys, so arrays keep fanning out
    segment.name()
}

fn build(spec: &PickSpec, ignore_case: bool) -> AllowNode {
    let mut root = AllowNode::default();
    match spec {
        PickSpec::Keys(keys) => {
            for key in keys {
                root.insert(&KeyPath::parse(key), ignore_case);
            }
        }
        PickSpec::Paths(paths) => {
            for (parent, keys) in paths {
                let parent = KeyPath::parse(parent);
                for key in keys {
                    root.insert(&parent.join(&KeyPath::parse(key)), ignore_case);
                }
            }
        }
    }
    root
}

/// Discard every value not reached by the allow-list. An empty allow-list
/// leaves the value untouched.
pub(crate) fn apply(value: &mut Value, spec: &PickSpec, ignore_case: bool) {
    let root = build(spec, ignore_case);
    if root.children.is_empty() {
        return;
    }
    prune(value, &root, ignore_case);
}

fn prune(value: &mut Value, node: &AllowNode, ignore_case: bool) {
    if node.terminal {
        return;
    }
    match value {
        Value::Object(map) => {
            map.retain(|key, _| node.child(key, ignore_case).is_some());
            for (key, child_value) in map.iter_mut() {
                if let Some(child) = node.child(key, ignore_case) {
                    prune(child_value, child, ignore_case);
                }
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut().filter(|item| item.is_object() || item.is_array()) {
                prune(item, node, ignore_case);
            }
        }
        _ => {}
    }
}
