//! `$ref` expansion: internal JSON pointers and external files.

use super::error::{ResolveError, ResolveResult};
use super::params::REF_KEY;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Loads external reference targets.
pub trait SourceLoader: Send + Sync {
    fn load(&self, path: &Path) -> ResolveResult<Value>;
}

/// Reads JSON files, or YAML files by their `.yaml`/`.yml` extension.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsLoader;

impl SourceLoader for FsLoader {
    fn load(&self, path: &Path) -> ResolveResult<Value> {
        let text = fs::read_to_string(path).map_err(|source| ResolveError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let parsed = if is_yaml(path) {
            serde_yaml::from_str::<Value>(&text).map_err(|e| e.to_string())
        } else {
            serde_json::from_str::<Value>(&text).map_err(|e| e.to_string())
        };
        parsed.map_err(|message| ResolveError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}

/// The document a reference is resolved against.
#[derive(Clone)]
struct Scope {
    document: Arc<Value>,
    file: Option<PathBuf>,
    base_dir: PathBuf,
}

impl Scope {
    fn label(&self) -> String {
        match &self.file {
            Some(file) => file.display().to_string(),
            None => "<root>".to_string(),
        }
    }
}

/// Expands every `$ref` in a document. One instance serves one resolve call;
/// loaded files are cached for its lifetime.
pub(crate) struct Dereferencer<'a> {
    loader: &'a dyn SourceLoader,
    base_dir: PathBuf,
    cache: HashMap<PathBuf, Arc<Value>>,
    /// `file#pointer` of every reference currently being expanded
    stack: Vec<String>,
}

impl<'a> Dereferencer<'a> {
    pub(crate) fn new(loader: &'a dyn SourceLoader, base_dir: PathBuf) -> Self {
        Self {
            loader,
            base_dir,
            cache: HashMap::new(),
            stack: Vec::new(),
        }
    }

    /// Expand `document`, resolving internal pointers against itself.
    pub(crate) fn expand_root(&mut self, document: Value) -> ResolveResult<Value> {
        let document = Arc::new(document);
        let scope = Scope {
            document: Arc::clone(&document),
            file: None,
            base_dir: self.base_dir.clone(),
        };
        self.expand(&document, &scope)
    }

    fn expand(&mut self, node: &Value, scope: &Scope) -> ResolveResult<Value> {
        match node {
            Value::Object(map) => {
                if let Some(Value::String(reference)) = map.get(REF_KEY) {
                    return self.follow(reference, scope);
                }
                let mut expanded = Map::new();
                for (key, child) in map {
                    expanded.insert(key.clone(), self.expand(child, scope)?);
                }
                Ok(Value::Object(expanded))
            }
            Value::Array(items) => items
                .iter()
                .map(|item| self.expand(item, scope))
                .collect::<ResolveResult<Vec<_>>>()
                .map(Value::Array),
            other => Ok(other.clone()),
        }
    }

    fn follow(&mut self, reference: &str, scope: &Scope) -> ResolveResult<Value> {
        let (target, pointer) = reference.split_once('#').unwrap_or((reference, ""));

        let target_scope = if target.is_empty() {
            scope.clone()
        } else {
            let path = self.locate(target, reference, scope)?;
            let document = self.load(&path)?;
            Scope {
                document,
                base_dir: path
                    .parent()
                    .map_or_else(|| scope.base_dir.clone(), Path::to_path_buf),
                file: Some(path),
            }
        };

        let key = format!("{}#{}", target_scope.label(), pointer);
        if self.stack.contains(&key) {
            debug!("Leaving circular reference '{}' unexpanded", reference);
            let mut marker = Map::new();
            marker.insert(REF_KEY.to_string(), Value::String(reference.to_string()));
            return Ok(Value::Object(marker));
        }

        let fragment = lookup_pointer(&target_scope.document, pointer)
            .ok_or_else(|| ResolveError::MissingPointer {
                reference: reference.to_string(),
            })?
            .clone();

        self.stack.push(key);
        let expanded = self.expand(&fragment, &target_scope);
        self.stack.pop();
        expanded
    }

    fn locate(&self, target: &str, reference: &str, scope: &Scope) -> ResolveResult<PathBuf> {
        let raw = if let Some(rest) = target.strip_prefix("file://") {
            urlencoding::decode(rest)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| rest.to_string())
        } else if target.contains("://") {
            return Err(ResolveError::UnsupportedScheme {
                reference: reference.to_string(),
            });
        } else {
            target.to_string()
        };

        let path = PathBuf::from(raw);
        if path.is_absolute() {
            Ok(path)
        } else {
            Ok(scope.base_dir.join(path))
        }
    }

    fn load(&mut self, path: &Path) -> ResolveResult<Arc<Value>> {
        if let Some(cached) = self.cache.get(path) {
            debug!("Using cached reference target {}", path.display());
            return Ok(Arc::clone(cached));
        }
        debug!("Loading reference target {}", path.display());
        let document = Arc::new(self.loader.load(path)?);
        self.cache.insert(path.to_path_buf(), Arc::clone(&document));
        Ok(document)
    }
}

/// Look up a JSON pointer fragment; `""` is the whole document.
fn lookup_pointer<'v>(document: &'v Value, pointer: &str) -> Option<&'v Value> {
    let decoded = urlencoding::decode(pointer)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| pointer.to_string());
    if decoded.is_empty() {
        return Some(document);
    }
    if decoded.starts_with('/') {
        document.pointer(&decoded)
    } else {
        document.pointer(&format!("/{decoded}"))
    }
}
