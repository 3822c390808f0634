//! Partial templates: named, parameterized subtrees instantiated by `$partial`.
//!
//! Argument substitution replaces whole values only. A prop, binding path or
//! loop source that is exactly `$name` takes the caller's `name` argument (or
//! the param's declared default); strings that merely contain `$name` are
//! left alone.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::error::SchemaError;
use crate::nodes::Node;
use crate::parse::parse_child;
use crate::resolve::slugify;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialParam {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialDef {
    pub name: String,
    #[serde(default)]
    pub params: Vec<PartialParam>,
    pub template: Node,
}

#[derive(Deserialize)]
struct RawPartial {
    name: String,
    #[serde(default)]
    params: Vec<PartialParam>,
    #[serde(default)]
    template: Option<Value>,
}

impl PartialDef {
    /// Build from a partial document: `{ name, params?, template }`. The
    /// template goes through the regular child parser, shorthands included.
    pub fn from_document(raw: &Value, file: &str) -> Result<Self, SchemaError> {
        let doc: RawPartial =
            serde_json::from_value(raw.clone()).map_err(|source| SchemaError::Invalid {
                document: "partial",
                source,
            })?;
        let template = match doc.template {
            Some(t @ Value::Object(_)) => parse_child(&t, file),
            _ => return Err(SchemaError::MissingTemplate { name: doc.name }),
        };
        Ok(PartialDef {
            name: doc.name,
            params: doc.params,
            template,
        })
    }

    /// Deep-clone the template with `args` substituted.
    pub fn instantiate(&self, args: &Map<String, Value>) -> Node {
        let mut node = self.template.clone();
        substitute(&mut node, &|name: &str| self.argument(args, name));
        node
    }

    fn argument<'a>(&'a self, args: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
        args.get(name).or_else(|| {
            self.params
                .iter()
                .find(|p| p.name == name)
                .and_then(|p| p.default.as_ref())
        })
    }
}

/// Everything after a leading `$` names the argument, dots and digits included.
fn placeholder(value: &str) -> Option<&str> {
    value.strip_prefix('$').filter(|name| !name.is_empty())
}

fn substitute_value<'a>(value: &mut Value, lookup: &dyn Fn(&str) -> Option<&'a Value>) {
    let replacement = match value {
        Value::String(s) => placeholder(s).and_then(lookup),
        _ => None,
    };
    if let Some(replacement) = replacement {
        *value = replacement.clone();
    }
}

fn substitute_path<'a>(path: &mut String, lookup: &dyn Fn(&str) -> Option<&'a Value>) {
    match placeholder(path).and_then(lookup) {
        Some(Value::String(s)) => *path = s.clone(),
        Some(other) => {
            tracing::warn!(
                path = %path,
                value = %other,
                "partial argument for a binding path is not a string"
            );
        }
        None => {}
    }
}

fn substitute<'a>(node: &mut Node, lookup: &dyn Fn(&str) -> Option<&'a Value>) {
    match node {
        Node::Widget(w) => {
            for value in w.props.values_mut() {
                substitute_value(value, lookup);
            }
            if let Some(source) = &mut w.source {
                substitute_path(&mut source.path, lookup);
            }
        }
        Node::Partial(p) => {
            for value in p.args.values_mut() {
                substitute_value(value, lookup);
            }
        }
        Node::Section(s) => {
            for child in &mut s.children {
                substitute(child, lookup);
            }
        }
        Node::Conditional(c) => {
            for child in c.then.iter_mut().chain(c.otherwise.iter_mut().flatten()) {
                substitute(child, lookup);
            }
        }
        Node::Loop(l) => {
            substitute_path(&mut l.source, lookup);
            substitute(&mut l.template, lookup);
        }
        Node::Fragment(f) => {
            for child in &mut f.children {
                substitute(child, lookup);
            }
        }
        Node::Ref(_) | Node::Slot(_) => {}
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PARTIAL SET
// ═══════════════════════════════════════════════════════════════════════════════

/// Partials by name. Camel-cased names are also reachable by their kebab form.
#[derive(Debug, Clone, Default)]
pub struct PartialSet {
    partials: HashMap<String, PartialDef>,
}

impl PartialSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, partial: PartialDef) {
        let kebab = slugify(&partial.name);
        if kebab != partial.name {
            self.partials.insert(kebab, partial.clone());
        }
        self.partials.insert(partial.name.clone(), partial);
    }

    pub fn get(&self, name: &str) -> Option<&PartialDef> {
        self.partials.get(name)
    }

    pub fn len(&self) -> usize {
        self.partials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partials.is_empty()
    }

    /// Load partial documents; bad documents are reported and skipped.
    pub fn load_documents(&mut self, documents: &[Value], file: &str) -> Vec<SchemaError> {
        let mut errors = Vec::new();
        for document in documents {
            match PartialDef::from_document(document, file) {
                Ok(def) => self.insert(def),
                Err(e) => errors.push(e),
            }
        }
        errors
    }
}

impl FromIterator<PartialDef> for PartialSet {
    fn from_iter<I: IntoIterator<Item = PartialDef>>(iter: I) -> Self {
        let mut set = PartialSet::new();
        for def in iter {
            set.insert(def);
        }
        set
    }
}
