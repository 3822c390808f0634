//! Widget Registry
//!
//! Catalog of widget schemas consulted by the parser, resolver and validator.
//! Built-ins are registered at construction; external schema documents can be
//! bulk-loaded afterwards.
//!
//! `extends` is merged eagerly in [`WidgetRegistry::register`]: a schema whose
//! parent is not registered yet is stored as given and never revisited, so
//! schemas must be registered after the schemas they extend.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap};

use crate::error::SchemaError;

// ═══════════════════════════════════════════════════════════════════════════════
// SCHEMA TYPES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetProp {
    /// string, number, boolean, enum, binding, icon, object, string[], object[]
    #[serde(rename = "type")]
    pub prop_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Allowed values for `enum` props.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl WidgetProp {
    pub fn new(prop_type: &str) -> Self {
        Self {
            prop_type: prop_type.to_string(),
            required: false,
            default: None,
            values: None,
            description: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn with_values(mut self, values: &[&str]) -> Self {
        self.values = Some(values.iter().map(|v| v.to_string()).collect());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSlot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub optional: bool,
}

/// Category reported for schemas that neither declare nor inherit one.
pub const DEFAULT_CATEGORY: &str = "custom";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSchema {
    pub name: String,
    /// Omitted categories are inherited through `extends`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(default)]
    pub props: BTreeMap<String, WidgetProp>,
    #[serde(default)]
    pub slots: BTreeMap<String, WidgetSlot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessibility: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsive: Option<Map<String, Value>>,
    /// Custom template path for generators.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

impl WidgetSchema {
    pub fn new(name: &str, category: &str) -> Self {
        Self {
            name: name.to_string(),
            category: Some(category.to_string()),
            description: None,
            extends: None,
            props: BTreeMap::new(),
            slots: BTreeMap::new(),
            accessibility: None,
            responsive: None,
            template: None,
        }
    }

    pub fn prop(mut self, name: &str, prop: WidgetProp) -> Self {
        self.props.insert(name.to_string(), prop);
        self
    }

    pub fn slot(mut self, name: &str, description: &str) -> Self {
        self.slots.insert(
            name.to_string(),
            WidgetSlot {
                description: Some(description.to_string()),
                optional: false,
            },
        );
        self
    }

    pub fn category(&self) -> &str {
        self.category.as_deref().unwrap_or(DEFAULT_CATEGORY)
    }

    pub fn required_props(&self) -> impl Iterator<Item = &str> {
        self.props
            .iter()
            .filter(|(_, p)| p.required)
            .map(|(name, _)| name.as_str())
    }

    /// Child fields win; props and slots are merged key by key.
    fn inherit_from(self, parent: &WidgetSchema) -> WidgetSchema {
        let mut props = parent.props.clone();
        props.extend(self.props);
        let mut slots = parent.slots.clone();
        slots.extend(self.slots);

        WidgetSchema {
            name: self.name,
            category: self.category.or_else(|| parent.category.clone()),
            description: self.description.or_else(|| parent.description.clone()),
            extends: self.extends,
            props,
            slots,
            accessibility: self.accessibility.or_else(|| parent.accessibility.clone()),
            responsive: self.responsive.or_else(|| parent.responsive.clone()),
            template: self.template.or_else(|| parent.template.clone()),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BUILT-IN CATALOG
// ═══════════════════════════════════════════════════════════════════════════════

fn binding() -> WidgetProp {
    WidgetProp::new("binding")
}

fn typed(t: &str) -> WidgetProp {
    WidgetProp::new(t)
}

lazy_static! {
    static ref BUILT_IN_WIDGETS: Vec<WidgetSchema> = vec![
        // Display
        WidgetSchema::new("stat-card", "display")
            .prop("source", binding().required())
            .prop("label", typed("string").required())
            .prop(
                "format",
                typed("enum")
                    .with_values(&["number", "currency", "percent", "duration", "bytes"])
                    .with_default(json!("number")),
            )
            .prop("icon", typed("icon")),
        WidgetSchema::new("badge", "display")
            .prop("source", binding().required())
            .prop(
                "variant",
                typed("enum")
                    .with_values(&["solid", "outline", "subtle"])
                    .with_default(json!("solid")),
            )
            .prop("color", typed("string")),
        WidgetSchema::new("avatar", "display")
            .prop("source", binding().required())
            .prop("alt", typed("string").required())
            .prop(
                "size",
                typed("enum").with_values(&["sm", "md", "lg", "xl"]).with_default(json!("md")),
            )
            .prop(
                "fallback",
                typed("enum").with_values(&["initials", "icon"]).with_default(json!("initials")),
            ),
        WidgetSchema::new("progress", "display")
            .prop("source", binding().required())
            .prop("max", typed("number").with_default(json!(100)))
            .prop("label", typed("string"))
            .prop("color", typed("string")),
        WidgetSchema::new("preview", "display"),
        // Typography
        WidgetSchema::new("heading", "typography")
            .prop("source", binding())
            .prop("text", typed("string"))
            .prop(
                "tag",
                typed("enum")
                    .with_values(&["h1", "h2", "h3", "h4", "h5", "h6"])
                    .with_default(json!("h2")),
            ),
        WidgetSchema::new("paragraph", "typography")
            .prop("source", binding())
            .prop("content", typed("string"))
            .prop("maxLines", typed("number"))
            .prop("expandable", typed("boolean").with_default(json!(false))),
        WidgetSchema::new("markdown", "typography").prop("source", binding().required()),
        // Data
        WidgetSchema::new("data-table", "data")
            .prop("source", binding().required())
            .prop("columns", typed("string[]").required())
            .prop("actions", typed("string[]"))
            .prop("sortable", typed("boolean").with_default(json!(true)))
            .prop("filterable", typed("boolean").with_default(json!(false)))
            .prop("paginate", typed("boolean").with_default(json!(true))),
        WidgetSchema::new("chart", "data")
            .prop("source", binding().required())
            .prop("chart", typed("object").required())
            .prop("animate", typed("boolean").with_default(json!(true))),
        WidgetSchema::new("bar-chart", "data")
            .prop("bars", typed("object[]").required())
            .prop("animate", typed("boolean").with_default(json!(true))),
        // Input
        WidgetSchema::new("form", "input")
            .prop("fields", typed("object[]").required())
            .prop("submit", typed("string")),
        WidgetSchema::new("search-bar", "input")
            .prop("placeholder", typed("string").with_default(json!("Search...")))
            .prop("source", binding()),
        // Interactive
        WidgetSchema::new("chat-messages", "interactive")
            .prop("source", binding().required())
            .prop("features", typed("object")),
        WidgetSchema::new("chat-input", "interactive"),
        // Layout
        WidgetSchema::new("hero", "layout")
            .prop("heading", typed("object").required())
            .prop("subheading", typed("object")),
        WidgetSchema::new("feature-grid", "layout")
            .prop("features", typed("object[]").required())
            .prop("heading", typed("object")),
        WidgetSchema::new("team-grid", "layout")
            .prop("members", typed("object[]").required())
            .prop("heading", typed("object")),
        WidgetSchema::new("tabs", "layout")
            .prop("items", typed("object[]").required())
            .prop("default", typed("string"))
            .slot("content", "Tab content"),
        // Navigation
        WidgetSchema::new("action-group", "navigation")
            .prop("actions", typed("object[]").required()),
        WidgetSchema::new("cta", "navigation")
            .prop("heading", typed("object").required())
            .prop("actions", typed("object[]").required()),
        WidgetSchema::new("breadcrumb", "navigation")
            .prop("items", typed("string[]").required()),
        WidgetSchema::new("sidebar-nav", "navigation")
            .prop("items", typed("string[]").required())
            .prop("active", typed("string")),
        // Media
        WidgetSchema::new("image", "media")
            .prop("source", binding().required())
            .prop("alt", typed("string").required())
            .prop(
                "loading",
                typed("enum").with_values(&["lazy", "eager"]).with_default(json!("lazy")),
            ),
        // Feedback
        WidgetSchema::new("empty-state", "feedback")
            .prop("icon", typed("icon"))
            .prop("message", typed("string").required())
            .prop("action", typed("object")),
        WidgetSchema::new("skeleton", "feedback")
            .prop("lines", typed("number").with_default(json!(3)))
            .prop(
                "type",
                typed("enum").with_values(&["text", "card", "table"]).with_default(json!("text")),
            ),
        // Composite
        WidgetSchema::new("stat-cards", "composite")
            .prop("layout", typed("object"))
            .slot("default", "Stat card children"),
        WidgetSchema::new("card-grid", "composite")
            .prop("layout", typed("object"))
            .slot("default", "Card children"),
    ];
}

// ═══════════════════════════════════════════════════════════════════════════════
// REGISTRY
// ═══════════════════════════════════════════════════════════════════════════════

/// Insertion-ordered widget catalog. Read-only after loading, so it can be
/// shared across the rayon pool.
#[derive(Debug, Clone)]
pub struct WidgetRegistry {
    widgets: Vec<WidgetSchema>,
    index: HashMap<String, usize>,
}

impl Default for WidgetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetRegistry {
    /// Registry pre-seeded with the built-in catalog.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for widget in BUILT_IN_WIDGETS.iter() {
            registry.register(widget.clone());
        }
        registry
    }

    pub fn empty() -> Self {
        Self {
            widgets: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&WidgetSchema> {
        self.index.get(name).map(|&i| &self.widgets[i])
    }

    pub fn register(&mut self, schema: WidgetSchema) {
        let schema = match schema.extends.clone() {
            Some(parent_name) => match self.get(&parent_name).cloned() {
                Some(parent) => schema.inherit_from(&parent),
                None => {
                    tracing::warn!(
                        widget = %schema.name,
                        parent = %parent_name,
                        "widget extends an unregistered parent; registering without inheritance"
                    );
                    schema
                }
            },
            None => schema,
        };

        match self.index.get(&schema.name) {
            Some(&i) => self.widgets[i] = schema,
            None => {
                self.index.insert(schema.name.clone(), self.widgets.len());
                self.widgets.push(schema);
            }
        }
    }

    /// Deserialize and register one external schema document.
    pub fn load_document(&mut self, document: &Value) -> Result<(), SchemaError> {
        let schema: WidgetSchema =
            serde_json::from_value(document.clone()).map_err(|source| SchemaError::Invalid {
                document: "widget",
                source,
            })?;
        self.register(schema);
        Ok(())
    }

    /// Load documents in order; a bad document is reported and skipped.
    pub fn load_documents(&mut self, documents: &[Value]) -> Vec<SchemaError> {
        let mut errors = Vec::new();
        for document in documents {
            if let Err(e) = self.load_document(document) {
                errors.push(e);
            }
        }
        errors
    }

    pub fn all(&self) -> &[WidgetSchema] {
        &self.widgets
    }

    pub fn names(&self) -> Vec<&str> {
        self.widgets.iter().map(|w| w.name.as_str()).collect()
    }
}
