//! Parse Module
//!
//! Turns a raw view document (generic map/list/scalar tree) into a typed
//! [`PageNode`]. Shorthands are expanded before shape detection, and any
//! section or widget carrying `show`/`hide` comes out wrapped in a
//! [`ConditionalNode`].

use serde_json::{json, Map, Value};

use crate::error::ParseError;
use crate::nodes::{
    AccessibilityConfig, ConditionalNode, DataBinding, FragmentNode, LayoutConfig, LoaderConfig,
    LoopNode, Meta, Node, PageNode, PartialNode, RefNode, ResponsiveConfig, SectionNode,
    SlotNode, SourceLocation, WidgetNode,
};

// ═══════════════════════════════════════════════════════════════════════════════
// SHORTHAND TABLES
// ═══════════════════════════════════════════════════════════════════════════════

const HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

const CHART_SHORTHANDS: [(&str, &str); 4] = [
    ("line-chart", "line"),
    ("area-chart", "area"),
    ("bar-chart", "bar"),
    ("donut-chart", "donut"),
];

/// Keys consumed while building a widget; everything else becomes a prop.
const WIDGET_STRUCTURAL_KEYS: [&str; 6] = ["type", "source", "name", "show", "hide", "layout"];

/// Rewrites at most one shorthand into its canonical widget shape.
/// First match wins: heading key, then chart key, then data-table inference.
fn expand_shorthand(node: &Map<String, Value>) -> Map<String, Value> {
    if node.contains_key("type") {
        return node.clone();
    }

    if let Some((tag, text)) = node
        .iter()
        .find(|(k, v)| HEADING_TAGS.contains(&k.as_str()) && !v.is_null())
    {
        let mut out = Map::new();
        out.insert("type".to_string(), json!("heading"));
        out.insert("tag".to_string(), json!(tag));
        out.insert("text".to_string(), text.clone());
        extend_except(&mut out, node, &[tag.as_str()]);
        return out;
    }

    for (key, chart_type) in CHART_SHORTHANDS {
        if let Some(Value::String(source)) = node.get(key) {
            let mut chart = Map::new();
            chart.insert("type".to_string(), json!(chart_type));
            if let Some(x) = node.get("x") {
                chart.insert("xAxis".to_string(), x.clone());
            }
            if let Some(y) = node.get("y") {
                chart.insert("yAxis".to_string(), y.clone());
            }

            let mut out = Map::new();
            out.insert("type".to_string(), json!("chart"));
            out.insert("source".to_string(), json!(source));
            out.insert("chart".to_string(), Value::Object(chart));
            extend_except(&mut out, node, &[key, "x", "y", "source"]);
            return out;
        }
    }

    if node.get("columns").is_some_and(Value::is_array) && node.contains_key("source") {
        let mut out = Map::new();
        out.insert("type".to_string(), json!("data-table"));
        extend_except(&mut out, node, &[]);
        return out;
    }

    node.clone()
}

fn extend_except(out: &mut Map<String, Value>, from: &Map<String, Value>, skip: &[&str]) {
    for (k, v) in from {
        if !skip.contains(&k.as_str()) && !out.contains_key(k) {
            out.insert(k.clone(), v.clone());
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// FIELD HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

fn non_empty_str<'a>(node: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    node.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn opt_string(node: &Map<String, Value>, key: &str) -> Option<String> {
    node.get(key).and_then(Value::as_str).map(str::to_string)
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(_) => true,
    }
}

fn condition_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Wraps only when `show` or `hide` is truthy. A present `show` is the
/// condition even when falsy; otherwise `hide: x` becomes `!x`.
fn visibility_condition(node: &Map<String, Value>) -> Option<String> {
    let show = node.get("show").filter(|v| !v.is_null());
    let hide = node.get("hide");
    if !is_truthy(show) && !is_truthy(hide) {
        return None;
    }
    match (show, hide) {
        (Some(show), _) => Some(condition_text(show)),
        (None, Some(hide)) => Some(format!("!{}", condition_text(hide))),
        (None, None) => None,
    }
}

fn parse_layout(raw: Option<&Value>) -> Option<LayoutConfig> {
    let obj = raw?.as_object()?;
    Some(LayoutConfig {
        sm: opt_string(obj, "sm"),
        md: opt_string(obj, "md"),
        lg: opt_string(obj, "lg"),
        xl: opt_string(obj, "xl"),
    })
}

fn wrap_conditional(node: Node, condition: Option<String>, file: &str) -> Node {
    match condition {
        Some(condition) => Node::Conditional(ConditionalNode {
            condition,
            then: vec![node],
            otherwise: None,
            loc: SourceLocation::file(file),
            meta: Meta::new(),
        }),
        None => node,
    }
}

fn unknown_widget(file: &str) -> Node {
    Node::Widget(WidgetNode::new("unknown", SourceLocation::file(file)))
}

// ═══════════════════════════════════════════════════════════════════════════════
// CHILD NODES
// ═══════════════════════════════════════════════════════════════════════════════

pub fn parse_children(items: &[Value], file: &str) -> Vec<Node> {
    items.iter().map(|item| parse_child(item, file)).collect()
}

/// Parse one entry of a `sections`/`widgets` list.
pub fn parse_child(raw: &Value, file: &str) -> Node {
    let Some(raw) = raw.as_object() else {
        return unknown_widget(file);
    };
    let node = expand_shorthand(raw);
    let loc = SourceLocation::file(file);

    if let Some(target) = non_empty_str(&node, "$ref") {
        let (page, section) = target.split_once('#').unwrap_or((target, ""));
        return Node::Ref(RefNode {
            target: target.to_string(),
            page: page.to_string(),
            section: section.to_string(),
            loc,
            meta: Meta::new(),
        });
    }

    if let Some(name) = non_empty_str(&node, "$partial") {
        let mut args = Map::new();
        extend_except(&mut args, &node, &["$partial"]);
        return Node::Partial(PartialNode {
            name: name.to_string(),
            args,
            loc,
            meta: Meta::new(),
        });
    }

    if let Some(source) = non_empty_str(&node, "each") {
        let template = match node.get("template") {
            Some(t) => parse_child(t, file),
            None => unknown_widget(file),
        };
        return Node::Loop(LoopNode {
            source: source.to_string(),
            alias: non_empty_str(&node, "as").unwrap_or("item").to_string(),
            template: Box::new(template),
            loc,
            meta: Meta::new(),
        });
    }

    if let Some(name) = non_empty_str(&node, "$slot") {
        return Node::Slot(SlotNode {
            name: name.to_string(),
            description: opt_string(&node, "description"),
            optional: node
                .get("optional")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            loc,
            meta: Meta::new(),
        });
    }

    if let Some(Value::Array(items)) = node.get("fragment") {
        return Node::Fragment(FragmentNode {
            children: parse_children(items, file),
            loc,
            meta: Meta::new(),
        });
    }

    let condition = visibility_condition(&node);

    let children = match (node.get("widgets"), node.get("sections")) {
        (Some(Value::Array(items)), _) | (_, Some(Value::Array(items))) => Some(items),
        _ => None,
    };

    if let Some(items) = children {
        let section = Node::Section(SectionNode {
            name: opt_string(&node, "name"),
            layout: parse_layout(node.get("layout")),
            tag: opt_string(&node, "tag"),
            aria_label: opt_string(&node, "aria-label"),
            children: parse_children(items, file),
            loc,
            meta: Meta::new(),
        });
        return wrap_conditional(section, condition, file);
    }

    let mut props = Map::new();
    extend_except(&mut props, &node, &WIDGET_STRUCTURAL_KEYS);

    let widget = Node::Widget(WidgetNode {
        widget_type: non_empty_str(&node, "type").unwrap_or("unknown").to_string(),
        source: node
            .get("source")
            .and_then(Value::as_str)
            .map(DataBinding::new),
        props,
        loc,
        meta: Meta::new(),
    });
    wrap_conditional(widget, condition, file)
}

// ═══════════════════════════════════════════════════════════════════════════════
// PAGE
// ═══════════════════════════════════════════════════════════════════════════════

fn required_str(
    doc: &Map<String, Value>,
    field: &'static str,
    file: &str,
) -> Result<String, ParseError> {
    match doc.get(field) {
        None | Some(Value::Null) => Err(ParseError::MissingField {
            file: file.to_string(),
            field,
        }),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(ParseError::InvalidField {
            file: file.to_string(),
            field,
            expected: "a string",
        }),
    }
}

fn parse_loader(raw: Option<&Value>, file: &str) -> Option<LoaderConfig> {
    let raw = raw?;
    let Some(source) = raw.get("source").and_then(Value::as_str) else {
        tracing::warn!(file, "ignoring loader without a string `source`");
        return None;
    };
    let params = raw
        .get("params")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    Some(LoaderConfig {
        source: source.to_string(),
        params,
    })
}

fn parse_block<T: serde::de::DeserializeOwned>(
    raw: Option<&Value>,
    field: &str,
    file: &str,
) -> Option<T> {
    let raw = raw.filter(|v| !v.is_null())?;
    match serde_json::from_value(raw.clone()) {
        Ok(block) => Some(block),
        Err(e) => {
            tracing::warn!(file, field, error = %e, "ignoring malformed block");
            None
        }
    }
}

/// Parse a whole view document. Fails only when `name`, `type` or `route`
/// is missing (or not a string).
pub fn parse_page(raw: &Value, file: &str) -> Result<PageNode, ParseError> {
    let doc = raw.as_object().ok_or_else(|| ParseError::NotAMap {
        file: file.to_string(),
    })?;

    let name = required_str(doc, "name", file)?;
    let page_type = required_str(doc, "type", file)?;
    let route = required_str(doc, "route", file)?;

    let sections = match doc.get("sections") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => parse_children(items, file),
        Some(_) => {
            tracing::warn!(file, "`sections` is not a list; treating page as empty");
            Vec::new()
        }
    };

    tracing::debug!(file, page = %name, sections = sections.len(), "parsed view");

    Ok(PageNode {
        name,
        page_type,
        route,
        auth: doc.get("auth").and_then(Value::as_bool).unwrap_or(false),
        ssr: doc.get("ssr").and_then(Value::as_bool).unwrap_or(false),
        loader: parse_loader(doc.get("loader"), file),
        page_meta: doc.get("meta").and_then(Value::as_object).cloned(),
        accessibility: parse_block::<AccessibilityConfig>(
            doc.get("accessibility"),
            "accessibility",
            file,
        ),
        responsive: parse_block::<ResponsiveConfig>(doc.get("responsive"), "responsive", file),
        sections,
        loc: SourceLocation::file(file),
        meta: Meta::new(),
    })
}
