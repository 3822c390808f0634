//! Validate Module
//!
//! Read-only third pass. Walks a (nominally resolved) page and reports
//! diagnostics; never fails and never rebuilds the tree.

use rayon::prelude::*;
use serde_json::Value;

use crate::diagnostics::{
    Diagnostic, ACCESSIBILITY_WARNING, EMPTY_SECTIONS, MISSING_LOADER_FOR_BINDING,
    MISSING_REQUIRED_PROP, PAGE_MISSING_NAME, PAGE_MISSING_ROUTE, UNKNOWN_WIDGET_TYPE,
    UNRESOLVED_PARTIAL, UNRESOLVED_REF,
};
use crate::nodes::{Node, PageNode, WidgetNode};
use crate::registry::{WidgetRegistry, WidgetSchema};

/// Widgets a screen reader needs a label for.
const INTERACTIVE_WIDGETS: [&str; 3] = ["chat-input", "search-bar", "form"];

struct ValidationContext<'a> {
    registry: &'a WidgetRegistry,
    has_loader: bool,
    diagnostics: Vec<Diagnostic>,
}

/// Present and not null, `false` or `""`.
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// WIDGET CHECKS
// ═══════════════════════════════════════════════════════════════════════════════

fn validate_widget_props(node: &WidgetNode, schema: &WidgetSchema, ctx: &mut ValidationContext) {
    for prop in schema.required_props() {
        let in_props = node.props.contains_key(prop);
        let as_source = prop == "source" && node.source.is_some();
        if !in_props && !as_source {
            ctx.diagnostics.push(Diagnostic::error(
                MISSING_REQUIRED_PROP,
                format!(
                    "Widget \"{}\" missing required prop \"{}\"",
                    node.widget_type, prop
                ),
                &node.loc,
            ));
        }
    }
}

fn validate_accessibility(node: &WidgetNode, ctx: &mut ValidationContext) {
    if node.widget_type == "image"
        && !node.props.contains_key("alt")
        && !is_truthy(node.props.get("aria-label"))
    {
        ctx.diagnostics.push(Diagnostic::warning(
            ACCESSIBILITY_WARNING,
            "Image widget missing \"alt\" text",
            &node.loc,
        ));
    }

    if INTERACTIVE_WIDGETS.contains(&node.widget_type.as_str())
        && !is_truthy(node.props.get("aria-label"))
        && !is_truthy(node.props.get("label"))
    {
        ctx.diagnostics.push(Diagnostic::info(
            ACCESSIBILITY_WARNING,
            format!(
                "Widget \"{}\" should have an aria-label or label",
                node.widget_type
            ),
            &node.loc,
        ));
    }
}

fn validate_widget(node: &WidgetNode, ctx: &mut ValidationContext) {
    match ctx.registry.get(&node.widget_type) {
        Some(schema) => validate_widget_props(node, schema, ctx),
        None => ctx.diagnostics.push(Diagnostic::error(
            UNKNOWN_WIDGET_TYPE,
            format!("Unknown widget type \"{}\"", node.widget_type),
            &node.loc,
        )),
    }

    validate_accessibility(node, ctx);

    if let Some(source) = &node.source {
        if !ctx.has_loader {
            ctx.diagnostics.push(Diagnostic::warning(
                MISSING_LOADER_FOR_BINDING,
                format!(
                    "Widget \"{}\" has data binding \"{}\" but page has no loader",
                    node.widget_type, source.path
                ),
                &node.loc,
            ));
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TREE WALK
// ═══════════════════════════════════════════════════════════════════════════════

fn validate_children(children: &[Node], ctx: &mut ValidationContext) {
    for child in children {
        validate_child(child, ctx);
    }
}

fn validate_child(node: &Node, ctx: &mut ValidationContext) {
    match node {
        Node::Widget(w) => validate_widget(w, ctx),
        Node::Section(s) => validate_children(&s.children, ctx),
        Node::Conditional(c) => {
            validate_children(&c.then, ctx);
            if let Some(otherwise) = &c.otherwise {
                validate_children(otherwise, ctx);
            }
        }
        Node::Loop(l) => validate_child(&l.template, ctx),
        Node::Fragment(f) => validate_children(&f.children, ctx),
        Node::Ref(r) => ctx.diagnostics.push(Diagnostic::error(
            UNRESOLVED_REF,
            format!("Unresolved $ref: \"{}\"; run the resolver first", r.target),
            &r.loc,
        )),
        Node::Partial(p) => ctx.diagnostics.push(Diagnostic::error(
            UNRESOLVED_PARTIAL,
            format!("Unresolved $partial: \"{}\"; run the resolver first", p.name),
            &p.loc,
        )),
        Node::Slot(_) => {}
    }
}

fn validate_page_fields(page: &PageNode, ctx: &mut ValidationContext) {
    if page.name.is_empty() {
        ctx.diagnostics.push(Diagnostic::error(
            PAGE_MISSING_NAME,
            "Page missing \"name\"",
            &page.loc,
        ));
    }
    if page.route.is_empty() {
        ctx.diagnostics.push(Diagnostic::error(
            PAGE_MISSING_ROUTE,
            "Page missing \"route\"",
            &page.loc,
        ));
    }
    if page.sections.is_empty() {
        ctx.diagnostics.push(Diagnostic::warning(
            EMPTY_SECTIONS,
            format!("Page \"{}\" has no sections", page.name),
            &page.loc,
        ));
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENTRY POINTS
// ═══════════════════════════════════════════════════════════════════════════════

pub fn validate_page(page: &PageNode, registry: &WidgetRegistry) -> Vec<Diagnostic> {
    let mut ctx = ValidationContext {
        registry,
        has_loader: page.loader.is_some(),
        diagnostics: Vec::new(),
    };
    validate_page_fields(page, &mut ctx);
    validate_children(&page.sections, &mut ctx);
    ctx.diagnostics
}

/// Validate pages in parallel; diagnostics keep page order.
pub fn validate_pages(pages: &[PageNode], registry: &WidgetRegistry) -> Vec<Diagnostic> {
    let per_page: Vec<Vec<Diagnostic>> = pages
        .par_iter()
        .map(|page| validate_page(page, registry))
        .collect();
    let diagnostics: Vec<Diagnostic> = per_page.into_iter().flatten().collect();
    tracing::debug!(pages = pages.len(), diagnostics = diagnostics.len(), "validated pages");
    diagnostics
}

pub fn validate_pages_sequential(pages: &[PageNode], registry: &WidgetRegistry) -> Vec<Diagnostic> {
    pages
        .iter()
        .flat_map(|page| validate_page(page, registry))
        .collect()
}
