//! Resolve Module
//!
//! Second pass over a parsed page forest: inlines `$ref` sections, expands
//! `$partial` templates and checks widget types against the registry.
//! Problems accumulate as diagnostics; nothing here aborts.
//!
//! Cycle detection keys (`page#section`, `$partial:name`) live in an
//! in-progress set that is created fresh for every top-level child of a page,
//! so it only sees cycles along a single depth-first path.

use lazy_static::lazy_static;
use rayon::prelude::*;
use regex::Regex;
use std::collections::{HashMap, HashSet};

use crate::diagnostics::{
    Diagnostic, CIRCULAR_REF, UNKNOWN_PARTIAL, UNKNOWN_REF_SECTION, UNKNOWN_REF_TARGET,
    UNKNOWN_WIDGET_TYPE,
};
use crate::nodes::{Node, PageNode, PartialNode, RefNode};
use crate::partial::PartialSet;
use crate::registry::WidgetRegistry;

lazy_static! {
    static ref ACRONYM_BOUNDARY: Regex = Regex::new(r"([A-Z]+)([A-Z][a-z])").unwrap();
    static ref WORD_BOUNDARY: Regex = Regex::new(r"([a-z0-9])([A-Z])").unwrap();
    static ref SEPARATORS: Regex = Regex::new(r"[\s_]+").unwrap();
    static ref REPEATED_HYPHENS: Regex = Regex::new(r"-{2,}").unwrap();
}

/// `AdminDashboard` → `admin-dashboard`, `Usage Stats` → `usage-stats`.
pub fn slugify(name: &str) -> String {
    let s = ACRONYM_BOUNDARY.replace_all(name.trim(), "$1-$2");
    let s = WORD_BOUNDARY.replace_all(&s, "$1-$2");
    let s = SEPARATORS.replace_all(&s, "-");
    let s = REPEATED_HYPHENS.replace_all(&s, "-");
    s.trim_matches('-').to_lowercase()
}

/// Index key for a page.
pub fn page_slug(page: &PageNode) -> String {
    slugify(&page.name)
}

// ═══════════════════════════════════════════════════════════════════════════════
// PAGE INDEX
// ═══════════════════════════════════════════════════════════════════════════════

/// Pages by slug. Must be complete before any `$ref` is resolved.
#[derive(Debug, Default)]
pub struct PageIndex<'a> {
    pages: HashMap<String, &'a PageNode>,
}

impl<'a> PageIndex<'a> {
    pub fn build(pages: &'a [PageNode]) -> Self {
        let mut index = HashMap::with_capacity(pages.len());
        for page in pages {
            let slug = page_slug(page);
            if index.contains_key(&slug) {
                tracing::warn!(
                    page = %page.name,
                    slug = %slug,
                    "duplicate page slug; keeping the first page"
                );
                continue;
            }
            index.insert(slug, page);
        }
        tracing::debug!(pages = index.len(), "indexed pages");
        Self { pages: index }
    }

    /// Looks up the literal handle first, then its slug.
    pub fn get(&self, handle: &str) -> Option<&'a PageNode> {
        self.pages
            .get(handle)
            .or_else(|| self.pages.get(&slugify(handle)))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// First section named `name`, depth-first, descending through every
/// container kind. A match sitting directly in a conditional branch yields
/// the conditional, so the section keeps its guard when inlined.
pub fn find_section<'n>(children: &'n [Node], name: &str) -> Option<&'n Node> {
    for child in children {
        let found = match child {
            Node::Section(s) if s.name.as_deref() == Some(name) => return Some(child),
            Node::Section(s) => find_section(&s.children, name),
            Node::Conditional(c) => {
                let branches = std::iter::once(c.then.as_slice()).chain(c.otherwise.as_deref());
                branches
                    .filter_map(|branch| {
                        let hit = find_section(branch, name)?;
                        if branch.iter().any(|n| std::ptr::eq(n, hit)) {
                            Some(child)
                        } else {
                            Some(hit)
                        }
                    })
                    .next()
            }
            Node::Fragment(f) => find_section(&f.children, name),
            Node::Loop(l) => find_section(std::slice::from_ref(&*l.template), name),
            Node::Widget(_) | Node::Ref(_) | Node::Partial(_) | Node::Slot(_) => None,
        };
        if found.is_some() {
            return found;
        }
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════════
// RESOLUTION
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub pages: Vec<PageNode>,
    pub errors: Vec<Diagnostic>,
}

impl Resolution {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

struct ResolutionContext<'a> {
    index: &'a PageIndex<'a>,
    partials: &'a PartialSet,
    registry: &'a WidgetRegistry,
    errors: Vec<Diagnostic>,
}

fn resolve_nodes(
    nodes: &[Node],
    ctx: &mut ResolutionContext,
    in_progress: &mut HashSet<String>,
) -> Vec<Node> {
    nodes
        .iter()
        .map(|node| resolve_node(node, ctx, in_progress))
        .collect()
}

fn resolve_node(
    node: &Node,
    ctx: &mut ResolutionContext,
    in_progress: &mut HashSet<String>,
) -> Node {
    match node {
        Node::Ref(r) => resolve_ref(r, ctx, in_progress),
        Node::Partial(p) => resolve_partial(p, ctx, in_progress),
        Node::Widget(w) => {
            if !ctx.registry.has(&w.widget_type) {
                ctx.errors.push(Diagnostic::error(
                    UNKNOWN_WIDGET_TYPE,
                    format!("Unknown widget type \"{}\"", w.widget_type),
                    &w.loc,
                ));
            }
            node.clone()
        }
        Node::Section(s) => {
            Node::Section(s.with_children(resolve_nodes(&s.children, ctx, in_progress)))
        }
        Node::Conditional(c) => {
            let then = resolve_nodes(&c.then, ctx, in_progress);
            let otherwise = c
                .otherwise
                .as_ref()
                .map(|branch| resolve_nodes(branch, ctx, in_progress));
            Node::Conditional(c.with_branches(then, otherwise))
        }
        Node::Loop(l) => Node::Loop(l.with_template(resolve_node(&l.template, ctx, in_progress))),
        Node::Fragment(f) => {
            Node::Fragment(f.with_children(resolve_nodes(&f.children, ctx, in_progress)))
        }
        Node::Slot(_) => node.clone(),
    }
}

fn resolve_ref(
    node: &RefNode,
    ctx: &mut ResolutionContext,
    in_progress: &mut HashSet<String>,
) -> Node {
    let index = ctx.index;
    let Some(target_page) = index.get(&node.page) else {
        ctx.errors.push(Diagnostic::error(
            UNKNOWN_REF_TARGET,
            format!("$ref target page \"{}\" not found", node.page),
            &node.loc,
        ));
        return Node::Ref(node.clone());
    };

    let Some(section) = find_section(&target_page.sections, &node.section) else {
        ctx.errors.push(Diagnostic::error(
            UNKNOWN_REF_SECTION,
            format!(
                "$ref target section \"{}\" not found in \"{}\"",
                node.section, node.page
            ),
            &node.loc,
        ));
        return Node::Ref(node.clone());
    };

    let key = format!("{}#{}", page_slug(target_page), node.section);
    if !in_progress.insert(key.clone()) {
        ctx.errors.push(Diagnostic::error(
            CIRCULAR_REF,
            format!("Circular $ref: {}", key),
            &node.loc,
        ));
        return Node::Ref(node.clone());
    }

    tracing::trace!(ref_target = %node.target, "inlining section");
    let resolved = resolve_node(section, ctx, in_progress);
    in_progress.remove(&key);
    resolved
}

fn resolve_partial(
    node: &PartialNode,
    ctx: &mut ResolutionContext,
    in_progress: &mut HashSet<String>,
) -> Node {
    let partials = ctx.partials;
    let Some(partial) = partials.get(&node.name) else {
        ctx.errors.push(Diagnostic::error(
            UNKNOWN_PARTIAL,
            format!("Partial \"{}\" not found", node.name),
            &node.loc,
        ));
        return Node::Partial(node.clone());
    };

    let key = format!("$partial:{}", partial.name);
    if !in_progress.insert(key.clone()) {
        ctx.errors.push(Diagnostic::error(
            CIRCULAR_REF,
            format!("Circular $partial: {}", partial.name),
            &node.loc,
        ));
        return Node::Partial(node.clone());
    }

    tracing::trace!(partial = %partial.name, "expanding partial");
    let expanded = partial.instantiate(&node.args);
    let resolved = resolve_node(&expanded, ctx, in_progress);
    in_progress.remove(&key);
    resolved
}

/// Resolve one page against a complete index. Returns the new page and the
/// errors found on it.
pub fn resolve_page(
    page: &PageNode,
    index: &PageIndex,
    registry: &WidgetRegistry,
    partials: &PartialSet,
) -> (PageNode, Vec<Diagnostic>) {
    let mut ctx = ResolutionContext {
        index,
        partials,
        registry,
        errors: Vec::new(),
    };
    let sections = page
        .sections
        .iter()
        .map(|section| resolve_node(section, &mut ctx, &mut HashSet::new()))
        .collect();
    (page.with_sections(sections), ctx.errors)
}

fn collect(results: Vec<(PageNode, Vec<Diagnostic>)>) -> Resolution {
    let mut resolution = Resolution::default();
    for (page, errors) in results {
        resolution.pages.push(page);
        resolution.errors.extend(errors);
    }
    tracing::debug!(
        pages = resolution.pages.len(),
        errors = resolution.errors.len(),
        "resolved pages"
    );
    resolution
}

/// Resolve every page. Pages are resolved in parallel once the index is
/// built; output and error order follow input order.
pub fn resolve_all(
    pages: &[PageNode],
    registry: &WidgetRegistry,
    partials: &PartialSet,
) -> Resolution {
    let index = PageIndex::build(pages);
    collect(
        pages
            .par_iter()
            .map(|page| resolve_page(page, &index, registry, partials))
            .collect(),
    )
}

/// Same as [`resolve_all`] on the calling thread.
pub fn resolve_all_sequential(
    pages: &[PageNode],
    registry: &WidgetRegistry,
    partials: &PartialSet,
) -> Resolution {
    let index = PageIndex::build(pages);
    collect(
        pages
            .iter()
            .map(|page| resolve_page(page, &index, registry, partials))
            .collect(),
    )
}
