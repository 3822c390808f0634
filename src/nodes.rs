//! View AST
//!
//! Canonical intermediate representation for view compilation. Every pass
//! (parse, resolve, validate) consumes and produces these nodes, never raw
//! documents.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Open annotation bag carried by every node. Never interpreted here.
pub type Meta = Map<String, Value>;

/// Widget props: ordered map of raw document keys to scalar/list/map values.
pub type Props = Map<String, Value>;

// ═══════════════════════════════════════════════════════════════════════════════
// LOCATIONS & SMALL CONFIG TYPES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    pub col: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_col: Option<u32>,
}

impl SourceLocation {
    /// File-granular location (line 1, col 1).
    pub fn file(file: &str) -> Self {
        Self {
            file: file.to_string(),
            line: 1,
            col: 1,
            end_line: None,
            end_col: None,
        }
    }
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self::file("<inline>")
    }
}

/// A data binding path such as `metrics.totalUsers`. Opaque to this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataBinding {
    pub path: String,
    /// Reserved for generators that type bindings against entities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
}

impl DataBinding {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            entity_type: None,
            field_type: None,
        }
    }
}

/// Breakpoint → layout token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xl: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoaderConfig {
    /// Named data source (usually an entity).
    pub source: String,
    /// Route params, in order.
    #[serde(default)]
    pub params: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AriaLive {
    Polite,
    Assertive,
    Off,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, alias = "aria-label", skip_serializing_if = "Option::is_none")]
    pub aria_label: Option<String>,
    #[serde(default, alias = "aria-live", skip_serializing_if = "Option::is_none")]
    pub aria_live: Option<AriaLive>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmark: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_nav: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_trap: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reduce_motion: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponsiveStrategy {
    MobileFirst,
    DesktopFirst,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsiveConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<ResponsiveStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakpoints: Option<Map<String, Value>>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// NODE KINDS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Page,
    Section,
    Widget,
    Ref,
    Partial,
    Slot,
    Conditional,
    Loop,
    Fragment,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Page => "page",
            NodeKind::Section => "section",
            NodeKind::Widget => "widget",
            NodeKind::Ref => "ref",
            NodeKind::Partial => "partial",
            NodeKind::Slot => "slot",
            NodeKind::Conditional => "conditional",
            NodeKind::Loop => "loop",
            NodeKind::Fragment => "fragment",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PAGE (ROOT)
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageNode {
    pub name: String,
    /// page, dashboard, chat, form, table, detail, builder
    #[serde(rename = "type")]
    pub page_type: String,
    pub route: String,
    #[serde(default)]
    pub auth: bool,
    #[serde(default)]
    pub ssr: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loader: Option<LoaderConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_meta: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessibility: Option<AccessibilityConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsive: Option<ResponsiveConfig>,
    /// Render order.
    pub sections: Vec<Node>,
    #[serde(default)]
    pub loc: SourceLocation,
    #[serde(default)]
    pub meta: Meta,
}

impl PageNode {
    pub fn kind(&self) -> NodeKind {
        NodeKind::Page
    }

    /// Structural copy with new sections.
    pub fn with_sections(&self, sections: Vec<Node>) -> PageNode {
        PageNode {
            name: self.name.clone(),
            page_type: self.page_type.clone(),
            route: self.route.clone(),
            auth: self.auth,
            ssr: self.ssr,
            loader: self.loader.clone(),
            page_meta: self.page_meta.clone(),
            accessibility: self.accessibility.clone(),
            responsive: self.responsive.clone(),
            sections,
            loc: self.loc.clone(),
            meta: self.meta.clone(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CHILD NODES
// ═══════════════════════════════════════════════════════════════════════════════

/// Anything that can appear in a page's `sections` or a container's children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Node {
    Section(SectionNode),
    Widget(WidgetNode),
    Ref(RefNode),
    Partial(PartialNode),
    Slot(SlotNode),
    Conditional(ConditionalNode),
    Loop(LoopNode),
    Fragment(FragmentNode),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Section(_) => NodeKind::Section,
            Node::Widget(_) => NodeKind::Widget,
            Node::Ref(_) => NodeKind::Ref,
            Node::Partial(_) => NodeKind::Partial,
            Node::Slot(_) => NodeKind::Slot,
            Node::Conditional(_) => NodeKind::Conditional,
            Node::Loop(_) => NodeKind::Loop,
            Node::Fragment(_) => NodeKind::Fragment,
        }
    }

    pub fn loc(&self) -> &SourceLocation {
        match self {
            Node::Section(n) => &n.loc,
            Node::Widget(n) => &n.loc,
            Node::Ref(n) => &n.loc,
            Node::Partial(n) => &n.loc,
            Node::Slot(n) => &n.loc,
            Node::Conditional(n) => &n.loc,
            Node::Loop(n) => &n.loc,
            Node::Fragment(n) => &n.loc,
        }
    }

    pub fn as_section(&self) -> Option<&SectionNode> {
        match self {
            Node::Section(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_widget(&self) -> Option<&WidgetNode> {
        match self {
            Node::Widget(w) => Some(w),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionNode {
    /// Handle used by `$ref` resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutConfig>,
    /// Semantic HTML tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aria_label: Option<String>,
    pub children: Vec<Node>,
    #[serde(default)]
    pub loc: SourceLocation,
    #[serde(default)]
    pub meta: Meta,
}

impl SectionNode {
    pub fn with_children(&self, children: Vec<Node>) -> SectionNode {
        SectionNode {
            name: self.name.clone(),
            layout: self.layout.clone(),
            tag: self.tag.clone(),
            aria_label: self.aria_label.clone(),
            children,
            loc: self.loc.clone(),
            meta: self.meta.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetNode {
    /// Registry key, e.g. `stat-card`.
    pub widget_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<DataBinding>,
    #[serde(default)]
    pub props: Props,
    #[serde(default)]
    pub loc: SourceLocation,
    #[serde(default)]
    pub meta: Meta,
}

impl WidgetNode {
    pub fn new(widget_type: impl Into<String>, loc: SourceLocation) -> Self {
        Self {
            widget_type: widget_type.into(),
            source: None,
            props: Props::new(),
            loc,
            meta: Meta::new(),
        }
    }
}

/// Unresolved cross-page section reference (`page#section`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefNode {
    pub target: String,
    pub page: String,
    pub section: String,
    #[serde(default)]
    pub loc: SourceLocation,
    #[serde(default)]
    pub meta: Meta,
}

/// Unresolved partial instantiation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialNode {
    pub name: String,
    #[serde(default)]
    pub args: Map<String, Value>,
    #[serde(default)]
    pub loc: SourceLocation,
    #[serde(default)]
    pub meta: Meta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub loc: SourceLocation,
    #[serde(default)]
    pub meta: Meta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalNode {
    /// Raw boolean expression, e.g. `$data.hasMetrics` or `!user.guest`.
    pub condition: String,
    pub then: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otherwise: Option<Vec<Node>>,
    #[serde(default)]
    pub loc: SourceLocation,
    #[serde(default)]
    pub meta: Meta,
}

impl ConditionalNode {
    pub fn with_branches(&self, then: Vec<Node>, otherwise: Option<Vec<Node>>) -> ConditionalNode {
        ConditionalNode {
            condition: self.condition.clone(),
            then,
            otherwise,
            loc: self.loc.clone(),
            meta: self.meta.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoopNode {
    /// Collection binding path.
    pub source: String,
    /// Iteration variable.
    #[serde(rename = "as")]
    pub alias: String,
    pub template: Box<Node>,
    #[serde(default)]
    pub loc: SourceLocation,
    #[serde(default)]
    pub meta: Meta,
}

impl LoopNode {
    pub fn with_template(&self, template: Node) -> LoopNode {
        LoopNode {
            source: self.source.clone(),
            alias: self.alias.clone(),
            template: Box::new(template),
            loc: self.loc.clone(),
            meta: self.meta.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FragmentNode {
    pub children: Vec<Node>,
    #[serde(default)]
    pub loc: SourceLocation,
    #[serde(default)]
    pub meta: Meta,
}

impl FragmentNode {
    pub fn with_children(&self, children: Vec<Node>) -> FragmentNode {
        FragmentNode {
            children,
            loc: self.loc.clone(),
            meta: self.meta.clone(),
        }
    }
}
