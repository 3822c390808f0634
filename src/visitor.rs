use crate::nodes::{
    ConditionalNode, FragmentNode, LoopNode, Node, NodeKind, PageNode, PartialNode, RefNode,
    SectionNode, SlotNode, WidgetNode,
};

/// The PageVisitor trait defines the single authoritative traversal mechanism for view ASTs.
///
/// Rules:
/// 1. Traversal is a bottom-up rebuild: children are walked first, then the
///    parent's `visit_*` sees the rebuilt parent.
/// 2. Every method defaults to identity. A missing override is a no-op for that
///    kind, never a skip: children are still walked.
/// 3. `visit_ref`, `visit_partial`, `visit_slot`, `visit_conditional`,
///    `visit_loop` and `visit_fragment` may return a node of a different kind.
/// 4. The input tree is never mutated; `walk_page` returns a new tree.
pub trait PageVisitor {
    fn visit_page(&mut self, page: PageNode) -> PageNode {
        page
    }

    fn visit_section(&mut self, section: SectionNode) -> SectionNode {
        section
    }

    fn visit_widget(&mut self, widget: WidgetNode) -> WidgetNode {
        widget
    }

    fn visit_ref(&mut self, node: RefNode) -> Node {
        Node::Ref(node)
    }

    fn visit_partial(&mut self, node: PartialNode) -> Node {
        Node::Partial(node)
    }

    fn visit_slot(&mut self, node: SlotNode) -> Node {
        Node::Slot(node)
    }

    fn visit_conditional(&mut self, node: ConditionalNode) -> Node {
        Node::Conditional(node)
    }

    fn visit_loop(&mut self, node: LoopNode) -> Node {
        Node::Loop(node)
    }

    fn visit_fragment(&mut self, node: FragmentNode) -> Node {
        Node::Fragment(node)
    }
}

pub fn walk_page<V: PageVisitor + ?Sized>(page: &PageNode, visitor: &mut V) -> PageNode {
    let walked = page.with_sections(walk_children(&page.sections, visitor));
    visitor.visit_page(walked)
}

pub fn walk_children<V: PageVisitor + ?Sized>(children: &[Node], visitor: &mut V) -> Vec<Node> {
    children
        .iter()
        .map(|child| walk_child(child, visitor))
        .collect()
}

pub fn walk_child<V: PageVisitor + ?Sized>(node: &Node, visitor: &mut V) -> Node {
    match node {
        Node::Section(s) => Node::Section(walk_section(s, visitor)),
        Node::Widget(w) => Node::Widget(visitor.visit_widget(w.clone())),
        Node::Ref(r) => visitor.visit_ref(r.clone()),
        Node::Partial(p) => visitor.visit_partial(p.clone()),
        Node::Slot(s) => visitor.visit_slot(s.clone()),
        Node::Conditional(c) => walk_conditional(c, visitor),
        Node::Loop(l) => walk_loop(l, visitor),
        Node::Fragment(f) => walk_fragment(f, visitor),
    }
}

pub fn walk_section<V: PageVisitor + ?Sized>(
    section: &SectionNode,
    visitor: &mut V,
) -> SectionNode {
    let walked = section.with_children(walk_children(&section.children, visitor));
    visitor.visit_section(walked)
}

pub fn walk_conditional<V: PageVisitor + ?Sized>(
    node: &ConditionalNode,
    visitor: &mut V,
) -> Node {
    let then = walk_children(&node.then, visitor);
    let otherwise = node
        .otherwise
        .as_ref()
        .map(|branch| walk_children(branch, visitor));
    visitor.visit_conditional(node.with_branches(then, otherwise))
}

pub fn walk_loop<V: PageVisitor + ?Sized>(node: &LoopNode, visitor: &mut V) -> Node {
    let template = walk_child(&node.template, visitor);
    visitor.visit_loop(node.with_template(template))
}

pub fn walk_fragment<V: PageVisitor + ?Sized>(node: &FragmentNode, visitor: &mut V) -> Node {
    let walked = node.with_children(walk_children(&node.children, visitor));
    visitor.visit_fragment(walked)
}

// ═══════════════════════════════════════════════════════════════════════════════
// COLLECTION
// ═══════════════════════════════════════════════════════════════════════════════

struct Collector {
    kind: NodeKind,
    found: Vec<Node>,
}

/// Nodes of `kind` in the subtree rooted at `node`, `node` included.
fn count_kind(node: &Node, kind: NodeKind) -> usize {
    let nested: usize = match node {
        Node::Section(s) => s.children.iter().map(|c| count_kind(c, kind)).sum(),
        Node::Conditional(c) => c
            .then
            .iter()
            .chain(c.otherwise.iter().flatten())
            .map(|n| count_kind(n, kind))
            .sum(),
        Node::Loop(l) => count_kind(&l.template, kind),
        Node::Fragment(f) => f.children.iter().map(|c| count_kind(c, kind)).sum(),
        Node::Widget(_) | Node::Ref(_) | Node::Partial(_) | Node::Slot(_) => 0,
    };
    usize::from(node.kind() == kind) + nested
}

impl Collector {
    /// The walk is bottom-up, so a container's matching descendants are
    /// already at the tail of `found`. Inserting the container in front of
    /// them keeps the list in document (pre-)order.
    fn record(&mut self, node: &Node) {
        if node.kind() != self.kind {
            return;
        }
        let descendants = count_kind(node, self.kind) - 1;
        let at = self.found.len().saturating_sub(descendants);
        self.found.insert(at, node.clone());
    }

    fn observe(&mut self, node: Node) -> Node {
        self.record(&node);
        node
    }
}

impl PageVisitor for Collector {
    fn visit_section(&mut self, section: SectionNode) -> SectionNode {
        if self.kind == NodeKind::Section {
            self.record(&Node::Section(section.clone()));
        }
        section
    }

    fn visit_widget(&mut self, widget: WidgetNode) -> WidgetNode {
        if self.kind == NodeKind::Widget {
            self.found.push(Node::Widget(widget.clone()));
        }
        widget
    }

    fn visit_ref(&mut self, node: RefNode) -> Node {
        self.observe(Node::Ref(node))
    }

    fn visit_partial(&mut self, node: PartialNode) -> Node {
        self.observe(Node::Partial(node))
    }

    fn visit_slot(&mut self, node: SlotNode) -> Node {
        self.observe(Node::Slot(node))
    }

    fn visit_conditional(&mut self, node: ConditionalNode) -> Node {
        self.observe(Node::Conditional(node))
    }

    fn visit_loop(&mut self, node: LoopNode) -> Node {
        self.observe(Node::Loop(node))
    }

    fn visit_fragment(&mut self, node: FragmentNode) -> Node {
        self.observe(Node::Fragment(node))
    }
}

/// All nodes of `kind` in document order: left to right, a container before
/// its own descendants. The page itself is never collected.
pub fn collect_nodes(page: &PageNode, kind: NodeKind) -> Vec<Node> {
    let mut collector = Collector {
        kind,
        found: Vec::new(),
    };
    walk_page(page, &mut collector);
    collector.found
}

pub fn collect_widgets(page: &PageNode) -> Vec<WidgetNode> {
    collect_nodes(page, NodeKind::Widget)
        .into_iter()
        .filter_map(|node| match node {
            Node::Widget(w) => Some(w),
            _ => None,
        })
        .collect()
}
