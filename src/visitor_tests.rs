#[cfg(test)]
mod tests {
    use crate::nodes::{
        ConditionalNode, Node, NodeKind, PageNode, RefNode, SectionNode, SourceLocation,
        WidgetNode,
    };
    use crate::parse::parse_page;
    use crate::visitor::{collect_nodes, collect_widgets, walk_page, PageVisitor};
    use serde_json::json;

    fn sample_page() -> PageNode {
        parse_page(
            &json!({
                "name": "Home",
                "type": "page",
                "route": "/",
                "sections": [
                    {
                        "name": "A",
                        "widgets": [
                            { "type": "badge", "source": "user.role" },
                            {
                                "name": "B",
                                "widgets": [{
                                    "type": "avatar",
                                    "source": "user.photo",
                                    "alt": "me"
                                }]
                            }
                        ]
                    },
                    { "type": "hero", "heading": { "text": "Hi" } }
                ]
            }),
            "home.view.yaml",
        )
        .unwrap()
    }

    #[derive(Default)]
    struct Recorder {
        seen: Vec<String>,
    }

    impl PageVisitor for Recorder {
        fn visit_page(&mut self, page: PageNode) -> PageNode {
            self.seen.push(format!("page:{}", page.name));
            page
        }

        fn visit_section(&mut self, section: SectionNode) -> SectionNode {
            self.seen
                .push(format!("section:{}", section.name.as_deref().unwrap_or("")));
            section
        }

        fn visit_widget(&mut self, widget: WidgetNode) -> WidgetNode {
            self.seen.push(format!("widget:{}", widget.widget_type));
            widget
        }

        fn visit_conditional(&mut self, node: ConditionalNode) -> Node {
            self.seen.push(format!("conditional:{}", node.condition));
            Node::Conditional(node)
        }
    }

    #[test]
    fn test_walk_is_bottom_up() {
        let mut recorder = Recorder::default();
        walk_page(&sample_page(), &mut recorder);
        assert_eq!(
            recorder.seen,
            vec![
                "widget:badge",
                "widget:avatar",
                "section:B",
                "section:A",
                "widget:hero",
                "page:Home",
            ]
        );
    }

    #[test]
    fn test_default_visitor_is_identity() {
        struct Noop;
        impl PageVisitor for Noop {}

        let page = sample_page();
        assert_eq!(walk_page(&page, &mut Noop), page);
    }

    #[test]
    fn test_transform_returns_new_tree() {
        struct Rename;
        impl PageVisitor for Rename {
            fn visit_widget(&mut self, mut widget: WidgetNode) -> WidgetNode {
                widget.widget_type = format!("x-{}", widget.widget_type);
                widget
            }
        }

        let page = sample_page();
        let before = page.clone();
        let renamed = walk_page(&page, &mut Rename);

        assert_eq!(page, before);
        let types: Vec<String> = collect_widgets(&renamed)
            .into_iter()
            .map(|w| w.widget_type)
            .collect();
        assert_eq!(types, vec!["x-badge", "x-avatar", "x-hero"]);
    }

    #[test]
    fn test_visit_ref_may_replace_kind() {
        struct Stub;
        impl PageVisitor for Stub {
            fn visit_ref(&mut self, node: RefNode) -> Node {
                let mut w = WidgetNode::new("empty-state", node.loc.clone());
                w.props.insert("message".to_string(), json!(node.target));
                Node::Widget(w)
            }
        }

        let page = parse_page(
            &json!({ "name": "P", "type": "page", "route": "/p", "sections": [{ "$ref": "a#b" }] }),
            "p.view.yaml",
        )
        .unwrap();
        let out = walk_page(&page, &mut Stub);
        let w = out.sections[0].as_widget().expect("widget");
        assert_eq!(w.widget_type, "empty-state");
        assert_eq!(w.props.get("message"), Some(&json!("a#b")));
        assert_eq!(page.sections[0].kind(), NodeKind::Ref);
    }

    #[test]
    fn test_walk_reaches_branches_and_loop_templates() {
        let page = parse_page(
            &json!({
                "name": "P",
                "type": "page",
                "route": "/p",
                "sections": [
                    { "type": "badge", "source": "a", "show": "flag" },
                    { "each": "rows", "template": { "type": "progress", "source": "item.pct" } },
                    { "fragment": [{ "type": "skeleton" }] }
                ]
            }),
            "p.view.yaml",
        )
        .unwrap();

        let mut recorder = Recorder::default();
        walk_page(&page, &mut recorder);
        assert_eq!(
            recorder.seen,
            vec![
                "widget:badge",
                "conditional:flag",
                "widget:progress",
                "widget:skeleton",
                "page:P",
            ]
        );
    }

    #[test]
    fn test_walk_visits_otherwise_branch() {
        let mut page = sample_page();
        let mut badge = WidgetNode::new("badge", SourceLocation::default());
        badge.props.insert("source".to_string(), json!("x"));
        page.sections = vec![Node::Conditional(ConditionalNode {
            condition: "ok".to_string(),
            then: vec![],
            otherwise: Some(vec![Node::Widget(badge)]),
            loc: SourceLocation::default(),
            meta: Default::default(),
        })];

        assert_eq!(collect_widgets(&page).len(), 1);
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // COLLECTION
    // ═══════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_collect_widgets_in_document_order() {
        let widgets = collect_nodes(&sample_page(), NodeKind::Widget);
        let types: Vec<&str> = widgets
            .iter()
            .filter_map(Node::as_widget)
            .map(|w| w.widget_type.as_str())
            .collect();
        assert_eq!(types, vec!["badge", "avatar", "hero"]);
    }

    #[test]
    fn test_collect_sections_outer_before_inner() {
        let sections = collect_nodes(&sample_page(), NodeKind::Section);
        let names: Vec<&str> = sections
            .iter()
            .filter_map(Node::as_section)
            .filter_map(|s| s.name.as_deref())
            .collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_collect_nested_conditionals_in_document_order() {
        let page = parse_page(
            &json!({
                "name": "P",
                "type": "page",
                "route": "/p",
                "sections": [
                    {
                        "name": "Outer",
                        "show": "first",
                        "widgets": [{ "type": "badge", "source": "a", "show": "second" }]
                    },
                    { "type": "badge", "source": "b", "hide": "third" }
                ]
            }),
            "p.view.yaml",
        )
        .unwrap();

        let conditions: Vec<String> = collect_nodes(&page, NodeKind::Conditional)
            .into_iter()
            .filter_map(|node| match node {
                Node::Conditional(c) => Some(c.condition),
                _ => None,
            })
            .collect();
        assert_eq!(conditions, vec!["first", "second", "!third"]);
    }

    #[test]
    fn test_collect_never_returns_page() {
        assert!(collect_nodes(&sample_page(), NodeKind::Page).is_empty());
        assert!(collect_nodes(&sample_page(), NodeKind::Loop).is_empty());
    }
}
