#[cfg(test)]
mod tests {
    use crate::diagnostics::{
        CIRCULAR_REF, UNKNOWN_PARTIAL, UNKNOWN_REF_SECTION, UNKNOWN_REF_TARGET,
        UNKNOWN_WIDGET_TYPE,
    };
    use crate::nodes::{Node, NodeKind, PageNode};
    use crate::parse::parse_page;
    use crate::partial::PartialSet;
    use crate::registry::WidgetRegistry;
    use crate::resolve::{find_section, page_slug, resolve_all, resolve_all_sequential, PageIndex};
    use crate::visitor::collect_nodes;
    use serde_json::{json, Value};

    fn page(name: &str, sections: Value) -> PageNode {
        parse_page(
            &json!({
                "name": name,
                "type": "page",
                "route": format!("/{}", name),
                "sections": sections
            }),
            &format!("views/{}.view.yaml", name),
        )
        .unwrap()
    }

    fn stats_page() -> PageNode {
        page(
            "AdminDashboard",
            json!([{
                "name": "Stats",
                "widgets": [{ "type": "stat-card", "source": "metrics.users", "label": "Users" }]
            }]),
        )
    }

    fn partials(documents: Value) -> PartialSet {
        let mut set = PartialSet::new();
        let docs = documents.as_array().cloned().unwrap_or_default();
        assert!(set.load_documents(&docs, "partials.yaml").is_empty());
        set
    }

    fn codes(errors: &[crate::diagnostics::Diagnostic]) -> Vec<&str> {
        errors.iter().map(|d| d.code.as_str()).collect()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // REFS
    // ═══════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_ref_inlines_target_section() {
        let pages = vec![
            stats_page(),
            page("Overview", json!([{ "$ref": "admin-dashboard#Stats" }])),
        ];
        let result = resolve_all(&pages, &WidgetRegistry::new(), &PartialSet::new());

        assert!(result.errors.is_empty(), "{:?}", result.errors);
        let inlined = result.pages[1].sections[0].as_section().expect("section");
        assert_eq!(inlined.name.as_deref(), Some("Stats"));
        assert_eq!(inlined.children[0].kind(), NodeKind::Widget);
        assert!(collect_nodes(&result.pages[1], NodeKind::Ref).is_empty());
    }

    #[test]
    fn test_ref_accepts_page_name_handle() {
        let pages = vec![
            stats_page(),
            page("Overview", json!([{ "$ref": "AdminDashboard#Stats" }])),
        ];
        let result = resolve_all(&pages, &WidgetRegistry::new(), &PartialSet::new());
        assert!(!result.has_errors());
        assert_eq!(result.pages[1].sections[0].kind(), NodeKind::Section);
    }

    #[test]
    fn test_unknown_ref_target() {
        let pages = vec![page("Overview", json!([{ "$ref": "nowhere#Stats" }]))];
        let result = resolve_all(&pages, &WidgetRegistry::new(), &PartialSet::new());

        assert_eq!(codes(&result.errors), vec![UNKNOWN_REF_TARGET]);
        assert_eq!(result.errors[0].file, "views/Overview.view.yaml");
        assert_eq!(result.pages[0].sections[0].kind(), NodeKind::Ref);
    }

    #[test]
    fn test_unknown_ref_section() {
        let pages = vec![
            stats_page(),
            page("Overview", json!([{ "$ref": "admin-dashboard#Missing" }])),
        ];
        let result = resolve_all(&pages, &WidgetRegistry::new(), &PartialSet::new());
        assert_eq!(codes(&result.errors), vec![UNKNOWN_REF_SECTION]);
        assert_eq!(result.pages[1].sections[0].kind(), NodeKind::Ref);
    }

    #[test]
    fn test_ref_finds_section_under_conditional() {
        let pages = vec![
            page(
                "Source",
                json!([{
                    "name": "Promo",
                    "show": "user.trial",
                    "widgets": [{ "h2": "Upgrade" }]
                }]),
            ),
            page("Target", json!([{ "$ref": "source#Promo" }])),
        ];
        let result = resolve_all(&pages, &WidgetRegistry::new(), &PartialSet::new());
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        let Node::Conditional(guard) = &result.pages[1].sections[0] else {
            panic!("expected the guarded section to be inlined with its conditional");
        };
        assert_eq!(guard.condition, "user.trial");
        let inlined = guard.then[0].as_section().expect("section");
        assert_eq!(inlined.name.as_deref(), Some("Promo"));
    }

    #[test]
    fn test_ref_to_hidden_section_keeps_negated_guard() {
        let pages = vec![
            page(
                "B",
                json!([{
                    "name": "Header",
                    "widgets": [
                        { "name": "Admin", "hide": "user.guest", "widgets": [{ "type": "badge" }] }
                    ]
                }]),
            ),
            page("A", json!([{ "$ref": "B#Admin" }])),
        ];
        let result = resolve_all(&pages, &WidgetRegistry::new(), &PartialSet::new());
        let Node::Conditional(guard) = &result.pages[1].sections[0] else {
            panic!("expected conditional");
        };
        assert_eq!(guard.condition, "!user.guest");
        assert_eq!(guard.then[0].as_section().and_then(|s| s.name.as_deref()), Some("Admin"));
        assert!(guard.otherwise.is_none());
    }

    #[test]
    fn test_find_section_nested_under_guard_returns_section() {
        let p = page(
            "Nested",
            json!([{
                "name": "Outer",
                "show": "flags.beta",
                "widgets": [{ "name": "Inner", "widgets": [] }]
            }]),
        );
        let outer = find_section(&p.sections, "Outer").expect("outer");
        assert_eq!(outer.kind(), NodeKind::Conditional);
        let inner = find_section(&p.sections, "Inner").expect("inner");
        assert_eq!(inner.kind(), NodeKind::Section);
    }

    #[test]
    fn test_find_section_is_depth_first() {
        let p = page(
            "Nested",
            json!([
                {
                    "name": "Outer",
                    "widgets": [{ "name": "Inner", "widgets": [{ "h3": "deep" }] }]
                },
                { "name": "Inner", "widgets": [] }
            ]),
        );
        let found = find_section(&p.sections, "Inner").and_then(Node::as_section).expect("section");
        assert_eq!(found.children.len(), 1);
        assert!(find_section(&p.sections, "Nope").is_none());
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // CYCLES
    // ═══════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_mutual_refs_report_circular_ref() {
        let pages = vec![
            page("A", json!([{ "name": "S", "widgets": [{ "$ref": "b#T" }] }])),
            page("B", json!([{ "name": "T", "widgets": [{ "$ref": "a#S" }] }])),
        ];
        let result = resolve_all(&pages, &WidgetRegistry::new(), &PartialSet::new());
        assert_eq!(codes(&result.errors), vec![CIRCULAR_REF, CIRCULAR_REF]);
        assert_eq!(collect_nodes(&result.pages[0], NodeKind::Ref).len(), 1);
    }

    #[test]
    fn test_self_ref_terminates() {
        let pages = vec![page("A", json!([{ "name": "S", "widgets": [{ "$ref": "a#S" }] }]))];
        let result = resolve_all(&pages, &WidgetRegistry::new(), &PartialSet::new());
        assert_eq!(codes(&result.errors), vec![CIRCULAR_REF]);

        let outer = result.pages[0].sections[0].as_section().expect("section");
        let inner = outer.children[0].as_section().expect("inlined section");
        assert_eq!(inner.children[0].kind(), NodeKind::Ref);
    }

    #[test]
    fn test_repeated_refs_across_top_level_children_are_not_cycles() {
        let pages = vec![
            stats_page(),
            page(
                "Overview",
                json!([
                    { "$ref": "admin-dashboard#Stats" },
                    { "$ref": "admin-dashboard#Stats" }
                ]),
            ),
        ];
        let result = resolve_all(&pages, &WidgetRegistry::new(), &PartialSet::new());
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        assert_eq!(collect_nodes(&result.pages[1], NodeKind::Section).len(), 2);
    }

    #[test]
    fn test_sibling_refs_inside_one_section_are_not_cycles() {
        let pages = vec![
            stats_page(),
            page(
                "Overview",
                json!([{
                    "name": "Wrapper",
                    "widgets": [
                        { "$ref": "admin-dashboard#Stats" },
                        { "$ref": "admin-dashboard#Stats" }
                    ]
                }]),
            ),
        ];
        let result = resolve_all(&pages, &WidgetRegistry::new(), &PartialSet::new());
        assert!(result.errors.is_empty(), "{:?}", result.errors);
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PARTIALS
    // ═══════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_partial_expansion_substitutes_args() {
        let set = partials(json!([{
            "name": "StatCardFor",
            "params": [{ "name": "metric" }, { "name": "label" }],
            "template": { "type": "stat-card", "source": "$metric", "label": "$label" }
        }]));
        let pages = vec![page(
            "Home",
            json!([{ "$partial": "stat-card-for", "metric": "metrics.orders", "label": "Orders" }]),
        )];
        let result = resolve_all(&pages, &WidgetRegistry::new(), &set);

        assert!(result.errors.is_empty(), "{:?}", result.errors);
        let w = result.pages[0].sections[0].as_widget().expect("widget");
        assert_eq!(w.widget_type, "stat-card");
        assert_eq!(w.source.as_ref().map(|s| s.path.as_str()), Some("metrics.orders"));
        assert_eq!(w.props.get("label"), Some(&json!("Orders")));
    }

    #[test]
    fn test_unknown_partial() {
        let pages = vec![page("Home", json!([{ "$partial": "Ghost" }]))];
        let result = resolve_all(&pages, &WidgetRegistry::new(), &PartialSet::new());
        assert_eq!(codes(&result.errors), vec![UNKNOWN_PARTIAL]);
        assert_eq!(result.pages[0].sections[0].kind(), NodeKind::Partial);
    }

    #[test]
    fn test_self_recursive_partial_reports_circular_ref() {
        let set = partials(json!([{
            "name": "Forever",
            "template": { "name": "Again", "widgets": [{ "$partial": "Forever" }] }
        }]));
        let pages = vec![page("Home", json!([{ "$partial": "Forever" }]))];
        let result = resolve_all(&pages, &WidgetRegistry::new(), &set);
        assert_eq!(codes(&result.errors), vec![CIRCULAR_REF]);
    }

    #[test]
    fn test_partial_body_is_resolved() {
        let set = partials(json!([{
            "name": "StatsBlock",
            "template": {
                "name": "Block",
                "widgets": [{ "$ref": "admin-dashboard#Stats" }, { "type": "sparkle" }]
            }
        }]));
        let pages = vec![stats_page(), page("Home", json!([{ "$partial": "StatsBlock" }]))];
        let result = resolve_all(&pages, &WidgetRegistry::new(), &set);

        assert_eq!(codes(&result.errors), vec![UNKNOWN_WIDGET_TYPE]);
        let block = result.pages[1].sections[0].as_section().expect("section");
        assert_eq!(block.children[0].kind(), NodeKind::Section);
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // WIDGETS, ORDER, PURITY
    // ═══════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_unknown_widget_type_is_reported_and_kept() {
        let pages = vec![page(
            "Home",
            json!([{ "name": "Main", "widgets": [{ "type": "sparkle", "source": "x" }] }]),
        )];
        let result = resolve_all(&pages, &WidgetRegistry::new(), &PartialSet::new());
        assert_eq!(codes(&result.errors), vec![UNKNOWN_WIDGET_TYPE]);
        let section = result.pages[0].sections[0].as_section().expect("section");
        assert_eq!(
            section.children[0].as_widget().map(|w| w.widget_type.as_str()),
            Some("sparkle")
        );
    }

    #[test]
    fn test_input_pages_are_not_mutated() {
        let pages = vec![
            stats_page(),
            page("Overview", json!([{ "$ref": "admin-dashboard#Stats" }])),
        ];
        let before = pages.clone();
        let result = resolve_all(&pages, &WidgetRegistry::new(), &PartialSet::new());
        assert_eq!(pages, before);
        assert_ne!(result.pages[1], pages[1]);
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let pages: Vec<PageNode> = (0..16)
            .map(|i| {
                page(
                    &format!("Page{}", i),
                    json!([
                        { "$ref": "admin-dashboard#Stats" },
                        { "type": format!("mystery-{}", i) }
                    ]),
                )
            })
            .chain(std::iter::once(stats_page()))
            .collect();
        let registry = WidgetRegistry::new();
        let parallel = resolve_all(&pages, &registry, &PartialSet::new());
        let sequential = resolve_all_sequential(&pages, &registry, &PartialSet::new());

        assert_eq!(parallel.pages, sequential.pages);
        assert_eq!(parallel.errors, sequential.errors);
        assert_eq!(parallel.errors.len(), 16);
        assert!(parallel.errors[0].message.contains("mystery-0"));
        assert!(parallel.errors[15].message.contains("mystery-15"));
    }

    #[test]
    fn test_duplicate_slugs_keep_first_page() {
        let pages = vec![
            page("Admin Dashboard", json!([{ "name": "Stats", "widgets": [] }])),
            stats_page(),
        ];
        assert_eq!(page_slug(&pages[0]), page_slug(&pages[1]));
        let index = PageIndex::build(&pages);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("admin-dashboard").map(|p| p.name.as_str()), Some("Admin Dashboard"));
    }
}
