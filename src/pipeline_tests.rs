#[cfg(test)]
mod tests {
    use crate::diagnostics::{
        ACCESSIBILITY_WARNING, MISSING_LOADER_FOR_BINDING, UNKNOWN_REF_TARGET, UNKNOWN_WIDGET_TYPE,
    };
    use crate::error::{CompileFailure, ParseError};
    use crate::nodes::NodeKind;
    use crate::pipeline::{compile_views, CompileOptions, ViewDocument};
    use serde_json::json;

    fn admin_doc() -> ViewDocument {
        ViewDocument::new(
            "views/admin.view.yaml",
            json!({
                "name": "AdminDashboard",
                "type": "dashboard",
                "route": "/admin",
                "loader": { "source": "Metrics" },
                "sections": [{
                    "name": "Stats",
                    "widgets": [{
                        "type": "stat-card",
                        "source": "metrics.users",
                        "label": "Users"
                    }]
                }]
            }),
        )
    }

    fn overview_doc(sections: serde_json::Value) -> ViewDocument {
        ViewDocument::new(
            "views/overview.view.yaml",
            json!({
                "name": "Overview",
                "type": "page",
                "route": "/",
                "loader": { "source": "Metrics" },
                "sections": sections
            }),
        )
    }

    #[test]
    fn test_options_defaults() {
        let options: CompileOptions = serde_json::from_value(json!({})).unwrap();
        assert!(options.parallel);
        assert!(options.validate);
        assert!(options.widget_schemas.is_empty());
        assert!(options.partials.is_empty());

        let options: CompileOptions =
            serde_json::from_value(json!({ "parallel": false, "widgetSchemas": [{ "name": "x" }] }))
                .unwrap();
        assert!(!options.parallel);
        assert!(options.validate);
        assert_eq!(options.widget_schemas.len(), 1);
    }

    #[test]
    fn test_clean_build() {
        let docs = vec![
            admin_doc(),
            overview_doc(json!([{ "$ref": "admin-dashboard#Stats" }])),
        ];
        let result = compile_views(&docs, &CompileOptions::default());

        assert!(!result.has_errors(), "{:?}", result.diagnostics);
        assert!(result.diagnostics.is_empty());
        assert_eq!(result.pages.len(), 2);
        assert_eq!(result.pages[1].sections[0].kind(), NodeKind::Section);
    }

    #[test]
    fn test_parse_failure_drops_only_that_document() {
        let docs = vec![
            admin_doc(),
            ViewDocument::new("views/broken.view.yaml", json!({ "type": "page", "route": "/x" })),
        ];
        let result = compile_views(&docs, &CompileOptions::default());

        assert_eq!(result.pages.len(), 1);
        assert_eq!(result.failures.len(), 1);
        assert!(matches!(
            &result.failures[0],
            CompileFailure::Parse(ParseError::MissingField { field: "name", .. })
        ));
        assert!(result.has_errors());
        assert_eq!(result.errors().count(), 0);
    }

    #[test]
    fn test_resolver_errors_come_before_validator_diagnostics() {
        let docs = vec![overview_doc(json!([
            { "$ref": "nowhere#Stats" },
            { "type": "chat-input" },
            { "type": "sparkle" }
        ]))];
        let result = compile_views(&docs, &CompileOptions::default());

        let codes: Vec<&str> = result.diagnostics.iter().map(|d| d.code.as_str()).collect();
        assert_eq!(
            codes,
            vec![
                UNKNOWN_REF_TARGET,
                UNKNOWN_WIDGET_TYPE,
                "unresolved-ref",
                ACCESSIBILITY_WARNING,
                UNKNOWN_WIDGET_TYPE,
            ]
        );
        assert_eq!(result.errors().count(), 4);
        assert_eq!(result.warnings().count(), 0);
        assert_eq!(result.infos().count(), 1);
    }

    #[test]
    fn test_validate_can_be_disabled() {
        let docs = vec![overview_doc(json!([{ "type": "chat-input" }]))];
        let options = CompileOptions {
            validate: false,
            ..CompileOptions::default()
        };
        let result = compile_views(&docs, &options);
        assert!(result.diagnostics.is_empty());
        assert!(!result.has_errors());
    }

    #[test]
    fn test_options_supply_widgets_and_partials() {
        let options: CompileOptions = serde_json::from_value(json!({
            "widgetSchemas": [
                {
                    "name": "usage-heatmap",
                    "category": "data",
                    "props": { "source": { "type": "binding", "required": true } }
                },
                { "category": "nameless" }
            ],
            "partials": [{
                "name": "HeatmapFor",
                "params": [{ "name": "metric" }],
                "template": { "type": "usage-heatmap", "source": "$metric" }
            }]
        }))
        .unwrap();

        let docs = vec![overview_doc(json!([
            { "$partial": "HeatmapFor", "metric": "usage.hourly" }
        ]))];
        let result = compile_views(&docs, &options);

        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        assert_eq!(result.failures.len(), 1);
        assert!(matches!(result.failures[0], CompileFailure::Schema(_)));
        let w = result.pages[0].sections[0].as_widget().expect("widget");
        assert_eq!(w.widget_type, "usage-heatmap");
        assert_eq!(w.source.as_ref().map(|s| s.path.as_str()), Some("usage.hourly"));
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let docs: Vec<ViewDocument> = (0..10)
            .map(|i| {
                ViewDocument::new(
                    format!("views/p{}.view.yaml", i),
                    json!({
                        "name": format!("P{}", i),
                        "type": "page",
                        "route": format!("/p{}", i),
                        "sections": [{ "type": "badge", "source": "user.role" }]
                    }),
                )
            })
            .collect();
        let parallel = compile_views(&docs, &CompileOptions::default());
        let sequential = compile_views(
            &docs,
            &CompileOptions {
                parallel: false,
                ..CompileOptions::default()
            },
        );

        assert_eq!(parallel.pages, sequential.pages);
        assert_eq!(parallel.diagnostics, sequential.diagnostics);
        assert_eq!(parallel.warnings().count(), 10);
        assert!(parallel
            .diagnostics
            .iter()
            .all(|d| d.code == MISSING_LOADER_FOR_BINDING));
        assert_eq!(parallel.diagnostics[3].file, "views/p3.view.yaml");
    }
}
