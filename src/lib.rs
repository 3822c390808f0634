//! # View Compiler Core
//!
//! Compiles declarative view documents (already-loaded map/list/scalar trees)
//! into a resolved, validated page AST.
//!
//! ## Passes
//!
//! 1. **Parse**: `parse_page` turns one raw document into a [`PageNode`],
//!    expanding shorthands and wrapping `show`/`hide` in conditionals.
//!    Only a document missing `name`, `type` or `route` fails.
//! 2. **Resolve**: `resolve_all` indexes every page by slug, inlines `$ref`
//!    sections, expands `$partial` templates and checks widget types.
//!    Problems become diagnostics; resolution never aborts.
//! 3. **Validate**: `validate_page` is read-only and reports structural,
//!    schema, accessibility and data-binding diagnostics.
//!
//! ## Invariants
//!
//! - Every pass returns new trees. Inputs are never mutated.
//! - Diagnostic codes are stable strings (see [`diagnostics`]).
//! - Output order is document order, whether passes run on the rayon pool or not.
//! - The registry and partial set are read-only once loaded, so pages resolve
//!   and validate independently.

#[cfg(feature = "napi")]
use napi_derive::napi;

pub mod diagnostics;
pub mod error;
pub mod nodes;
pub mod parse;
pub mod partial;
pub mod pipeline;
pub mod registry;
pub mod resolve;
pub mod validate;
pub mod visitor;

#[cfg(test)]
mod pipeline_tests;
#[cfg(test)]
mod resolve_tests;
#[cfg(test)]
mod visitor_tests;

pub use diagnostics::{has_errors, Diagnostic, Severity};
pub use error::{CompileFailure, ParseError, SchemaError};
pub use nodes::{Node, NodeKind, PageNode, SourceLocation};
pub use parse::{parse_child, parse_page};
pub use partial::{PartialDef, PartialSet};
pub use pipeline::{compile_views, CompileOptions, CompileResult, ViewDocument};
pub use registry::{WidgetProp, WidgetRegistry, WidgetSchema, WidgetSlot};
pub use resolve::{page_slug, resolve_all, Resolution};
pub use validate::{validate_page, validate_pages};
pub use visitor::{collect_nodes, collect_widgets, walk_page, PageVisitor};

// ═══════════════════════════════════════════════════════════════════════════════
// NAPI BRIDGE
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(feature = "napi")]
fn compile_views_json(
    documents_json: &str,
    options_json: &str,
) -> Result<serde_json::Value, error::BridgeError> {
    use error::BridgeError;

    let documents: Vec<ViewDocument> =
        serde_json::from_str(documents_json).map_err(|source| BridgeError::Json {
            what: "documents",
            source,
        })?;
    let options: CompileOptions = if options_json.trim().is_empty() {
        CompileOptions::default()
    } else {
        serde_json::from_str(options_json).map_err(|source| BridgeError::Json {
            what: "options",
            source,
        })?
    };

    let result = compile_views(&documents, &options);
    let failures: Vec<String> = result.failures.iter().map(|f| f.to_string()).collect();
    Ok(serde_json::json!({
        "pages": result.pages,
        "diagnostics": result.diagnostics,
        "failures": failures,
        "hasErrors": result.has_errors(),
    }))
}

/// JSON in, JSON out: `documents_json` is `[{ file, content }]`,
/// `options_json` a (possibly empty) `CompileOptions` object.
#[cfg(feature = "napi")]
#[napi]
pub fn compile_views_native(
    documents_json: String,
    options_json: String,
) -> napi::Result<serde_json::Value> {
    compile_views_json(&documents_json, &options_json)
        .map_err(|e| napi::Error::from_reason(e.to_string()))
}

#[cfg(feature = "napi")]
#[napi]
pub fn widget_names_native() -> Vec<String> {
    WidgetRegistry::new()
        .names()
        .into_iter()
        .map(str::to_string)
        .collect()
}
