//! Pipeline Driver
//!
//! Parse → resolve → validate over a batch of view documents, with the
//! registry and partials built from [`CompileOptions`].

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::diagnostics::{Diagnostic, Severity};
use crate::error::{CompileFailure, ParseError};
use crate::nodes::PageNode;
use crate::parse::parse_page;
use crate::partial::PartialSet;
use crate::registry::WidgetRegistry;
use crate::resolve::{resolve_all, resolve_all_sequential};
use crate::validate::{validate_pages, validate_pages_sequential};

/// Location reported for problems inside option-supplied partials.
const PARTIALS_FILE: &str = "<partials>";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompileOptions {
    /// External widget schema documents, registered after the built-ins in order.
    pub widget_schemas: Vec<Value>,
    pub partials: Vec<Value>,
    pub parallel: bool,
    pub validate: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            widget_schemas: Vec::new(),
            partials: Vec::new(),
            parallel: true,
            validate: true,
        }
    }
}

/// One raw view document and the file it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewDocument {
    pub file: String,
    pub content: Value,
}

impl ViewDocument {
    pub fn new(file: impl Into<String>, content: Value) -> Self {
        Self {
            file: file.into(),
            content,
        }
    }
}

#[derive(Debug, Default)]
pub struct CompileResult {
    /// Resolved pages in document order. Documents that failed to parse are absent.
    pub pages: Vec<PageNode>,
    /// Resolver errors first, then validator diagnostics.
    pub diagnostics: Vec<Diagnostic>,
    pub failures: Vec<CompileFailure>,
}

impl CompileResult {
    pub fn has_errors(&self) -> bool {
        !self.failures.is_empty() || self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.with_severity(Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.with_severity(Severity::Warning)
    }

    pub fn infos(&self) -> impl Iterator<Item = &Diagnostic> {
        self.with_severity(Severity::Info)
    }

    fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |d| d.severity == severity)
    }
}

fn build_registry(options: &CompileOptions, failures: &mut Vec<CompileFailure>) -> WidgetRegistry {
    let mut registry = WidgetRegistry::new();
    failures.extend(
        registry
            .load_documents(&options.widget_schemas)
            .into_iter()
            .map(CompileFailure::from),
    );
    registry
}

fn build_partials(options: &CompileOptions, failures: &mut Vec<CompileFailure>) -> PartialSet {
    let mut partials = PartialSet::new();
    failures.extend(
        partials
            .load_documents(&options.partials, PARTIALS_FILE)
            .into_iter()
            .map(CompileFailure::from),
    );
    partials
}

fn parse_documents(
    documents: &[ViewDocument],
    parallel: bool,
) -> Vec<Result<PageNode, ParseError>> {
    let parse = |doc: &ViewDocument| parse_page(&doc.content, &doc.file);
    if parallel {
        documents.par_iter().map(parse).collect()
    } else {
        documents.iter().map(parse).collect()
    }
}

pub fn compile_views(documents: &[ViewDocument], options: &CompileOptions) -> CompileResult {
    let mut failures = Vec::new();
    let registry = build_registry(options, &mut failures);
    let partials = build_partials(options, &mut failures);

    let mut pages = Vec::with_capacity(documents.len());
    for parsed in parse_documents(documents, options.parallel) {
        match parsed {
            Ok(page) => pages.push(page),
            Err(e) => {
                tracing::warn!(file = e.file(), error = %e, "dropping view document");
                failures.push(CompileFailure::from(e));
            }
        }
    }

    let resolution = if options.parallel {
        resolve_all(&pages, &registry, &partials)
    } else {
        resolve_all_sequential(&pages, &registry, &partials)
    };

    let mut diagnostics = resolution.errors;
    if options.validate {
        let validated = if options.parallel {
            validate_pages(&resolution.pages, &registry)
        } else {
            validate_pages_sequential(&resolution.pages, &registry)
        };
        diagnostics.extend(validated);
    }

    tracing::debug!(
        documents = documents.len(),
        pages = resolution.pages.len(),
        diagnostics = diagnostics.len(),
        failures = failures.len(),
        "compiled views"
    );

    CompileResult {
        pages: resolution.pages,
        diagnostics,
        failures,
    }
}
