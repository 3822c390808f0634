use serde::{Deserialize, Serialize};
use std::fmt;

use crate::nodes::SourceLocation;

// ═══════════════════════════════════════════════════════════════════════════════
// DIAGNOSTIC CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const UNKNOWN_WIDGET_TYPE: &str = "unknown-widget-type";
pub const MISSING_REQUIRED_PROP: &str = "missing-required-prop";
pub const UNKNOWN_REF_TARGET: &str = "unknown-ref-target";
pub const UNKNOWN_REF_SECTION: &str = "unknown-ref-section";
pub const ACCESSIBILITY_WARNING: &str = "accessibility-warning";
pub const MISSING_LOADER_FOR_BINDING: &str = "missing-loader-for-binding";
pub const CIRCULAR_REF: &str = "circular-ref";
pub const UNKNOWN_PARTIAL: &str = "unknown-partial";
pub const PAGE_MISSING_NAME: &str = "page-missing-name";
pub const PAGE_MISSING_ROUTE: &str = "page-missing-route";
pub const EMPTY_SECTIONS: &str = "empty-sections";
pub const UNRESOLVED_REF: &str = "unresolved-ref";
pub const UNRESOLVED_PARTIAL: &str = "unresolved-partial";

/// One-line explanation of a code, for tooling that lists rules.
pub fn describe(code: &str) -> &'static str {
    match code {
        UNKNOWN_WIDGET_TYPE => "Widget type is not registered.",
        MISSING_REQUIRED_PROP => "A prop the widget schema marks required is absent.",
        UNKNOWN_REF_TARGET => "The page named by a $ref does not exist.",
        UNKNOWN_REF_SECTION => "The target page has no section with the referenced name.",
        ACCESSIBILITY_WARNING => "Widget lacks alternative text or an accessible label.",
        MISSING_LOADER_FOR_BINDING => {
            "Widget binds to data but the page declares no loader to provide it."
        }
        CIRCULAR_REF => "A $ref or $partial chain refers back to itself.",
        UNKNOWN_PARTIAL => "The partial named by a $partial is not registered.",
        PAGE_MISSING_NAME => "Page has no name.",
        PAGE_MISSING_ROUTE => "Page has no route.",
        EMPTY_SECTIONS => "Page has no sections.",
        UNRESOLVED_REF => "A $ref survived to validation; the resolver did not run.",
        UNRESOLVED_PARTIAL => "A $partial survived to validation; the resolver did not run.",
        _ => "Unknown diagnostic.",
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DIAGNOSTIC
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: String,
    pub message: String,
    pub file: String,
    pub line: u32,
    pub col: u32,
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        code: &str,
        message: impl Into<String>,
        loc: &SourceLocation,
    ) -> Self {
        Diagnostic {
            severity,
            code: code.to_string(),
            message: message.into(),
            file: loc.file.clone(),
            line: loc.line,
            col: loc.col,
        }
    }

    pub fn error(code: &str, message: impl Into<String>, loc: &SourceLocation) -> Self {
        Self::new(Severity::Error, code, message, loc)
    }

    pub fn warning(code: &str, message: impl Into<String>, loc: &SourceLocation) -> Self {
        Self::new(Severity::Warning, code, message, loc)
    }

    pub fn info(code: &str, message: impl Into<String>, loc: &SourceLocation) -> Self {
        Self::new(Severity::Info, code, message, loc)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}[{}]: {}",
            self.file, self.line, self.col, self.severity, self.code, self.message
        )
    }
}

/// True if any diagnostic should fail the build.
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}
