//! Classification of `cargo clean` failure output.

use regex::Regex;
use std::sync::LazyLock;

/// Known failure signatures, most specific first.
///
/// Each entry maps a pattern to the cause reported when it is the first
/// match. Patterns match within a single line. Any match means the failure stems from workspace or manifest
/// breakage and the artifacts can be removed directly.
const SIGNATURES: &[(&str, &str)] = &[
    (
        r"dependency.*was not found in.*workspace\.dependencies",
        "missing workspace dependency",
    ),
    (
        r"error inheriting.*from workspace root manifest",
        "workspace inheritance error",
    ),
    (r"failed to read.*Cargo\.toml", "missing dependency file"),
    (r"No such file or directory.*Cargo\.toml", "missing dependency file"),
    (
        r"failed to load manifest for dependency",
        "missing dependency manifest",
    ),
    (
        r"failed to load manifest for workspace member",
        "workspace member manifest issue",
    ),
    (
        r"manifest is missing either a.*package.*or a.*workspace",
        "malformed manifest",
    ),
    (r"failed to parse manifest", "manifest parsing error"),
    (r"workspace\.dependencies", "workspace dependency issue"),
];

static TABLE: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    SIGNATURES
        .iter()
        .filter_map(|(pattern, cause)| match Regex::new(pattern) {
            Ok(re) => Some((re, *cause)),
            Err(e) => {
                tracing::error!(pattern, error = %e, "Invalid failure signature");
                None
            }
        })
        .collect()
});

/// Verdict on a failed clean invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Workspace or manifest breakage; artifacts may be removed directly.
    WorkspaceIssue { cause: &'static str },
    /// Anything else.
    Genuine,
}

impl FailureKind {
    pub fn is_workspace_issue(self) -> bool {
        matches!(self, FailureKind::WorkspaceIssue { .. })
    }
}

/// Classify the diagnostic text of a failed invocation.
pub fn classify_failure(diagnostics: &str) -> FailureKind {
    TABLE
        .iter()
        .find(|(re, _)| re.is_match(diagnostics))
        .map(|(_, cause)| FailureKind::WorkspaceIssue { cause: *cause })
        .unwrap_or(FailureKind::Genuine)
}
