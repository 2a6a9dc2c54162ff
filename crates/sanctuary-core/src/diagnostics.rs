//! Diagnostic sink for non-fatal scene failures
//!
//! Nothing here is retried or propagated; failures are logged and kept so the
//! host can inspect what is missing from a partially populated scene.

use std::fmt;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    EnvironmentLoad,
    ModelLoad,
    Animation,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::EnvironmentLoad => write!(f, "environment load"),
            FailureKind::ModelLoad => write!(f, "model load"),
            FailureKind::Animation => write!(f, "animation"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneFailure {
    pub kind: FailureKind,
    /// Asset path the failure relates to
    pub path: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    failures: Vec<SceneFailure>,
}

impl Diagnostics {
    pub fn report(&mut self, kind: FailureKind, path: impl Into<String>, reason: impl fmt::Display) {
        let failure = SceneFailure {
            kind,
            path: path.into(),
            reason: reason.to_string(),
        };
        error!(kind = %failure.kind, path = %failure.path, reason = %failure.reason, "Scene failure");
        self.failures.push(failure);
    }

    pub fn failures(&self) -> &[SceneFailure] {
        &self.failures
    }

    pub fn has_failed(&self, kind: FailureKind) -> bool {
        self.failures.iter().any(|f| f.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_failures() {
        let mut diagnostics = Diagnostics::default();
        assert!(!diagnostics.has_failed(FailureKind::ModelLoad));

        diagnostics.report(FailureKind::ModelLoad, "digiDouble.glb", "404 Not Found");
        assert!(diagnostics.has_failed(FailureKind::ModelLoad));
        assert!(!diagnostics.has_failed(FailureKind::EnvironmentLoad));

        let failure = &diagnostics.failures()[0];
        assert_eq!(failure.path, "digiDouble.glb");
        assert_eq!(failure.reason, "404 Not Found");
        assert_eq!(failure.kind.to_string(), "model load");
    }
}
