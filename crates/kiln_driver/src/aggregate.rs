//! Merging fresh and cached diagnostics into one build outcome.

use std::collections::HashSet;

use kiln_diagnostics::Diagnostic;

use crate::report::{BuildOutcome, Status};

/// Accumulates the diagnostics and per-file results of one build.
///
/// Feed it the files compiled this run in work-list order, then the cached
/// diagnostics of unchanged files in manifest order. Diagnostics are
/// deduplicated by full equality; the first occurrence wins.
#[derive(Debug)]
pub struct DiagnosticsAggregator {
    all_warnings: bool,
    seen: HashSet<Diagnostic>,
    diagnostics: Vec<Diagnostic>,
    compiled: usize,
    failed: usize,
    removed: usize,
}

impl DiagnosticsAggregator {
    /// Creates an aggregator. With `all_warnings`, cached diagnostics of
    /// unchanged files are part of the outcome.
    pub fn new(all_warnings: bool) -> Self {
        Self {
            all_warnings,
            seen: HashSet::new(),
            diagnostics: Vec::new(),
            compiled: 0,
            failed: 0,
            removed: 0,
        }
    }

    /// Records a file that produced an artifact.
    pub fn compiled(&mut self, diagnostics: &[Diagnostic]) {
        self.compiled += 1;
        self.extend(diagnostics);
    }

    /// Records a file that failed to produce an artifact.
    pub fn failed(&mut self, diagnostics: &[Diagnostic]) {
        self.failed += 1;
        self.extend(diagnostics);
    }

    /// Records a removed artifact or manifest entry.
    pub fn removed(&mut self) {
        self.removed += 1;
    }

    /// Adds the cached diagnostics of an unchanged file.
    ///
    /// Ignored unless the aggregator was created with `all_warnings`.
    pub fn cached(&mut self, diagnostics: &[Diagnostic]) {
        if self.all_warnings {
            self.extend(diagnostics);
        }
    }

    fn extend(&mut self, diagnostics: &[Diagnostic]) {
        for diagnostic in diagnostics {
            if self.seen.insert(diagnostic.clone()) {
                self.diagnostics.push(diagnostic.clone());
            }
        }
    }

    /// Computes the status and returns the outcome.
    pub fn finish(self) -> BuildOutcome {
        let status = if self.failed > 0 || self.diagnostics.iter().any(Diagnostic::is_error) {
            Status::Error
        } else if self.compiled > 0 || self.removed > 0 {
            Status::Ok
        } else {
            Status::Noop
        };
        BuildOutcome {
            status,
            diagnostics: self.diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_diagnostics::Position;

    fn warning(file: &str, msg: &str) -> Diagnostic {
        Diagnostic::warning("klc", file, msg, Position::line(1))
    }

    #[test]
    fn empty_is_noop() {
        let outcome = DiagnosticsAggregator::new(false).finish();
        assert_eq!(outcome.status, Status::Noop);
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn compiled_with_warning_is_ok() {
        let mut agg = DiagnosticsAggregator::new(false);
        agg.compiled(&[warning("a.kl", "unused")]);
        let outcome = agg.finish();
        assert_eq!(outcome.status, Status::Ok);
        assert_eq!(outcome.diagnostics.len(), 1);
    }

    #[test]
    fn removal_alone_is_ok() {
        let mut agg = DiagnosticsAggregator::new(false);
        agg.removed();
        assert_eq!(agg.finish().status, Status::Ok);
    }

    #[test]
    fn failure_without_error_diagnostic_is_error() {
        let mut agg = DiagnosticsAggregator::new(false);
        agg.compiled(&[]);
        agg.failed(&[warning("b.kl", "promoted")]);
        assert_eq!(agg.finish().status, Status::Error);
    }

    #[test]
    fn cached_only_with_all_warnings() {
        let mut plain = DiagnosticsAggregator::new(false);
        plain.compiled(&[]);
        plain.cached(&[warning("old.kl", "stale warning")]);
        assert!(plain.finish().diagnostics.is_empty());

        let mut all = DiagnosticsAggregator::new(true);
        all.compiled(&[warning("new.kl", "fresh")]);
        all.cached(&[warning("old.kl", "stale warning")]);
        let messages: Vec<_> = all
            .finish()
            .diagnostics
            .into_iter()
            .map(|d| d.message)
            .collect();
        assert_eq!(messages, vec!["fresh", "stale warning"]);
    }

    #[test]
    fn duplicates_keep_first_occurrence() {
        let mut agg = DiagnosticsAggregator::new(true);
        agg.compiled(&[warning("a.kl", "x"), warning("a.kl", "y"), warning("a.kl", "x")]);
        agg.cached(&[warning("a.kl", "y")]);
        let messages: Vec<_> = agg
            .finish()
            .diagnostics
            .into_iter()
            .map(|d| d.message)
            .collect();
        assert_eq!(messages, vec!["x", "y"]);
    }
}
