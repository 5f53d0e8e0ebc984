//! Per-unit outcome accounting for batch runs.

use std::collections::BTreeMap;
use std::fmt;

use colored::*;
use tracing::{error, info};

use crate::errors::ReconcileError;
use crate::models::{Level, Provider};

/// Where a unit of work belongs in the level × provider matrix. Rows that
/// could not be parsed have no position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bucket {
    Unit(Level, Provider),
    Environments,
    Unparsed,
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bucket::Unit(level, provider) => write!(f, "{} {}", level, provider),
            Bucket::Environments => write!(f, "Repository environments"),
            Bucket::Unparsed => write!(f, "Unparsed rows"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub succeeded: usize,
    pub failed: usize,
}

#[derive(Debug)]
pub struct Failure {
    pub bucket: Bucket,
    pub subject: String,
    pub error: ReconcileError,
}

/// Collected results of one command.
#[derive(Debug, Default)]
pub struct Summary {
    tallies: BTreeMap<Bucket, Tally>,
    failures: Vec<Failure>,
}

impl Summary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one unit. Failures are logged as they happen.
    pub fn record(
        &mut self,
        bucket: Bucket,
        subject: impl Into<String>,
        outcome: Result<(), ReconcileError>,
    ) {
        let subject = subject.into();
        let tally = self.tallies.entry(bucket).or_default();
        match outcome {
            Ok(()) => {
                tally.succeeded += 1;
                info!(%bucket, subject = %subject, "done");
            }
            Err(err) => {
                tally.failed += 1;
                error!(%bucket, subject = %subject, error = %err, "failed");
                self.failures.push(Failure {
                    bucket,
                    subject,
                    error: err,
                });
            }
        }
    }

    pub fn tally(&self, bucket: Bucket) -> Tally {
        self.tallies.get(&bucket).copied().unwrap_or_default()
    }

    pub fn succeeded(&self) -> usize {
        self.tallies.values().map(|t| t.succeeded).sum()
    }

    pub fn failed(&self) -> usize {
        self.tallies.values().map(|t| t.failed).sum()
    }

    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Print the per-bucket table and every failure to stdout.
    pub fn print(&self) {
        for (bucket, tally) in &self.tallies {
            let failed = if tally.failed > 0 {
                tally.failed.to_string().red()
            } else {
                tally.failed.to_string().normal()
            };
            println!(
                "  {:<28} {} succeeded, {} failed",
                bucket.to_string(),
                tally.succeeded.to_string().green(),
                failed
            );
        }
        for failure in &self.failures {
            println!(
                "  {} {} ({}): {}",
                "✗".red(),
                failure.subject,
                failure.bucket,
                failure.error
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SchemaError;

    #[test]
    fn test_summary_counts_per_bucket() {
        let mut summary = Summary::new();
        let org_actions = Bucket::Unit(Level::Organization, Provider::Actions);
        summary.record(org_actions, "A", Ok(()));
        summary.record(org_actions, "B", Ok(()));
        summary.record(
            org_actions,
            "C",
            Err(SchemaError::NoSelectedRepositories("C".to_string()).into()),
        );
        summary.record(
            Bucket::Unparsed,
            "line 4",
            Err(SchemaError::MissingRepository("D".to_string()).into()),
        );

        assert_eq!(summary.tally(org_actions), Tally { succeeded: 2, failed: 1 });
        assert_eq!(summary.succeeded(), 2);
        assert_eq!(summary.failed(), 2);
        assert!(!summary.is_success());
        assert_eq!(summary.failures()[0].subject, "C");
    }
}
