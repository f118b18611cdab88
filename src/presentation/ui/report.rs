use anyhow::Result;
use colored::{ColoredString, Colorize};
use serde::Serialize;
use std::fmt::Write as _;

use crate::domain::entities::outcome::{
    OperationStatus, SkipReason, SuccessDetail, SyncReport, TransferStats,
};
use crate::presentation::ui::listing::CatalogListing;
use crate::presentation::cli::OutputFormat;

/// Renders reports and listings for the terminal
#[derive(Debug, Clone, Copy)]
pub struct ReportPrinter {
    pub use_color: bool,
}

impl ReportPrinter {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.use_color {
            println!("{} {}", "::".blue().bold(), message);
        } else {
            println!("[INFO] {}", message);
        }
    }

    pub fn print_report(&self, report: &SyncReport, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Text => print!("{}", self.render_report(report)),
            _ => print!("{}", Self::serialize(report, format)?),
        }
        Ok(())
    }

    pub fn print_listing(&self, listing: &CatalogListing, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Text => print!("{}", self.render_listing(listing)),
            _ => print!("{}", Self::serialize(listing, format)?),
        }
        Ok(())
    }

    /// JSON or YAML rendering, newline terminated
    ///
    /// YAML goes through a JSON value: serde_yaml cannot emit the nested
    /// enum variants of `OperationStatus` directly.
    pub fn serialize<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
        Ok(match format {
            OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml | OutputFormat::Text => {
                serde_yaml::to_string(&serde_json::to_value(value)?)?
            }
        })
    }

    pub fn render_report(&self, report: &SyncReport) -> String {
        let mut out = String::new();

        for outcome in &report.outcomes {
            let (mark, detail) = match &outcome.status {
                OperationStatus::Success(SuccessDetail::Fetched(stats)) => {
                    (self.ok_mark(), describe_fetch(stats))
                }
                OperationStatus::Success(SuccessDetail::Pushed { refspecs }) => {
                    (self.ok_mark(), format!("pushed {}", refspecs.join(" ")))
                }
                OperationStatus::Skipped(SkipReason::DryRun { refspecs }) => {
                    (self.note_mark(), format!("would push {}", refspecs.join(" ")))
                }
                OperationStatus::Skipped(reason) if reason.counts_as_problem() => {
                    (self.warn_mark(), format!("skipped: {}", reason))
                }
                OperationStatus::Skipped(reason) => (self.note_mark(), format!("skipped: {}", reason)),
                OperationStatus::Failed(failure) => {
                    (self.fail_mark(), self.paint_error(&format!("failed: {}", failure)))
                }
            };
            let _ = writeln!(out, "{} {}: {}", mark, self.paint_name(&outcome.repository), detail);
        }

        for failure in &report.open_failures {
            let _ = writeln!(
                out,
                "{} {}: {}",
                self.fail_mark(),
                self.paint_name(&failure.name),
                self.paint_error(&format!("could not open: {}", failure.message))
            );
        }

        let _ = write!(
            out,
            "\n{}: {} succeeded, {} skipped, {} failed",
            report.operation,
            report.success_count(),
            report.skipped_count(),
            report.failed_count()
        );
        if !report.open_failures.is_empty() {
            let _ = write!(out, ", {} could not be opened", report.open_failures.len());
        }
        if report.stopped_early {
            let _ = write!(out, " (stopped after first failure)");
        }
        out.push('\n');
        out
    }

    pub fn render_listing(&self, listing: &CatalogListing) -> String {
        let mut out = String::new();

        for repository in &listing.repositories {
            let url = repository
                .remote_url
                .clone()
                .unwrap_or_else(|| format!("(no remote '{}')", listing.remote));
            let branches = if repository.branches.is_empty() {
                "-".to_string()
            } else {
                repository.branches.join(", ")
            };
            let mark = if repository.problem.is_some() {
                self.warn_mark()
            } else {
                self.ok_mark()
            };
            let _ = writeln!(
                out,
                "{} {}  {}  [{}]",
                mark,
                self.paint_name(&repository.name),
                url,
                branches
            );
        }

        for failure in &listing.open_failures {
            let _ = writeln!(
                out,
                "{} {}: {}",
                self.fail_mark(),
                self.paint_name(&failure.name),
                self.paint_error(&format!("could not open: {}", failure.message))
            );
        }

        let _ = writeln!(
            out,
            "\n{} repositories under {}",
            listing.repositories.len(),
            listing.root.display()
        );
        out
    }

    fn ok_mark(&self) -> ColoredString {
        self.mark("✓", "[OK]", |s| s.green().bold())
    }

    fn warn_mark(&self) -> ColoredString {
        self.mark("⚠", "[WARN]", |s| s.yellow().bold())
    }

    fn fail_mark(&self) -> ColoredString {
        self.mark("✗", "[FAIL]", |s| s.red().bold())
    }

    fn note_mark(&self) -> ColoredString {
        self.mark("-", "[SKIP]", |s| s.dimmed())
    }

    fn mark(
        &self,
        symbol: &'static str,
        plain: &'static str,
        style: fn(&str) -> ColoredString,
    ) -> ColoredString {
        if self.use_color {
            style(symbol)
        } else {
            plain.normal()
        }
    }

    fn paint_name(&self, name: &str) -> ColoredString {
        if self.use_color {
            name.bold()
        } else {
            name.normal()
        }
    }

    fn paint_error(&self, message: &str) -> String {
        if self.use_color {
            message.red().to_string()
        } else {
            message.to_string()
        }
    }
}

fn describe_fetch(stats: &TransferStats) -> String {
    if stats.is_up_to_date() {
        "up to date".to_string()
    } else {
        format!(
            "fetched {} objects ({} bytes)",
            stats.received_objects, stats.received_bytes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::outcome::{
        Failure, FailureKind, OpenFailure, OperationKind, OperationOutcome,
    };
    use std::path::PathBuf;

    fn sample_report() -> SyncReport {
        let mut report = SyncReport::new(OperationKind::Push).with_open_failures(vec![OpenFailure {
            name: "C".to_string(),
            path: PathBuf::from("/work/C"),
            message: "no repository metadata at /work/C/.git".to_string(),
        }]);
        report.record(OperationOutcome::new(
            "A",
            "/work/A",
            OperationKind::Push,
            OperationStatus::Success(SuccessDetail::Pushed {
                refspecs: vec!["refs/heads/main".to_string()],
            }),
        ));
        report.record(OperationOutcome::new(
            "B",
            "/work/B",
            OperationKind::Push,
            OperationStatus::Skipped(SkipReason::NoSuchRemote {
                remote: "origin".to_string(),
            }),
        ));
        report.record(OperationOutcome::new(
            "D",
            "/work/D",
            OperationKind::Push,
            OperationStatus::Failed(Failure::new(FailureKind::PushRejected, "non-fast-forward")),
        ));
        report.finish();
        report
    }

    #[test]
    fn test_render_text_without_color() {
        let text = ReportPrinter::new(false).render_report(&sample_report());

        assert!(text.contains("[OK] A: pushed refs/heads/main"));
        assert!(text.contains("[WARN] B: skipped: no remote named 'origin'"));
        assert!(text.contains("[FAIL] D: failed: non-fast-forward"));
        assert!(text.contains("[FAIL] C: could not open:"));
        assert!(text.contains("push: 1 succeeded, 1 skipped, 1 failed, 1 could not be opened"));
    }

    #[test]
    fn test_render_dry_run_and_up_to_date() {
        let mut report = SyncReport::new(OperationKind::Fetch);
        report.record(OperationOutcome::new(
            "A",
            "/work/A",
            OperationKind::Fetch,
            OperationStatus::Success(SuccessDetail::Fetched(TransferStats::default())),
        ));
        report.record(OperationOutcome::new(
            "B",
            "/work/B",
            OperationKind::Fetch,
            OperationStatus::Skipped(SkipReason::DryRun {
                refspecs: vec!["refs/heads/main".to_string(), "refs/heads/dev".to_string()],
            }),
        ));

        let text = ReportPrinter::new(false).render_report(&report);
        assert!(text.contains("[OK] A: up to date"));
        assert!(text.contains("[SKIP] B: would push refs/heads/main refs/heads/dev"));
    }

    #[test]
    fn test_serialize_json_and_yaml() {
        let report = sample_report();

        let json = ReportPrinter::serialize(&report, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["operation"], "push");
        assert_eq!(value["outcomes"].as_array().unwrap().len(), 3);
        assert_eq!(value["outcomes"][1]["status"]["skipped"]["no_such_remote"]["remote"], "origin");
        assert_eq!(value["open_failures"][0]["name"], "C");

        let yaml = ReportPrinter::serialize(&report, OutputFormat::Yaml).unwrap();
        assert!(yaml.contains("operation: push"));
        let parsed: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(
            parsed["outcomes"][1]["status"]["skipped"]["no_such_remote"]["remote"],
            serde_yaml::Value::from("origin")
        );
    }
}
