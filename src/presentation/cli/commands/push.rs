use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::application::use_cases::sync_repositories::SyncOperation;
use crate::domain::value_objects::branch_selection::BranchSelection;
use crate::presentation::cli::commands::context::{
    report_exit_code, CommandContext, SettingsOverrides,
};
use crate::presentation::cli::OutputFormat;
use crate::presentation::ui::report::ReportPrinter;

/// Handler for the push command
pub struct PushCommand {
    pub root: PathBuf,
    pub config: Option<PathBuf>,
    pub overrides: SettingsOverrides,
    pub branches: BranchSelection,
    pub dry_run: bool,
    pub output: OutputFormat,
    pub use_color: bool,
}

impl PushCommand {
    pub fn new(
        root: &Path,
        config: Option<&Path>,
        overrides: SettingsOverrides,
        branches: BranchSelection,
        dry_run: bool,
        output: OutputFormat,
        use_color: bool,
    ) -> Self {
        Self {
            root: root.to_path_buf(),
            config: config.map(Path::to_path_buf),
            overrides,
            branches,
            dry_run,
            output,
            use_color,
        }
    }

    pub fn execute(&self) -> Result<i32> {
        let context = CommandContext::prepare(&self.root, self.config.as_deref(), &self.overrides)?;
        let printer = ReportPrinter::new(self.use_color);

        if self.output == OutputFormat::Text {
            let verb = if self.dry_run { "Dry run: pushing" } else { "Pushing" };
            printer.info(&format!(
                "{} {} branches of {} repositories to '{}'",
                verb,
                self.branches,
                context.catalog().len(),
                context.settings().remote
            ));
        }

        let operation = SyncOperation::Push(self.branches.clone());
        let report = context.sync(&operation, self.dry_run);
        printer.print_report(&report, self.output)?;

        Ok(report_exit_code(&report))
    }
}
