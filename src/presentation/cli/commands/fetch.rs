use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::application::use_cases::sync_repositories::SyncOperation;
use crate::presentation::cli::commands::context::{
    report_exit_code, CommandContext, SettingsOverrides,
};
use crate::presentation::cli::OutputFormat;
use crate::presentation::ui::report::ReportPrinter;

/// Handler for the fetch command
pub struct FetchCommand {
    pub root: PathBuf,
    pub config: Option<PathBuf>,
    pub overrides: SettingsOverrides,
    pub output: OutputFormat,
    pub use_color: bool,
}

impl FetchCommand {
    pub fn new(
        root: &Path,
        config: Option<&Path>,
        overrides: SettingsOverrides,
        output: OutputFormat,
        use_color: bool,
    ) -> Self {
        Self {
            root: root.to_path_buf(),
            config: config.map(Path::to_path_buf),
            overrides,
            output,
            use_color,
        }
    }

    pub fn execute(&self) -> Result<i32> {
        let context = CommandContext::prepare(&self.root, self.config.as_deref(), &self.overrides)?;
        let printer = ReportPrinter::new(self.use_color);

        if self.output == OutputFormat::Text {
            printer.info(&format!(
                "Fetching {} repositories from '{}'",
                context.catalog().len(),
                context.settings().remote
            ));
        }

        let report = context.sync(&SyncOperation::Fetch, false);
        printer.print_report(&report, self.output)?;

        Ok(report_exit_code(&report))
    }
}
