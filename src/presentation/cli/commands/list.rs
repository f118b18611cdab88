use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::presentation::cli::commands::context::{CommandContext, SettingsOverrides};
use crate::presentation::cli::{OutputFormat, EXIT_REPOSITORY_FAILURE, EXIT_SUCCESS};
use crate::presentation::ui::listing::CatalogListing;
use crate::presentation::ui::report::ReportPrinter;

/// Handler for the list command
pub struct ListCommand {
    pub root: PathBuf,
    pub config: Option<PathBuf>,
    pub overrides: SettingsOverrides,
    pub output: OutputFormat,
    pub use_color: bool,
}

impl ListCommand {
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
        let catalog = context.catalog();

        let listing = CatalogListing::build(
            catalog.root(),
            &context.settings().remote,
            catalog.repositories(),
            catalog.open_failures(),
        );
        ReportPrinter::new(self.use_color).print_listing(&listing, self.output)?;

        Ok(if listing.open_failures.is_empty() {
            EXIT_SUCCESS
        } else {
            EXIT_REPOSITORY_FAILURE
        })
    }
}
