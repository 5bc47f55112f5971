//! `wikinav build` command implementation.

use clap::Args;

use super::SourceArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    #[command(flatten)]
    source: SourceArgs,
}

impl BuildArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let (config, builder) = self.source.load()?;

        if config.sidebar_requests().is_empty() {
            output.warning("No sidebars configured; add [[sidebar]] to wikinav.toml or pass --dir");
        }

        let forest = builder.build_forest(config.sidebar_requests());
        self.source.write(&config.site, &forest)?;

        if let Some(path) = &self.source.output {
            output.success(&format!(
                "Sidebar written to {} ({} prefixes)",
                path.display(),
                forest.len()
            ));
        }
        Ok(())
    }
}
