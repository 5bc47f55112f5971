//! `wikinav watch` command implementation.

use std::ops::ControlFlow;

use clap::Args;
use wikinav_sidebar::ForestWatcher;

use super::SourceArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the watch command.
#[derive(Args)]
pub(crate) struct WatchArgs {
    #[command(flatten)]
    source: SourceArgs,
}

impl WatchArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let (config, builder) = self.source.load()?;

        let watcher = ForestWatcher::start(builder, config.sidebar_requests().to_vec())?;
        self.source.write(&config.site, &watcher.build())?;
        output.info("Watching for changes (Ctrl-C to stop)");

        let rebuilds = watcher.run(|forest| {
            match self.source.write(&config.site, forest) {
                Ok(()) => output.success(&format!("Sidebar rebuilt ({} prefixes)", forest.len())),
                Err(e) => output.error(&format!("Error: {e}")),
            }
            ControlFlow::Continue(())
        });

        tracing::info!(rebuilds, "Watcher stopped");
        Ok(())
    }
}
