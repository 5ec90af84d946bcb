//! Config command implementation.
//!
//! The `trailfund config` command shows the resolved configuration, or
//! the JSON Schema of the config file with `--schema`.

use std::path::{Path, PathBuf};

use crate::cli::args::ConfigArgs;
use crate::config::{ConfigPaths, TrailfundConfig};
use crate::error::{Result, TrailfundError};
use crate::ui::UserInterface;

use super::context::CommandContext;
use super::dispatcher::{Command, CommandResult};

/// The config command implementation.
pub struct ConfigCommand<'a> {
    context: &'a CommandContext,
    project_root: PathBuf,
    explicit: Option<PathBuf>,
    args: ConfigArgs,
}

impl<'a> ConfigCommand<'a> {
    /// Create a new config command.
    pub fn new(
        context: &'a CommandContext,
        project_root: &Path,
        explicit: Option<&Path>,
        args: ConfigArgs,
    ) -> Self {
        Self {
            context,
            project_root: project_root.to_path_buf(),
            explicit: explicit.map(Path::to_path_buf),
            args,
        }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ConfigArgs {
        &self.args
    }
}

impl Command for ConfigCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        if self.args.schema {
            let schema = schemars::schema_for!(TrailfundConfig);
            let json =
                serde_json::to_string_pretty(&schema).map_err(|e| TrailfundError::Other(e.into()))?;
            ui.message(&json);
            return Ok(CommandResult::success());
        }

        let config = self.context.config();

        if self.args.json {
            let json =
                serde_json::to_string_pretty(config).map_err(|e| TrailfundError::Other(e.into()))?;
            ui.message(&json);
            return Ok(CommandResult::success());
        }

        // Show which files contributed, as YAML comments
        let paths =
            ConfigPaths::discover(&self.project_root).with_explicit(self.explicit.as_deref());
        let existing: Vec<_> = paths.all().into_iter().filter(|p| p.exists()).collect();
        if existing.is_empty() {
            ui.message("# built-in defaults");
        }
        for path in &existing {
            ui.message(&format!("# {}", path.display()));
        }

        let yaml = serde_yaml::to_string(config).map_err(|e| TrailfundError::Other(e.into()))?;
        ui.message(&yaml);

        Ok(CommandResult::success())
    }
}
