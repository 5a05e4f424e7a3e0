//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::error::{Result, ResultExt};
use crate::loader::{load_spec, load_spec_from_value, read_document};
use crate::schema;
use crate::types::SpecVersion;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Validate { file, spec_version } => {
                self.validate(file, spec_version.as_deref())
            }
            Commands::Upgrade { file, output } => self.upgrade(file, output.as_deref()),
            Commands::Inspect { file } => self.inspect(file),
            Commands::Versions => self.versions(),
            Commands::Serve { port, fixtures } => {
                let config = crate::cli::ServerConfig {
                    fixtures: *fixtures,
                };
                crate::cli::serve(config, *port).await
            }
        }
    }

    /// Validate a specification file
    fn validate(&self, file: &Path, spec_version: Option<&str>) -> Result<()> {
        let document = read_document(file)?;
        if let Some(version) = spec_version {
            let version: SpecVersion = version.parse()?;
            schema::validate_value(&document, version)?;
        }

        let declared = document
            .pointer("/definition/metadata/spec_version")
            .cloned()
            .unwrap_or(Value::Null);
        let spec = load_spec_from_value(document)?;
        let dag = spec.build_dag()?;
        tracing::debug!(file = %file.display(), "Specification is valid");

        self.output_message(&json!({
            "type": "VALID",
            "file": file.display().to_string(),
            "declared_spec_version": declared,
            "connectors": spec.connectors.len(),
            "functions": spec.functions.len(),
            "streams": dag.edge_count()
        }));
        Ok(())
    }

    /// Upgrade a specification file to the latest generation
    fn upgrade(&self, file: &Path, output: Option<&Path>) -> Result<()> {
        let spec = load_spec(file)?;
        let upgraded = spec.marshal_pretty()?;

        match output {
            Some(path) => {
                fs::write(path, upgraded)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                self.output_message(&json!({
                    "type": "UPGRADED",
                    "output": path.display().to_string(),
                    "spec_version": spec.spec_version()
                }));
            }
            None => println!("{upgraded}"),
        }
        Ok(())
    }

    /// Show the topology of a specification file
    fn inspect(&self, file: &Path) -> Result<()> {
        let spec = load_spec(file)?;
        let dag = spec.build_dag()?;

        let edges: Vec<Value> = spec
            .streams
            .iter()
            .map(|s| json!({"name": s.name, "from": s.from_uuid, "to": s.to_uuid}))
            .collect();

        self.output_message(&json!({
            "type": "TOPOLOGY",
            "roots": dag.roots(),
            "sources": dag.sources(),
            "functions": dag.functions(),
            "destinations": dag.destinations(),
            "deployment_order": dag.topological_order(),
            "streams": edges
        }));
        Ok(())
    }

    /// List supported spec versions
    fn versions(&self) -> Result<()> {
        let versions: Vec<Value> = SpecVersion::ALL
            .iter()
            .map(|v| json!({"version": v.as_str(), "latest": v.is_latest()}))
            .collect();

        self.output_message(&json!({
            "type": "VERSIONS",
            "versions": versions
        }));
        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}
