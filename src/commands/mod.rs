//! Subcommand orchestration shared by `plan`, `graph`, and `apply`.
pub mod apply;
pub mod graph;
pub mod plan;

use std::path::PathBuf;

use anyhow::{Result, anyhow};

use crate::cli::GlobalOpts;
use crate::config::{Action, Config, UnitSpec};
use crate::error::{ConfigError, GraphError};
use crate::graph::{ROOT_NAME, UnitGraph};
use crate::logging::Logger;

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates config path resolution, configuration loading, validation,
/// and graph construction so that each command does not have to repeat the
/// boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    /// The decoded configuration.
    pub config: Config,
    /// Every configured unit, hung beneath the root.
    pub graph: UnitGraph<Action>,
}

impl CommandSetup {
    /// Resolve the config path, load and validate the configuration, and
    /// build the unit graph.
    ///
    /// # Errors
    ///
    /// Returns an error if no config path was given, the file cannot be read
    /// or decoded, or the units do not form a valid graph.
    pub fn init(global: &GlobalOpts, log: &Logger) -> Result<Self> {
        let path = resolve_config_path(global)?;

        log.stage("Loading configuration");
        log.debug(&format!("config: {}", path.display()));
        let config = Config::load(&path)?;
        log.info(&format!("loaded {} units", config.units.len()));

        let warnings = config.validate();
        if !warnings.is_empty() {
            log.warn(&format!(
                "found {} configuration warning(s):",
                warnings.len()
            ));
            for warning in &warnings {
                log.warn(&format!("  [{}]: {}", warning.unit, warning.message));
            }
        }

        log.stage("Building dependency graph");
        let graph = build_graph(&config.units)?;
        let edges: usize = graph.iter().map(|(_, u)| u.dependencies().len()).sum();
        log.debug(&format!("{} units, {edges} edges", graph.len()));

        Ok(Self { config, graph })
    }
}

/// Return the configuration path from the command line (or
/// `CARTHAGE_CONFIG`).
///
/// # Errors
///
/// Returns an error if neither was given.
pub fn resolve_config_path(global: &GlobalOpts) -> Result<PathBuf> {
    global
        .config_path
        .clone()
        .ok_or_else(|| anyhow!("--config-path is a required flag"))
}

/// Build the unit graph for `units`.
///
/// Every unit becomes a dependency of the root, in configuration order, and
/// each `deps` entry becomes an edge. Dependencies may name units defined
/// later in the file.
///
/// # Errors
///
/// Returns [`ConfigError::DuplicateUnit`] if two units share a name (or a
/// unit is named `root`), and [`ConfigError::UnknownDependency`] if a
/// dependency names no configured unit.
pub fn build_graph(units: &[UnitSpec]) -> Result<UnitGraph<Action>, ConfigError> {
    let mut graph = UnitGraph::new();
    let root = graph.root();

    let mut ids = Vec::with_capacity(units.len());
    for unit in units {
        let id = graph
            .add_unit_with(unit.name.as_str(), unit.action.clone())
            .map_err(|err| match err {
                GraphError::DuplicateUnit(name) => ConfigError::DuplicateUnit(name),
            })?;
        graph.add_dependency(root, id);
        ids.push(id);
    }

    for (unit, &id) in units.iter().zip(&ids) {
        for dep in &unit.deps {
            let dep_id = graph
                .lookup(dep)
                .filter(|_| dep != ROOT_NAME)
                .ok_or_else(|| ConfigError::UnknownDependency {
                    unit: unit.name.clone(),
                    dependency: dep.clone(),
                })?;
            graph.add_dependency(id, dep_id);
        }
    }

    Ok(graph)
}
