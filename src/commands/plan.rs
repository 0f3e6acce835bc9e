//! `plan`: print units in execution order.
use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::config::Action;
use crate::graph::ExecutionPlan;
use crate::logging::Logger;

use super::CommandSetup;

/// Run the plan command: print every unit in execution order.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or the units
/// contain a dependency cycle.
#[allow(clippy::print_stdout)]
pub fn run(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;

    log.stage("Planning");
    let plan = ExecutionPlan::build(&setup.graph)?;
    let names = planned_units(&plan);
    log.info(&format!("{} units planned", names.len()));

    for name in names {
        println!("{name}");
    }
    Ok(())
}

/// Unit names in execution order, without the root.
#[must_use]
pub fn planned_units<'g>(plan: &ExecutionPlan<'g, Action>) -> Vec<&'g str> {
    let graph = plan.graph();
    plan.ids()
        .iter()
        .filter(|&&id| !graph.is_root(id))
        .map(|&id| graph[id].name())
        .collect()
}
