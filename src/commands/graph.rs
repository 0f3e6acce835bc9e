//! `graph`: print the dependency tree.
use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::graph::ExecutionPlan;
use crate::logging::Logger;

use super::CommandSetup;

/// Run the graph command: print the dependency tree beneath the root.
///
/// The plan is built first so that a cyclic configuration is reported
/// instead of drawn.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or the units
/// contain a dependency cycle.
#[allow(clippy::print_stdout)]
pub fn run(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;

    log.stage("Rendering dependency tree");
    let plan = ExecutionPlan::build(&setup.graph)?;
    print!("{}", plan.render());
    Ok(())
}
