//! `apply`: execute the plan against a system root.
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use anyhow::Result;

use crate::cli::{ApplyOpts, GlobalOpts};
use crate::config::{Action, EnsureDirSpec, EnsureFileSpec};
use crate::graph::{ExecutionPlan, UnitId};
use crate::logging::{Log, Logger, UnitStatus};
use crate::resources::directory::DirectoryResource;
use crate::resources::fileset::FileSet;
use crate::resources::fs::parse_mode;
use crate::resources::{Applicable, ResourceChange};

use super::CommandSetup;

/// Run the apply command.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded, the units
/// contain a dependency cycle, or one or more units failed.
pub fn run(global: &GlobalOpts, opts: &ApplyOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;

    log.stage("Planning");
    let plan = ExecutionPlan::build(&setup.graph)?;
    log.info(&format!("{} units planned", plan.len().saturating_sub(1)));

    if opts.dry_run {
        log.stage("Applying (dry run)");
    } else {
        log.stage("Applying");
    }
    log.debug(&format!("system root: {}", global.sys_root.display()));

    let mut executor = Executor::new(log, &global.sys_root, setup.config.base_dir(), opts.dry_run);
    executor.execute(&plan);

    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} unit(s) failed");
    }
    Ok(())
}

/// Runs planned actions in order against a system root.
///
/// Each unit's action completes before the next unit starts, so a unit
/// only runs once everything it depends on is on disk. A unit whose
/// dependency failed (or was itself skipped) is skipped.
///
/// File targets are registered in a [`FileSet`] for the whole run, which
/// rejects a second unit claiming the same path.
pub struct Executor<'a> {
    log: &'a dyn Log,
    base_dir: &'a Path,
    dry_run: bool,
    files: FileSet,
    blocked: HashSet<UnitId>,
}

impl fmt::Debug for Executor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("base_dir", &self.base_dir)
            .field("dry_run", &self.dry_run)
            .field("files", &self.files)
            .field("blocked", &self.blocked)
            .finish_non_exhaustive()
    }
}

impl<'a> Executor<'a> {
    /// Create an executor writing beneath `sys_root`. Relative content
    /// sources resolve against `base_dir`.
    #[must_use]
    pub fn new(log: &'a dyn Log, sys_root: &Path, base_dir: &'a Path, dry_run: bool) -> Self {
        Self {
            log,
            base_dir,
            dry_run,
            files: FileSet::new(sys_root),
            blocked: HashSet::new(),
        }
    }

    /// Run every unit of `plan` in order, recording each result.
    pub fn execute(&mut self, plan: &ExecutionPlan<'_, Action>) {
        let graph = plan.graph();
        for &id in plan.ids() {
            let unit = &graph[id];
            let Some(action) = unit.action() else {
                continue;
            };
            let _span = tracing::info_span!("unit", unit = unit.name()).entered();

            if let Some(&dep) = unit.dependencies().iter().find(|&&d| self.blocked.contains(&d)) {
                let reason = format!("dependency '{}' did not complete", graph[dep].name());
                self.log.debug(&format!("skipped, {reason}"));
                self.log.record_unit(unit.name(), UnitStatus::Skipped, Some(&reason));
                self.blocked.insert(id);
                continue;
            }

            let meta = action.metadata();
            if !meta.user.is_empty() || !meta.group.is_empty() {
                self.log.debug(&format!(
                    "ownership {}:{} is recorded but not applied",
                    meta.user, meta.group
                ));
            }

            let outcome = match action {
                Action::EnsureDir(spec) => self.ensure_dir(spec),
                Action::EnsureFile(spec) => self.ensure_file(spec),
            };

            match outcome {
                Ok(status) => self.log.record_unit(unit.name(), status, None),
                Err(e) => {
                    let msg = format!("{e:#}");
                    self.log.error(&msg);
                    self.log.record_unit(unit.name(), UnitStatus::Failed, Some(&msg));
                    self.blocked.insert(id);
                }
            }
        }
    }

    fn ensure_dir(&self, spec: &EnsureDirSpec) -> Result<UnitStatus> {
        let resource = DirectoryResource::from_spec(spec, self.files.sys_root())?;
        if self.dry_run {
            if resource.is_correct()? {
                return Ok(UnitStatus::AlreadyCorrect);
            }
            self.log
                .dry_run(&format!("would create directory {}", resource.description()));
            return Ok(UnitStatus::DryRun);
        }
        match resource.apply()? {
            ResourceChange::Applied => {
                self.log
                    .info(&format!("created directory {}", resource.description()));
                Ok(UnitStatus::Ok)
            }
            ResourceChange::AlreadyCorrect => Ok(UnitStatus::AlreadyCorrect),
        }
    }

    fn ensure_file(&mut self, spec: &EnsureFileSpec) -> Result<UnitStatus> {
        let mode = parse_mode(&spec.mode)?;
        let contents = spec.contents.load(self.base_dir)?;
        let len = contents.len();

        // Registered even when unchanged so that duplicate targets are caught.
        self.files
            .add_file_with_mode(spec.path.clone(), contents, mode)?;

        if self.files.is_current(&spec.path) {
            return Ok(UnitStatus::AlreadyCorrect);
        }
        if self.dry_run {
            let dest = self.files.destination(&spec.path);
            self.log
                .dry_run(&format!("would write {len} bytes to {}", dest.display()));
            return Ok(UnitStatus::DryRun);
        }
        let dest = self.files.write(&spec.path)?;
        self.log
            .info(&format!("wrote {len} bytes to {}", dest.display()));
        Ok(UnitStatus::Ok)
    }
}
