//! Non-fatal checks over a decoded unit list.
//!
//! Anything caught here still decodes and plans; the command setup prints
//! the warnings and carries on. Hard failures (unknown dependencies,
//! duplicate names, cycles) are reported by graph construction and
//! planning instead.
use std::collections::{HashMap, HashSet};
use std::path::Path;

use super::{Action, UnitSpec, octal_mode};
use crate::resources::fs::escapes_root;

/// A validation warning detected during configuration loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The unit that triggered the warning.
    pub unit: String,
    /// Human-readable warning message.
    pub message: String,
}

impl ValidationWarning {
    /// Create a warning for `unit`.
    #[must_use]
    pub fn new(unit: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            message: message.into(),
        }
    }
}

/// Trait for configuration validators.
pub trait ConfigValidator {
    /// Validate the configuration and return any warnings found.
    fn validate(&self) -> Vec<ValidationWarning>;
}

/// Per-unit checks: target path, mode, dependency list, file contents.
#[derive(Debug)]
pub struct UnitValidator<'a> {
    units: &'a [UnitSpec],
}

impl<'a> UnitValidator<'a> {
    /// Validate `units` one at a time.
    #[must_use]
    pub const fn new(units: &'a [UnitSpec]) -> Self {
        Self { units }
    }
}

impl ConfigValidator for UnitValidator<'_> {
    fn validate(&self) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        for unit in self.units {
            let meta = unit.action.metadata();

            if !meta.path.is_absolute() {
                warnings.push(ValidationWarning::new(
                    &unit.name,
                    format!("path is not absolute: {}", meta.path.display()),
                ));
            }

            if escapes_root(meta.path) {
                warnings.push(ValidationWarning::new(
                    &unit.name,
                    format!("path climbs out of the system root: {}", meta.path.display()),
                ));
            }

            if !meta.mode.is_empty() && octal_mode(meta.mode).is_none() {
                warnings.push(ValidationWarning::new(
                    &unit.name,
                    format!("invalid octal mode '{}' (expected 3-4 octal digits)", meta.mode),
                ));
            }

            let mut seen = HashSet::new();
            for dep in &unit.deps {
                if dep == &unit.name {
                    warnings.push(ValidationWarning::new(
                        &unit.name,
                        "unit depends on itself",
                    ));
                } else if !seen.insert(dep.as_str()) {
                    warnings.push(ValidationWarning::new(
                        &unit.name,
                        format!("dependency '{dep}' is listed more than once"),
                    ));
                }
            }

            if let Action::EnsureFile(spec) = &unit.action
                && spec.contents.is_empty()
            {
                warnings.push(ValidationWarning::new(
                    &unit.name,
                    "no contents given; the file will be empty",
                ));
            }
        }

        warnings
    }
}

/// Cross-unit check: two units must not manage the same path.
#[derive(Debug)]
pub struct PathConflictValidator<'a> {
    units: &'a [UnitSpec],
}

impl<'a> PathConflictValidator<'a> {
    /// Validate `units` against each other.
    #[must_use]
    pub const fn new(units: &'a [UnitSpec]) -> Self {
        Self { units }
    }
}

impl ConfigValidator for PathConflictValidator<'_> {
    fn validate(&self) -> Vec<ValidationWarning> {
        let mut owners: HashMap<&Path, &str> = HashMap::new();
        let mut warnings = Vec::new();

        for unit in self.units {
            let path = unit.action.path();
            if let Some(first) = owners.get(path) {
                warnings.push(ValidationWarning::new(
                    &unit.name,
                    format!("path {} is also managed by '{first}'", path.display()),
                ));
            } else {
                owners.insert(path, &unit.name);
            }
        }

        warnings
    }
}

/// Run every validator over `units`.
#[must_use]
pub fn validate_all(units: &[UnitSpec]) -> Vec<ValidationWarning> {
    let validators: [&dyn ConfigValidator; 2] = [
        &UnitValidator::new(units),
        &PathConflictValidator::new(units),
    ];
    validators.iter().flat_map(|v| v.validate()).collect()
}
