//! Carthage: a declarative configuration-management planner.
//!
//! Units (directories and files that must exist) are declared in a JSON
//! configuration, linked by named dependencies, and executed in an order
//! where every unit follows everything it depends on.
//!
//! The public API is organised into layers:
//!
//! - **[`config`]**: decode and validate the JSON unit list
//! - **[`graph`]**: the unit registry, depth-first traversal, execution
//!   plans, and tree rendering
//! - **[`resources`]**: idempotent `check + apply` primitives beneath a
//!   system root
//! - **[`commands`]**: top-level subcommand orchestration (`plan`, `graph`,
//!   `apply`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod graph;
pub mod logging;
pub mod resources;
