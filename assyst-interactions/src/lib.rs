//! Slash command plumbing: keeps a local command tree registered with Discord and turns incoming
//! application command interactions into typed, executable calls.
//!
//! The pieces, in the order an interaction flows through them:
//!
//! - [`converter`]: the registry of [`converter::ArgumentConverter`]s, one per argument data type.
//!   Each converter also declares which Discord option type its data type is sent as.
//!
//! - [`registrar`]: bulk-overwrites the command tree on Discord and maps the IDs Discord hands back
//!   to the local root commands. This map is the only shared mutable state and is swapped as a
//!   whole.
//!
//! - [`resolver`]: follows an interaction's subcommand options from the root command down to the
//!   leaf that should run.
//!
//! - [`pipeline`]: runs the leaf's converters over the supplied options, in declaration order.
//!
//! - [`dispatcher`]: glues the above together per gateway event and hands the result to a
//!   [`dispatcher::CommandExecutor`], or to the error subscribers if conversion failed.

pub mod command;
pub mod context;
pub mod converter;
pub mod dispatcher;
pub mod errors;
pub mod event;
pub mod pipeline;
pub mod registrar;
pub mod remote;
pub mod resolver;

#[cfg(test)]
pub(crate) mod test_util;
