// SPDX-License-Identifier: MIT OR Apache-2.0
//! zap-tools
#![deny(unsafe_code)]
#![warn(missing_docs)]
//!
//! Runtime-callable capabilities over the ZAP gateway catalog.
//!
//! The agent runtime consumes tools through one seam: [`AgentTool`], a
//! callable with a name, a JSON-schema parameter description, and a
//! string-in/string-out invoke. This crate provides the remote adapter
//! ([`RemoteTool`]), the cached discovery layer ([`ToolProvider`]), the
//! fixed canonical tool set, and a registry that aggregates providers.

mod adapter;
mod canonical;
mod provider;
mod registry;

pub use adapter::{AgentTool, RemoteTool, format_result, normalize_schema};
pub use canonical::canonical_tools;
pub use provider::{ToolFilter, ToolProvider, discover_tools};
pub use registry::{ToolRegistry, dedup_by_name};
