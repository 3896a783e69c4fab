//! # icx-netops - Automation for Ruckus ICX switches
//!
//! icx-netops gathers facts from Ruckus/CommScope ICX switches and applies
//! 802.1x authentication configuration, driving the switch CLI over ssh.
//!
//! ## Core Concepts
//!
//! - **Modules**: Units of work (`icx_facts`, `icx_flex_dot1x`) invoked with a parameter map
//! - **Facts**: Structured data parsed from `show` command output
//! - **Command plans**: Ordered CLI lines synthesized from a desired dot1x state
//! - **Connections**: Transport to the switch (system ssh, or canned fixtures)
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                  CLI Interface                   │
//! │           (clap-based command parsing)           │
//! └──────────────────────────────────────────────────┘
//!                          │
//!                          ▼
//! ┌──────────────────────────────────────────────────┐
//! │                 Module Registry                  │
//! │            (icx_facts, icx_flex_dot1x)           │
//! └──────────────────────────────────────────────────┘
//!                          │
//!                          ▼
//! ┌──────────────────────────────────────────────────┐
//! │               Connection (async)                 │
//! │              (ssh CLI, fixtures)                 │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use icx_netops::prelude::*;
//! use std::sync::Arc;
//!
//! let conn = SshCliConnectionBuilder::new("10.0.0.2").user("admin").build()?;
//! let context = ModuleContext::new().with_connection(Arc::new(conn));
//!
//! let params: ModuleParams = serde_json::from_value(serde_json::json!({
//!     "gather_subset": ["hardware"]
//! }))?;
//! let output = ModuleRegistry::with_builtins().execute("icx_facts", &params, &context)?;
//! println!("{}", output.data["ansible_facts"]);
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export commonly used items in prelude
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    // Connection types
    pub use crate::connection::{
        CommandResult, Connection, ConnectionError, ConnectionResult, FixtureConnection,
        SshCliConnection, SshCliConnectionBuilder,
    };

    // Facts
    pub use crate::facts::FactSet;

    // Module system
    pub use crate::modules::network::{
        CommandPlan, ConfigState, Dot1xConfig, FactSubset, NetworkDeviceConnection,
    };
    pub use crate::modules::{
        Module, ModuleContext, ModuleError, ModuleOutput, ModuleParams, ModuleRegistry,
        ModuleResult, ParamExt,
    };

    // Configuration
    pub use crate::config::Config;
}

/// Connection layer for switch communication.
///
/// Provides the [`Connection`](connection::Connection) trait plus the system
/// ssh transport and the fixture transport used for offline runs and tests.
pub mod connection;

/// Device facts container.
pub mod facts;

/// Built-in ICX modules and the module system they plug into.
pub mod modules;

/// Configuration file loading and environment overrides.
pub mod config;

/// Terminal output helpers.
pub mod output;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
