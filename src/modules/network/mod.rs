//! Network Device Modules
//!
//! Modules for Ruckus/CommScope ICX switches. They talk to the switch CLI
//! through a [`Connection`](crate::connection::Connection): show commands
//! for fact gathering, and a single `configure terminal` session for
//! applying configuration.
//!
//! # Modules
//!
//! - **icx_facts**: gathers model, version, stack, interface, neighbor,
//!   memory and flash facts
//! - **icx_flex_dot1x**: configures 802.1x authentication
//!
//! # Example Usage
//!
//! ```yaml
//! - name: Gather interface facts
//!   icx_facts:
//!     gather_subset:
//!       - interfaces
//!
//! - name: Enable dot1x on all ports
//!   icx_flex_dot1x:
//!     enable:
//!       all: true
//!     port_control:
//!       auto: yes
//!       all: true
//! ```
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +-------------------+
//! |   icx_facts      |---->|  NetworkDevice    |
//! |   icx_flex_dot1x |     |   Connection      |
//! +------------------+     +-------------------+
//!         |                         |
//!         v                         v
//! +------------------+     +-------------------+
//! |   icx_parsers    |     |   Transport       |
//! +------------------+     |   - ssh CLI       |
//!                          |   - fixtures      |
//!                          +-------------------+
//! ```

pub mod common;
pub mod icx_facts;
pub mod icx_flex_dot1x;
pub mod icx_parsers;

// Re-export main types for convenience
pub use common::{
    normalize_config_line, ConfigCommandGenerator, ConfigState, IcxCommandGenerator,
    NetworkDeviceConnection, NEGATION_TOKEN,
};
pub use icx_facts::{gather_facts, resolve_subsets, FactSubset, IcxFactsModule};
pub use icx_flex_dot1x::{CommandPlan, Dot1xConfig, IcxFlexDot1xModule};

use crate::modules::ModuleRegistry;
use std::sync::Arc;

/// Register all network modules with the registry
pub fn register_network_modules(registry: &mut ModuleRegistry) {
    registry.register(Arc::new(IcxFactsModule));
    registry.register(Arc::new(IcxFlexDot1xModule));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_names_match_registry() {
        let mut registry = ModuleRegistry::new();
        register_network_modules(&mut registry);

        let mut names = registry.names();
        names.sort_unstable();
        assert_eq!(names, vec!["icx_facts", "icx_flex_dot1x"]);
    }

    #[test]
    fn test_config_state_display() {
        assert_eq!(format!("{}", ConfigState::Present), "present");
        assert_eq!(format!("{}", ConfigState::Absent), "absent");
    }
}
