//! linkwire tools
//!
//! Command-line tooling around the linkwire transport.
//!
//! ## Architecture
//!
//! - **bin_common**: Common utilities for binary executables (CLI, runner)
//! - **linkwire**: The transport library (re-exported from workspace)
//!
//! ## Usage in Binaries
//!
//! ```rust
//! use linkwire_tools::bin_common::{load_config_from_env, ConfigType};
//! use linkwire_tools::linkwire::ConnectionSettings;
//! ```

// Re-export workspace libraries for convenience
pub use linkwire;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables

    pub mod cli;
    pub mod runner;

    pub use cli::{load_config_from_env, load_settings, parse_args, parse_probe_args, ConfigType, ProbeArgs};
    pub use runner::{init_logging, print_banner, print_shutdown, Shutdown};
}
