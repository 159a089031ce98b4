//! nsload - namespace-prefix autoload resolution
//!
//! Maps fully qualified symbol names (`Vendor\Package\Class`) to the source
//! files expected to define them, using a static prefix → directories table:
//! - `AutoloadConfig`: the table, in code or as an `autoload.json` manifest
//! - `PrefixResolver`: pure longest-prefix lookup and path construction
//! - `Probe` / `Loader`: existence checks and cached file lookup

pub mod config;
pub mod entry;
pub mod error;
pub mod loader;
pub mod probe;
pub mod resolver;

pub use config::AutoloadConfig;
pub use entry::PrefixEntry;
pub use error::{ConfigError, Result};
pub use loader::Loader;
pub use probe::{FsProbe, Probe};
pub use resolver::{PrefixResolver, Resolution};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
