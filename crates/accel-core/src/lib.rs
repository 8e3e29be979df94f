//! accel-core: shared types for the AccelGrid placement engine.
//!
//! Holds the normalized resource model, the workload and snapshot types,
//! the built-in algorithm names, and the `grid.toml` configuration. No
//! crate in the workspace talks to a cluster API; everything here is a
//! plain value supplied by the caller.

pub mod algorithm;
pub mod config;
pub mod error;
pub mod quantity;
pub mod types;

pub use algorithm::Algorithm;
pub use config::GridConfig;
pub use error::{CoreError, CoreResult};
pub use quantity::{RawResources, ResourceInput, ResourceQuantity, parse_count, parse_cpu, parse_memory};
pub use types::*;

/// Current Unix epoch in seconds.
pub fn epoch_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
