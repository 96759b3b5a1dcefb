pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod logging;
pub mod manager;
pub mod memory;
pub mod registry;
pub mod segment;
pub mod translation;

// Re-export commonly used items for convenience
pub use config::MemoryConfig;
pub use constants::*;
pub use error::{AddressFault, MemoryError};
pub use manager::MemoryManager;
pub use translation::{LogicalAddress, translate};
