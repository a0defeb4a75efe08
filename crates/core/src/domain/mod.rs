pub mod roster;
pub mod sheets;

// Re-export commonly used types
pub use roster::*;
