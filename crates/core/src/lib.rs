// Public API exports
pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;
pub mod prettyprint;

#[cfg(test)]
pub(crate) mod testing;

// Re-export key types for easy access
pub use domain::*;
pub use ports::*;
