pub mod geo;
pub mod percent;

// Foundation crate: small, well-tested primitives only.
pub use geo::*;
pub use percent::*;
