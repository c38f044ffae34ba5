//! URL side of the browser: path grammar, query parameters and the
//! viewport encoding shared by every entry point.

pub mod legacy;
pub mod location;
pub mod matcher;
pub mod viewport;

pub use legacy::*;
pub use location::*;
pub use matcher::*;
pub use viewport::*;
