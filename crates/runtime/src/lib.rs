pub mod debounce;
pub mod diagnostics;
pub mod generation;
pub mod timer;

pub use debounce::*;
pub use diagnostics::*;
pub use generation::*;
pub use timer::*;
