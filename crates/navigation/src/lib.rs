//! Keeps the browser URL and the catalog → collection → item selection in
//! step.
//!
//! Inbound, a path is matched into a route and materialized by a cascade of
//! dependent lookups before it is committed to the [`NavigationStateStore`].
//! Outbound, UI-driven state changes are encoded back into the URL. The
//! [`StateSynchronizer`] owns both directions and the guard that stops one
//! from re-triggering the other.

pub mod config;
pub mod fetch;
pub mod history;
mod listeners;
pub mod loader;
pub mod selection;
pub mod state;
pub mod store;
pub mod synchronizer;

#[cfg(test)]
mod testing;

pub use config::*;
pub use fetch::*;
pub use history::*;
pub use listeners::Subscription;
pub use loader::*;
pub use selection::*;
pub use state::*;
pub use store::*;
pub use synchronizer::*;
