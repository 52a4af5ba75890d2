//! Prefixed environment configuration with type coercion, nested
//! defaults and dotenv/JSON file loading.
//!
//! Structured configuration maps onto a flat, uppercase, prefixed key
//! namespace in a process-wide environment store. A [`Namespace`] scopes
//! reads and writes under a prefix, [`parse`] coerces stored strings
//! back to native values, and [`load`] merges dotenv- or JSON-formatted
//! files into the store without overwriting what is already there.
//!
//! ```no_run
//! use envscope::Namespace;
//!
//! envscope::load()?;
//! let env = Namespace::with_prefix("app");
//! let port = env.get_or("port", 3000);
//! # Ok::<(), envscope::EnvError>(())
//! ```

pub mod error;
pub mod flatten;
pub mod key;
pub mod loader;
pub mod namespace;
pub mod store;
pub mod value;

// Re-export main types
pub use error::EnvError;
pub use flatten::flatten;
pub use loader::{load, load_from, load_into};
pub use namespace::{Namespace, OverrideGuard};
pub use store::{EnvStore, MemoryStore, ProcessStore};
pub use value::{parse, Value};

/// Look up a key in the process environment without a prefix.
///
/// Shorthand for `Namespace::new().get(key)`.
pub fn get(key: &str) -> Option<Value> {
    Namespace::new().get(key)
}
