//! `fintrack-store` — ownership-scoped storage abstractions.
//!
//! Every operation in this crate is parameterized by the owner resolved
//! from the request's principal, so no caller can reach another owner's
//! rows by construction. In-memory implementations back dev and tests; the
//! traits are the seam for a persistent backend.

pub mod accounts;
pub mod owned;
pub mod singleton;

pub use accounts::{Account, AccountStore, InMemoryAccountStore};
pub use owned::{InMemoryOwnedStore, OwnedStore};
pub use singleton::{InMemorySingletonStore, SingletonStore};
