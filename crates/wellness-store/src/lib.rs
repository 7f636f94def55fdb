//! Key-value storage for the Wellness Ledger.
//!
//! The ledger keeps every piece of state (admins, role grants, medical
//! records, visits, contacts, policies, bills) in a single key-value store.
//! Keys are typed ([`StoreKey`]); values are opaque byte strings that the
//! ledger encodes with bincode through the [`codec`] helpers.
//!
//! # Storage Backends
//!
//! All backends implement the [`KeyValueStore`] trait:
//!
//! - [`InMemoryStore`] -- `BTreeMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. The store never interprets values -- it is a pure key-value store.
//! 2. Mutations arrive only as a [`WriteBatch`], applied all-or-nothing.
//! 3. Callers stage writes in a [`Transaction`]; reads through the
//!    transaction see its own pending writes.
//! 4. Dropping a transaction without committing discards every staged write.
//! 5. Lock and codec failures are propagated, never silently ignored.

pub mod codec;
pub mod error;
pub mod key;
pub mod memory;
pub mod traits;
pub mod txn;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{StoreError, StoreResult};
pub use key::{KeySpace, StoreKey};
pub use memory::InMemoryStore;
pub use traits::{KeyValueStore, ReadView};
pub use txn::{Transaction, WriteBatch, WriteOp};
