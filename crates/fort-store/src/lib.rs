//! # Fort Store
//!
//! Persistence collaborators for the fort ability registry and role policy.
//!
//! ## Overview
//!
//! The fort-store crate handles:
//! - **Loader**: The data-access interface that resolves users and roles
//!   into fully-loaded snapshots
//! - **Memory store**: An in-memory implementation for single-process use
//!   and testing
//! - **Schema**: The configurable `abilities` table and its migration
//! - **Authorizer**: Id-based checks that load first and decide second
//!
//! ## Architecture
//!
//! ```text
//! Authorizer
//!   ├─ AccessLoader ─→ User / Role snapshots (trashed abilities filtered)
//!   └─ Gate ─→ RolePolicy
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use fort_rbac::{Gate, NewAbility, RoleOperation, User};
//! use fort_store::{Authorizer, MemoryStore, SchemaConfig, Targets};
//!
//! # async fn run() -> Result<(), fort_store::StoreError> {
//! let store = MemoryStore::with_schema(SchemaConfig::from_env())?;
//! let create = store.define_ability(NewAbility::new("create", "role", "Create roles")).await?;
//! let alice = store.create_user(User::new("alice")).await?;
//! store.grant_ability_to_user(alice.id, create.id).await?;
//!
//! let authorizer = Authorizer::new(store, Gate::default());
//! authorizer.authorize(RoleOperation::Create, alice.id, Targets::collection()).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `memory`: In-memory store (enabled by default)

pub mod authorizer;
pub mod error;
pub mod loader;
#[cfg(feature = "memory")]
pub mod memory;
pub mod schema;

// Re-export main types for convenience
pub use authorizer::{Authorizer, Targets};
pub use error::{ConfigError, StoreError, StoreResult};
pub use loader::AccessLoader;
#[cfg(feature = "memory")]
pub use memory::MemoryStore;
pub use schema::{AbilitiesMigration, SchemaConfig};
