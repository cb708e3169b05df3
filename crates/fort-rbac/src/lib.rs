//! # Fort RBAC (Ability and Role Based Access Control)
//!
//! This crate provides the authorization core for role management:
//! an ability registry and a role policy evaluated over fully-resolved
//! snapshots of users and roles.
//!
//! ## Overview
//!
//! The fort-rbac crate handles:
//! - **Abilities**: Permission records identified by action and resource
//! - **Ability Sets**: Deduplicated slug sets used for membership checks
//! - **Roles and Users**: Named bundles of abilities, and the accounts holding them
//! - **Registry**: Effective-ability resolution and the ability catalog
//! - **Role Policy**: Decision table for view, create, update, delete,
//!   import, export, give and remove
//! - **Gate**: Operation-to-ability mapping and `Result`-returning checks
//!
//! ## Architecture
//!
//! ```text
//! Ability slug = action.resource
//!
//! User
//!   ├─ Abilities (direct)
//!   └─ Roles ─→ Abilities
//!
//! effective abilities = direct ∪ abilities of every role
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use fort_rbac::{Ability, Gate, Role, RoleOperation, RoleRequest, User};
//!
//! let editor = Role::new("editor", "Editor");
//! let actor = User::new("alice")
//!     .with_ability(Ability::new(1, "update", "role", "Update roles"))
//!     .with_role(editor.clone());
//!
//! let gate = Gate::default();
//! assert!(gate.allows(RoleOperation::Update, &actor, RoleRequest::role(&editor)));
//! ```
//!
//! ## Failure model
//!
//! Decisions are total: missing relationships resolve to empty sets and the
//! answer is `false`. Only the gate produces errors, for malformed requests
//! and for denial.

pub mod ability;
pub mod ability_set;
pub mod error;
pub mod gate;
pub mod operation;
pub mod policy;
pub mod registry;
pub mod subject;

// Re-export main types for convenience
pub use ability::{Ability, AbilityChanges, NewAbility};
pub use ability_set::AbilitySet;
pub use error::{RbacError, RbacResult};
pub use gate::{Gate, GateConfig};
pub use operation::RoleOperation;
pub use policy::{RolePolicy, RoleRequest};
pub use registry::{effective_abilities, has_ability, AbilityRegistry, HasAbilities};
pub use subject::{Guarded, Role, User};
