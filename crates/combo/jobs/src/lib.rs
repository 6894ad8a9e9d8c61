//! Job profiles for the combo engine.
//!
//! Each job module exposes its action ids, level progression helpers, and a
//! `profile(level)` constructor. [`JobCatalog`] gathers them behind
//! [`ProfileSource`](combo_core::ProfileSource) so the runtime can rebuild a
//! profile whenever the player's job or level changes.
//!
//! With the `loaders` feature, the job-to-role table can also be read from RON.

pub mod catalog;
pub mod sge;
pub mod whm;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use catalog::{JobCatalog, JobEntry, world_rules};

#[cfg(feature = "loaders")]
pub use loaders::{LoadResult, RoleAssignment, RolesLoader};
