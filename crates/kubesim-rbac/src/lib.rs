//! kubesim-rbac — a toy role-based access check.
//!
//! Answers "may this role perform this verb on this resource?" from a
//! static table. There are no subjects, bindings or namespaces; the point
//! is to show how one role's permissions differ from another's.
//!
//! [`kitchen`] holds the simpler whole-role board (head chef, sous chef,
//! line cook) where a role either may use a station or not.

pub mod error;
pub mod kitchen;
pub mod matrix;
pub mod probe;

pub use error::{RbacError, RbacResult};
pub use kitchen::{has_access, KitchenBoard, KitchenRole, Station};
pub use matrix::{AccessDecision, AccessMatrix, Role, Verb};
pub use probe::AccessProbe;
