//! IMDF Builder Project Store
//!
//! Whole-record persistence of projects keyed by a validated identifier,
//! plus storage for uploaded floor-plan images.
//!
//! Identifiers are checked before any path is built from them; see
//! [`ProjectId`].

pub mod id;
pub mod store;
pub mod upload;

pub use id::*;
pub use store::*;
pub use upload::*;
