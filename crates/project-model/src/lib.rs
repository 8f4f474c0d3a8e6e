//! IMDF Builder Project Model
//!
//! Defines the core data contracts for indoor-map projects:
//! - **Entities:** Venue, building, levels, units, amenities, fixtures,
//!   openings, and anchors as they are drawn and persisted
//! - **Geometry:** Screen-space drawing primitives and their normalization
//!   into GeoJSON coordinate lists
//! - **Project:** The persisted record wrapping an entity payload
//! - **Session:** Live drawing/editing state, held explicitly
//!
//! Drawn coordinates are screen units divided by a fixed scale factor
//! (100000 by default). This is a linear scale-down, not a geographic
//! projection.

pub mod entity;
pub mod geometry;
pub mod project;
pub mod session;
pub mod validate;

pub use entity::*;
pub use geometry::*;
pub use project::*;
pub use session::*;
pub use validate::*;
