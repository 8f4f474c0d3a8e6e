//! IMDF Builder Export Engine
//!
//! Turns a project payload into an IMDF archive.
//!
//! # Pipeline
//!
//! ```text
//! ProjectData ──► assemble ──► 16 FeatureCollections + manifest
//!                                        │
//!                                        ├── serialize each (pretty JSON)
//!                                        ▼
//!                                  package ──► imdf-export.zip
//! ```
//!
//! Assembly is pure: no I/O, and missing ids are derived from the input
//! rather than drawn at random. Only the manifest timestamps depend on the
//! clock passed in.

pub mod assembler;
pub mod feature;
pub mod package;

pub use assembler::*;
pub use feature::*;
pub use package::*;
