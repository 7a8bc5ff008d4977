//! Domain Layer
//!
//! Entities, value objects, and repository traits. No I/O here; everything
//! that touches storage goes through the traits in [`repository`].

pub mod entity;
pub mod repository;
pub mod value_object;
