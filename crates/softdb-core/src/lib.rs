//! Core types and repository traits for SoftDB, a software-license tracker.
//!
//! This crate is free of HTTP and database dependencies. It defines the domain
//! model (subjects, rooms, applications, licenses), the subject-hierarchy
//! closure walk, and the repository contract storage backends implement.

pub mod application;
pub mod error;
pub mod hierarchy;
pub mod license;
pub mod room;
pub mod store;
pub mod subject;

pub use error::{Classify, Entity, Error, ErrorKind, Result};
