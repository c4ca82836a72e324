//! SQLite backend for SoftDB.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Each entity has its own repository;
//! [`Services`] wires them together over one [`Database`].

mod applications;
mod database;
mod encode;
mod licenses;
mod rooms;
mod schema;
mod services;
mod subjects;

pub mod error;

pub use applications::Applications;
pub use database::Database;
pub use error::{Error, Result};
pub use licenses::Licenses;
pub use rooms::Rooms;
pub use services::Services;
pub use subjects::Subjects;
