//! # Quill Core
//!
//! The domain layer of the Quill blog backend.
//! Entities, the slug policy, the post query descriptor and the services that
//! drive them. No infrastructure dependencies live here.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;
pub mod text;

pub use error::{DomainError, RepoError};
