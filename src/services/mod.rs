//! Services layer - Business logic
//!
//! This module contains the business logic services for Postboard.
//! Services are responsible for:
//! - Validating typed payloads before any model is built
//! - Coordinating between repositories
//! - Translating missing rows and duplicates into typed errors

pub mod auth;
pub mod password;
pub mod post;
pub mod resource;
pub mod seed;
pub mod tag;

pub use auth::{AuthService, AuthServiceError};
pub use password::{hash_password, verify_password};
pub use post::PostService;
pub use resource::{Resource, ResourceError};
pub use seed::{seed_data, SeedReport};
pub use tag::TagService;
