//! Core types for StudyHub.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod course;
pub mod email;
pub mod entitlement;
pub mod id;
pub mod outcome;
pub mod price;
pub mod principal;
pub mod profile;
pub mod resource;
pub mod status;

pub use course::Course;
pub use email::{Email, EmailError};
pub use entitlement::Entitlement;
pub use id::*;
pub use outcome::Outcome;
pub use price::{Price, PriceError};
pub use principal::Principal;
pub use profile::Profile;
pub use resource::Resource;
pub use status::*;
