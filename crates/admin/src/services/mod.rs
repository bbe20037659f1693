//! Business logic services for the console.

pub mod auth;
pub mod orders;
