//! ClipJoint admin library.
//!
//! This crate provides the staff console functionality as a library,
//! allowing routes and services to be unit tested without the binary.
//!
//! The console manages orders, reviews, services and masters, and is
//! meant to run on an internal network behind the staff login.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
