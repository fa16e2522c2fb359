//! HTTP route handlers

pub mod auth;
pub mod revision;
pub mod student;
