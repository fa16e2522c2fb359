//! Backend services

pub mod revision;
