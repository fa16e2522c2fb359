//! Core revision library shared by the backend.
//!
//! Provides:
//! - SM-2 spaced repetition scheduling
//! - Mastery percentage computation
//! - Review session selection
//! - Shared types (SchedulingState, Quality, SessionCandidate)

pub mod error;
pub mod mastery;
pub mod scheduler;
pub mod session;
pub mod types;

pub use error::{CoreError, Result};
pub use mastery::compute_mastery;
pub use scheduler::{sm2::Sm2, SchedulingResult};
pub use session::{select_session, SessionCandidate};
pub use types::{GeneratedBy, Quality, SchedulingState};
