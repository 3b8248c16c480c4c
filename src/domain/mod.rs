//! Domain layer - pure business logic
//!
//! This module contains business logic with no external I/O.
//! Types and functions here can be unit tested without mocking.

pub mod credentials;
pub mod params;
pub mod render_data;
pub mod resolve;
pub mod templates;
pub mod validation;

