//! # API Route Handlers
//!
//! This module organizes all the Axum route handlers for the `consulta-server`.
//! The handlers are split into sub-modules by resource.

// Sub-modules for different handler categories.
pub mod appointment_handlers;
pub mod auth_handlers;
pub mod custom_question_handlers;
pub mod document_handlers;
pub mod general;
pub mod patient_handlers;
pub mod questionnaire_handlers;
pub mod response_handlers;

// Re-export all handlers from the sub-modules to make them easily accessible
// to the router under a single `handlers::` path.
pub use appointment_handlers::*;
pub use auth_handlers::*;
pub use custom_question_handlers::*;
pub use document_handlers::*;
pub use general::*;
pub use patient_handlers::*;
pub use questionnaire_handlers::*;
pub use response_handlers::*;

// Shared items used by multiple handler modules.
use super::{errors::AppError, state::AppState};
