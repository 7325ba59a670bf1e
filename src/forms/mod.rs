//! Input forms
//!
//! A form holds the values being edited, validates them, submits them
//! through the API client and keeps a single error message for display.
//! Validation failures never reach the network.

pub mod auth;
pub mod game;
pub mod purchase;
pub mod transfer;
pub mod usage;

pub use auth::{LoginForm, RegisterForm, PASSWORD_MAX_LEN, PASSWORD_MIN_LEN};
pub use game::{CartridgeRow, GameForm};
pub use purchase::{PurchaseForm, TypeChoice};
pub use transfer::TransferForm;
pub use usage::UsageForm;

use thiserror::Error;

use crate::api::ApiError;
use crate::pages::Route;

/// Longest note or location the API stores
pub const MAX_TEXT_LEN: usize = 255;

/// Why a form could not be submitted
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    /// A field failed client-side validation
    #[error("{message}")]
    Invalid { field: &'static str, message: String },

    /// There is nothing in stock to move
    #[error("You have no cartridges in stock to {0}")]
    NoStock(&'static str),

    /// The server refused the submission
    #[error("{0}")]
    Server(String),

    /// The session ended while submitting
    #[error("Session expired, please log in again")]
    SessionExpired,
}

impl FormError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        FormError::Invalid {
            field,
            message: message.into(),
        }
    }

    /// Map an API failure to the message the form shows
    pub fn from_api(err: ApiError, fallback: &str) -> Self {
        if err.is_unauthorized() {
            return FormError::SessionExpired;
        }
        tracing::error!(error = %err, "Form submission failed");
        FormError::Server(err.user_message(fallback))
    }

    /// Field the error belongs to, if it is a validation error
    pub fn field(&self) -> Option<&'static str> {
        match self {
            FormError::Invalid { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Where to go after this error; only an expired session navigates
    pub fn redirect(&self) -> Option<Route> {
        match self {
            FormError::SessionExpired => Some(Route::Login),
            _ => None,
        }
    }
}

/// A successful submission and the route to show next
#[derive(Debug, Clone, PartialEq)]
pub struct Submitted<T> {
    pub value: T,
    pub next: Route,
}

/// Keep the message of a failed step on the form
pub(crate) fn track<T>(error: &mut Option<String>, result: Result<T, FormError>) -> Result<T, FormError> {
    match &result {
        Ok(_) => *error = None,
        Err(e) => *error = Some(e.to_string()),
    }
    result
}
