//! Typed confirmation gate for destructive actions.
//!
//! Before a service is deactivated the user has to type a confirmation word. The
//! comparison trims surrounding whitespace and ignores case.

use log::info;

use crate::domain::errors::EnrollmentError;

pub const DEACTIVATION_CONFIRMATION: &str = "disable";

#[derive(Debug, Clone)]
pub struct ConfirmationGate {
    expected: String,
}

impl Default for ConfirmationGate {
    fn default() -> Self {
        Self::new(DEACTIVATION_CONFIRMATION)
    }
}

impl ConfirmationGate {
    pub fn new(expected: &str) -> Self {
        Self {
            expected: expected.trim().to_lowercase(),
        }
    }

    pub fn expected(&self) -> &str {
        &self.expected
    }

    pub fn is_confirmed(&self, typed: &str) -> bool {
        typed.trim().to_lowercase() == self.expected
    }

    pub fn check(&self, typed: &str) -> Result<(), EnrollmentError> {
        if self.is_confirmed(typed) {
            return Ok(());
        }
        info!("Deactivation confirmation did not match (length: {})", typed.trim().len());
        Err(EnrollmentError::invalid(format!(
            "Type \"{}\" to confirm",
            self.expected
        )))
    }
}
