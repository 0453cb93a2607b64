//! Deactivation reason choices.
//!
//! The deactivate modal offers a configurable list of labels plus "other". A label
//! is persisted exactly as displayed; "other" persists the typed text instead.

use shared::OTHER_REASON;

use crate::domain::errors::EnrollmentError;

pub fn default_deactivation_labels() -> Vec<String> {
    [
        "Goals met",
        "Family request",
        "Schedule conflict",
        "Moved out of area",
        "Funding ended",
        "Transferred to another provider",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeactivationReasons {
    labels: Vec<String>,
}

impl Default for DeactivationReasons {
    fn default() -> Self {
        Self::new(default_deactivation_labels())
    }
}

impl DeactivationReasons {
    /// Blank labels and a literal "other" entry are dropped; "other" is always offered
    pub fn new(labels: Vec<String>) -> Self {
        let labels = labels
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty() && !l.eq_ignore_ascii_case(OTHER_REASON))
            .collect();
        Self { labels }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Labels as offered in the modal, "other" last
    pub fn choices(&self) -> Vec<String> {
        let mut choices = self.labels.clone();
        choices.push(OTHER_REASON.to_string());
        choices
    }

    /// The value to store as the enrollment's status change reason
    pub fn resolve(&self, selected: &str, other_text: Option<&str>) -> Result<String, EnrollmentError> {
        let selected = selected.trim();
        if selected.is_empty() {
            return Err(EnrollmentError::invalid("Please select a reason for deactivating this service"));
        }

        if selected.eq_ignore_ascii_case(OTHER_REASON) {
            return match other_text.map(str::trim).filter(|t| !t.is_empty()) {
                Some(text) => Ok(text.to_string()),
                None => Err(EnrollmentError::invalid("Please describe the reason for deactivating this service")),
            };
        }

        self.labels
            .iter()
            .find(|label| label.as_str() == selected)
            .cloned()
            .ok_or_else(|| EnrollmentError::invalid(format!("Unknown deactivation reason: {}", selected)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_stored_verbatim() {
        let reasons = DeactivationReasons::default();
        assert_eq!(reasons.resolve("Goals met", None).unwrap(), "Goals met");
        assert_eq!(reasons.resolve(" Funding ended ", Some("ignored")).unwrap(), "Funding ended");
    }

    #[test]
    fn test_other_uses_free_text() {
        let reasons = DeactivationReasons::default();
        assert_eq!(
            reasons.resolve("other", Some("  Child aged out of the program ")).unwrap(),
            "Child aged out of the program"
        );
        assert!(reasons.resolve("other", Some("   ")).is_err());
        assert!(reasons.resolve("other", None).is_err());
    }

    #[test]
    fn test_unknown_or_empty_selection_rejected() {
        let reasons = DeactivationReasons::default();
        assert!(reasons.resolve("", None).is_err());
        assert!(reasons.resolve("Because", None).is_err());
    }

    #[test]
    fn test_configured_labels() {
        let reasons = DeactivationReasons::new(vec![
            "Completed program".to_string(),
            " ".to_string(),
            "Other".to_string(),
        ]);
        assert_eq!(reasons.choices(), vec!["Completed program".to_string(), "other".to_string()]);
        assert!(reasons.resolve("Goals met", None).is_err());
    }
}
