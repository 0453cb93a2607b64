use serde::{Deserialize, Serialize};
use shared::StaffRole;

/// A staff directory entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StaffMember {
    pub staff_id: String,
    pub first_name: String,
    pub last_name: String,
    pub role: StaffRole,
    pub specializations: Vec<String>,
}

impl StaffMember {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    /// Case-insensitive match against the service name
    pub fn specializes_in(&self, service_name: &str) -> bool {
        let wanted = service_name.trim().to_lowercase();
        self.specializations
            .iter()
            .any(|s| s.trim().to_lowercase() == wanted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_and_specialization() {
        let member = StaffMember {
            staff_id: "staff::1".to_string(),
            first_name: "Ana ".to_string(),
            last_name: "Lopez".to_string(),
            role: StaffRole::Therapist,
            specializations: vec!["Speech Therapy".to_string(), "Occupational Therapy".to_string()],
        };

        assert_eq!(member.display_name(), "Ana Lopez");
        assert!(member.specializes_in("speech therapy"));
        assert!(!member.specializes_in("Music Class"));
    }
}
