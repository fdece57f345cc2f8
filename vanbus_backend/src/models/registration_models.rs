use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Everything the registration wizard collects. Text fields start empty,
/// checkboxes start unchecked.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct RegistrationSubmission {
    // Student
    pub student_first_name: String,
    pub student_last_name: String,
    pub date_of_birth: String,
    pub grade: String,
    pub school: String,
    pub student_address: String,
    // Parent / guardian
    pub parent_first_name: String,
    pub parent_last_name: String,
    pub parent_phone: String,
    pub parent_email: String,
    pub emergency_contact: String,
    pub emergency_phone: String,
    // Transportation
    pub service_type: String,
    pub pickup_address: String,
    pub dropoff_address: String,
    pub preferred_pickup_time: String,
    // Medical & agreement
    pub medical_conditions: String,
    pub medications: String,
    pub special_needs: String,
    pub terms_accepted: bool,
    pub photo_permission: bool,
}

impl RegistrationSubmission {
    pub fn is_blank(&self) -> bool {
        *self == RegistrationSubmission::default()
    }

    /// Text value of a field; checkbox fields return `None`.
    pub fn text(&self, field: Field) -> Option<&str> {
        let value = match field {
            Field::StudentFirstName => &self.student_first_name,
            Field::StudentLastName => &self.student_last_name,
            Field::DateOfBirth => &self.date_of_birth,
            Field::Grade => &self.grade,
            Field::School => &self.school,
            Field::StudentAddress => &self.student_address,
            Field::ParentFirstName => &self.parent_first_name,
            Field::ParentLastName => &self.parent_last_name,
            Field::ParentPhone => &self.parent_phone,
            Field::ParentEmail => &self.parent_email,
            Field::EmergencyContact => &self.emergency_contact,
            Field::EmergencyPhone => &self.emergency_phone,
            Field::ServiceType => &self.service_type,
            Field::PickupAddress => &self.pickup_address,
            Field::DropoffAddress => &self.dropoff_address,
            Field::PreferredPickupTime => &self.preferred_pickup_time,
            Field::MedicalConditions => &self.medical_conditions,
            Field::Medications => &self.medications,
            Field::SpecialNeeds => &self.special_needs,
            Field::TermsAccepted | Field::PhotoPermission => return None,
        };
        Some(value.as_str())
    }

    fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        let value = match field {
            Field::StudentFirstName => &mut self.student_first_name,
            Field::StudentLastName => &mut self.student_last_name,
            Field::DateOfBirth => &mut self.date_of_birth,
            Field::Grade => &mut self.grade,
            Field::School => &mut self.school,
            Field::StudentAddress => &mut self.student_address,
            Field::ParentFirstName => &mut self.parent_first_name,
            Field::ParentLastName => &mut self.parent_last_name,
            Field::ParentPhone => &mut self.parent_phone,
            Field::ParentEmail => &mut self.parent_email,
            Field::EmergencyContact => &mut self.emergency_contact,
            Field::EmergencyPhone => &mut self.emergency_phone,
            Field::ServiceType => &mut self.service_type,
            Field::PickupAddress => &mut self.pickup_address,
            Field::DropoffAddress => &mut self.dropoff_address,
            Field::PreferredPickupTime => &mut self.preferred_pickup_time,
            Field::MedicalConditions => &mut self.medical_conditions,
            Field::Medications => &mut self.medications,
            Field::SpecialNeeds => &mut self.special_needs,
            Field::TermsAccepted | Field::PhotoPermission => return None,
        };
        Some(value)
    }

    pub fn flag(&self, field: Field) -> Option<bool> {
        match field {
            Field::TermsAccepted => Some(self.terms_accepted),
            Field::PhotoPermission => Some(self.photo_permission),
            _ => None,
        }
    }

    /// Stores a text value. Returns `false` when `field` is a checkbox.
    pub fn set_text(&mut self, field: Field, value: &str) -> bool {
        match self.text_mut(field) {
            Some(slot) => {
                *slot = value.to_string();
                true
            }
            None => false,
        }
    }

    /// Stores a checkbox value. Returns `false` when `field` is a text field.
    pub fn set_flag(&mut self, field: Field, value: bool) -> bool {
        match field {
            Field::TermsAccepted => self.terms_accepted = value,
            Field::PhotoPermission => self.photo_permission = value,
            _ => return false,
        }
        true
    }
}

/// Every input of the registration form, named as the form posts them.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    StudentFirstName,
    StudentLastName,
    DateOfBirth,
    Grade,
    School,
    StudentAddress,
    ParentFirstName,
    ParentLastName,
    ParentPhone,
    ParentEmail,
    EmergencyContact,
    EmergencyPhone,
    ServiceType,
    PickupAddress,
    DropoffAddress,
    PreferredPickupTime,
    MedicalConditions,
    Medications,
    SpecialNeeds,
    TermsAccepted,
    PhotoPermission,
}

impl Field {
    pub const ALL: [Field; 21] = [
        Field::StudentFirstName,
        Field::StudentLastName,
        Field::DateOfBirth,
        Field::Grade,
        Field::School,
        Field::StudentAddress,
        Field::ParentFirstName,
        Field::ParentLastName,
        Field::ParentPhone,
        Field::ParentEmail,
        Field::EmergencyContact,
        Field::EmergencyPhone,
        Field::ServiceType,
        Field::PickupAddress,
        Field::DropoffAddress,
        Field::PreferredPickupTime,
        Field::MedicalConditions,
        Field::Medications,
        Field::SpecialNeeds,
        Field::TermsAccepted,
        Field::PhotoPermission,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::StudentFirstName => "student_first_name",
            Field::StudentLastName => "student_last_name",
            Field::DateOfBirth => "date_of_birth",
            Field::Grade => "grade",
            Field::School => "school",
            Field::StudentAddress => "student_address",
            Field::ParentFirstName => "parent_first_name",
            Field::ParentLastName => "parent_last_name",
            Field::ParentPhone => "parent_phone",
            Field::ParentEmail => "parent_email",
            Field::EmergencyContact => "emergency_contact",
            Field::EmergencyPhone => "emergency_phone",
            Field::ServiceType => "service_type",
            Field::PickupAddress => "pickup_address",
            Field::DropoffAddress => "dropoff_address",
            Field::PreferredPickupTime => "preferred_pickup_time",
            Field::MedicalConditions => "medical_conditions",
            Field::Medications => "medications",
            Field::SpecialNeeds => "special_needs",
            Field::TermsAccepted => "terms_accepted",
            Field::PhotoPermission => "photo_permission",
        }
    }

    pub fn is_flag(&self) -> bool {
        matches!(self, Field::TermsAccepted | Field::PhotoPermission)
    }

    /// The wizard step that owns this field.
    pub fn step(&self) -> Step {
        match self {
            Field::StudentFirstName
            | Field::StudentLastName
            | Field::DateOfBirth
            | Field::Grade
            | Field::School
            | Field::StudentAddress => Step::StudentInfo,
            Field::ParentFirstName
            | Field::ParentLastName
            | Field::ParentPhone
            | Field::ParentEmail
            | Field::EmergencyContact
            | Field::EmergencyPhone => Step::GuardianInfo,
            Field::ServiceType
            | Field::PickupAddress
            | Field::DropoffAddress
            | Field::PreferredPickupTime => Step::TransportPrefs,
            Field::MedicalConditions
            | Field::Medications
            | Field::SpecialNeeds
            | Field::TermsAccepted
            | Field::PhotoPermission => Step::ConsentAndSubmit,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownField(pub String);

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// The four ordered pages of the wizard.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    StudentInfo,
    GuardianInfo,
    TransportPrefs,
    ConsentAndSubmit,
}

impl Step {
    pub const ALL: [Step; 4] = [
        Step::StudentInfo,
        Step::GuardianInfo,
        Step::TransportPrefs,
        Step::ConsentAndSubmit,
    ];

    /// 1-based position shown by the step indicator.
    pub fn number(&self) -> u8 {
        match self {
            Step::StudentInfo => 1,
            Step::GuardianInfo => 2,
            Step::TransportPrefs => 3,
            Step::ConsentAndSubmit => 4,
        }
    }

    pub fn next(&self) -> Option<Step> {
        match self {
            Step::StudentInfo => Some(Step::GuardianInfo),
            Step::GuardianInfo => Some(Step::TransportPrefs),
            Step::TransportPrefs => Some(Step::ConsentAndSubmit),
            Step::ConsentAndSubmit => None,
        }
    }

    pub fn previous(&self) -> Option<Step> {
        match self {
            Step::StudentInfo => None,
            Step::GuardianInfo => Some(Step::StudentInfo),
            Step::TransportPrefs => Some(Step::GuardianInfo),
            Step::ConsentAndSubmit => Some(Step::TransportPrefs),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Step::StudentInfo => "Student Information",
            Step::GuardianInfo => "Parent/Guardian Information",
            Step::TransportPrefs => "Transportation Details",
            Step::ConsentAndSubmit => "Medical Information & Agreement",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Step::StudentInfo => "Enter your child's basic information and school details.",
            Step::GuardianInfo => "Provide parent/guardian and emergency contact information.",
            Step::TransportPrefs => "Specify pickup, drop-off locations and service preferences.",
            Step::ConsentAndSubmit => "Add any medical information and accept our terms of service.",
        }
    }

    /// Fields validated when leaving this step.
    pub fn fields(&self) -> Vec<Field> {
        Field::ALL.iter().copied().filter(|f| f.step() == *self).collect()
    }
}

pub const GRADE_OPTIONS: &[&str] = &[
    "pre-k", "k", "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12",
];
pub const SERVICE_TYPE_OPTIONS: &[&str] = &["daily-route", "field-trip", "private", "special-needs"];
pub const PICKUP_TIME_OPTIONS: &[&str] = &["6:30", "7:00", "7:30", "8:00", "8:30", "flexible"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_round_trip_through_from_str() {
        for field in Field::ALL {
            assert_eq!(field.as_str().parse::<Field>(), Ok(field));
        }
        assert_eq!("nickname".parse::<Field>(), Err(UnknownField("nickname".to_string())));
    }

    #[test]
    fn steps_own_the_expected_field_groups() {
        assert_eq!(Step::StudentInfo.fields().len(), 6);
        assert_eq!(Step::GuardianInfo.fields().len(), 6);
        assert_eq!(Step::TransportPrefs.fields().len(), 4);
        assert!(Step::ConsentAndSubmit.fields().contains(&Field::TermsAccepted));
    }

    #[test]
    fn setters_reject_the_wrong_kind_of_field() {
        let mut data = RegistrationSubmission::default();
        assert!(!data.set_text(Field::TermsAccepted, "yes"));
        assert!(!data.set_flag(Field::School, true));
        assert!(data.set_text(Field::School, "St. Paul's"));
        assert!(data.set_flag(Field::PhotoPermission, true));
        assert_eq!(data.text(Field::School), Some("St. Paul's"));
        assert_eq!(data.flag(Field::PhotoPermission), Some(true));
        assert!(!data.is_blank());
    }
}
