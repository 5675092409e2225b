//! Ingestion validation for profile submissions
//!
//! Pure field checks over the raw multipart text fields; no store access
//! and no side effects. The directory API rejects a submission that fails
//! here before either store is touched.

use std::collections::HashMap;

/// Required multipart text fields
pub const REQUIRED_FIELDS: [&str; 5] = ["name", "age", "gender", "bloodGroup", "dateOfBirth"];

/// A validated profile submission, ready for the document store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSubmission {
    pub name: String,
    pub age: String,
    pub gender: String,
    pub blood_group: String,
    pub date_of_birth: String,
    pub medical_conditions: Option<String>,
    pub health_insurance: Option<String>,
}

/// Validate raw submission fields.
///
/// A required field is missing when absent or empty; `name` must also be
/// non-empty after trimming. On failure the error lists every missing field
/// name. The name itself is kept verbatim (no trimming, no case folding),
/// so "Alice" and "alice" are distinct keys.
pub fn validate(fields: &HashMap<String, String>) -> Result<ProfileSubmission, Vec<String>> {
    let mut missing = Vec::new();

    for field in REQUIRED_FIELDS {
        let present = match fields.get(field) {
            Some(value) if field == "name" => !value.trim().is_empty(),
            Some(value) => !value.is_empty(),
            None => false,
        };
        if !present {
            missing.push(field.to_string());
        }
    }

    if !missing.is_empty() {
        return Err(missing);
    }

    Ok(ProfileSubmission {
        name: fields["name"].clone(),
        age: fields["age"].clone(),
        gender: fields["gender"].clone(),
        blood_group: fields["bloodGroup"].clone(),
        date_of_birth: fields["dateOfBirth"].clone(),
        medical_conditions: fields.get("medicalConditions").cloned(),
        health_insurance: fields.get("healthInsurance").cloned(),
    })
}
