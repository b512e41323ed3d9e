//! The in-progress order collected across the wizard steps.

use serde::{Deserialize, Serialize};

use crate::catalog::SizeCode;
use crate::image::ImageUpload;
use crate::types::PhoneNumber;

/// Customer contact details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalData {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Optional; constrained to phone characters at entry.
    pub phone: PhoneNumber,
}

/// Where the printed certificate is shipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingData {
    pub address: String,
    pub city: String,
    pub postal_code: String,
    /// One of [`crate::country::COUNTRIES`], or empty while unselected.
    pub country: String,
}

/// A single input of the details step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    FirstName,
    LastName,
    Email,
    Phone,
    Notes,
    Address,
    City,
    PostalCode,
    Country,
}

impl Field {
    /// Fields that must be non-empty to leave the details step.
    pub const REQUIRED_DETAILS: [Self; 7] = [
        Self::FirstName,
        Self::LastName,
        Self::Email,
        Self::Address,
        Self::City,
        Self::PostalCode,
        Self::Country,
    ];

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FirstName => "First name",
            Self::LastName => "Last name",
            Self::Email => "Email",
            Self::Phone => "Phone",
            Self::Notes => "Special notes",
            Self::Address => "Address",
            Self::City => "City",
            Self::PostalCode => "Postal code",
            Self::Country => "Country",
        }
    }
}

/// Everything the customer has entered so far.
///
/// Lives only as long as the wizard that owns it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderDraft {
    pub image: Option<ImageUpload>,
    pub size: Option<SizeCode>,
    pub personal: PersonalData,
    pub notes: String,
    pub shipping: ShippingData,
}

impl OrderDraft {
    /// Current value of a details field.
    #[must_use]
    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::FirstName => &self.personal.first_name,
            Field::LastName => &self.personal.last_name,
            Field::Email => &self.personal.email,
            Field::Phone => self.personal.phone.as_str(),
            Field::Notes => &self.notes,
            Field::Address => &self.shipping.address,
            Field::City => &self.shipping.city,
            Field::PostalCode => &self.shipping.postal_code,
            Field::Country => &self.shipping.country,
        }
    }

    /// Required details fields that are still empty.
    #[must_use]
    pub fn missing_details(&self) -> Vec<Field> {
        Field::REQUIRED_DETAILS
            .into_iter()
            .filter(|f| self.field(*f).is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_draft_misses_all_required_details() {
        let draft = OrderDraft::default();
        assert_eq!(draft.missing_details(), Field::REQUIRED_DETAILS.to_vec());
    }

    #[test]
    fn test_optional_fields_are_not_required() {
        assert!(!Field::REQUIRED_DETAILS.contains(&Field::Phone));
        assert!(!Field::REQUIRED_DETAILS.contains(&Field::Notes));
    }

    #[test]
    fn test_personal_data_serializes_camel_case() {
        let personal = PersonalData {
            first_name: "Ada".to_string(),
            ..PersonalData::default()
        };
        let json = serde_json::to_value(&personal).unwrap_or_default();
        assert_eq!(json["firstName"], "Ada");
        assert_eq!(json["phone"], "");
    }

    #[test]
    fn test_personal_data_rejects_bad_phone() {
        let json = serde_json::json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com",
            "phone": "555-CALL-NOW",
        });
        assert!(serde_json::from_value::<PersonalData>(json).is_err());
    }
}
