//! Expertise reports and subsidy applications owned by agents.

pub mod expertise;
pub mod pda;

use serde::{Deserialize, Serialize};

/// Lifecycle tag set directly by edits; any value may follow any other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordStatus {
    #[default]
    #[serde(rename = "En cours", alias = "en_cours")]
    InProgress,
    #[serde(rename = "Terminé", alias = "termine", alias = "Termine")]
    Completed,
}

impl RecordStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RecordStatus::InProgress => "En cours",
            RecordStatus::Completed => "Terminé",
        }
    }
}

/// Contact details of the household a record concerns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Beneficiary {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Beneficiary {
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("beneficiary name is required".to_string());
        }
        Ok(())
    }

    /// Single-line postal address, skipping missing parts.
    pub fn full_address(&self) -> Option<String> {
        let locality = [self.postal_code.as_deref(), self.city.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        let parts: Vec<&str> = [self.address.as_deref(), Some(locality.as_str())]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_french_labels_on_the_wire() {
        assert_eq!(
            serde_json::to_value(RecordStatus::Completed).unwrap(),
            "Terminé"
        );
        let parsed: RecordStatus = serde_json::from_str("\"En cours\"").unwrap();
        assert_eq!(parsed, RecordStatus::InProgress);
        let alias: RecordStatus = serde_json::from_str("\"termine\"").unwrap();
        assert_eq!(alias, RecordStatus::Completed);
    }

    #[test]
    fn full_address_joins_present_parts() {
        let beneficiary = Beneficiary {
            name: "M. Martin".to_string(),
            address: Some("12 rue des Lilas".to_string()),
            postal_code: Some("69003".to_string()),
            city: Some("Lyon".to_string()),
            ..Beneficiary::default()
        };
        assert_eq!(
            beneficiary.full_address().as_deref(),
            Some("12 rue des Lilas, 69003 Lyon")
        );

        let bare = Beneficiary {
            name: "Mme Petit".to_string(),
            ..Beneficiary::default()
        };
        assert_eq!(bare.full_address(), None);
        assert!(bare.validate().is_ok());
        assert!(Beneficiary::default().validate().is_err());
    }
}
