use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::records::{Beneficiary, RecordStatus};
use crate::store::Document;

/// Client payload for create and full-document update.
///
/// Any `grantAmount` sent by the client is ignored; the server recomputes it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdaDraft {
    pub title: String,
    #[serde(default)]
    pub status: RecordStatus,
    pub beneficiary: Beneficiary,
    /// Kind of works funded, e.g. "Isolation" or "Chauffage".
    #[serde(default)]
    pub improvement_type: String,
    #[serde(default)]
    pub fiscal_income: f64,
    #[serde(default)]
    pub estimated_cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Upper bound accepted for any amount of an application, in euros.
pub const MAX_AMOUNT: f64 = 1_000_000_000.0;

impl PdaDraft {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title is required".to_string());
        }
        self.beneficiary.validate()?;
        for (label, value) in [
            ("fiscal income", self.fiscal_income),
            ("estimated cost", self.estimated_cost),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{label} must be a positive amount"));
            }
            if value > MAX_AMOUNT {
                return Err(format!("{label} exceeds {MAX_AMOUNT} €"));
            }
        }
        Ok(())
    }
}

/// Stored subsidy application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pda {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub content: PdaDraft,
    pub grant_amount: f64,
    pub created_by: String,
    #[serde(with = "crate::store::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::store::timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Document for Pda {
    const COLLECTION: &'static str = "pdas";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
