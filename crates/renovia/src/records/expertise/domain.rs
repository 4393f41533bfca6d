use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::scoring::GlobalCondition;
use crate::records::{Beneficiary, RecordStatus};
use crate::store::Document;

/// Qualitative state of a building system observed during the visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    Bon,
    Moyen,
    Mauvais,
}

impl Condition {
    pub fn label(&self) -> &'static str {
        match self {
            Condition::Bon => "Bon",
            Condition::Moyen => "Moyen",
            Condition::Mauvais => "Mauvais",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildingType {
    #[default]
    Maison,
    Appartement,
    Immeuble,
    Autre,
}

impl BuildingType {
    pub fn label(&self) -> &'static str {
        match self {
            BuildingType::Maison => "Maison",
            BuildingType::Appartement => "Appartement",
            BuildingType::Immeuble => "Immeuble",
            BuildingType::Autre => "Autre",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    #[serde(rename = "type", default)]
    pub kind: BuildingType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub construction_year: Option<i32>,
    /// Living area in square meters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub living_area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floors: Option<u8>,
}

/// Observation of one building system: a condition tag plus free-form details
/// (glazing type, boiler brand, moisture readings, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemAssessment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessments {
    #[serde(default)]
    pub openings: SystemAssessment,
    #[serde(default)]
    pub heating: SystemAssessment,
    #[serde(default)]
    pub humidity: SystemAssessment,
    #[serde(default)]
    pub facade: SystemAssessment,
    #[serde(default)]
    pub electrical_panel: SystemAssessment,
    #[serde(default)]
    pub ventilation: SystemAssessment,
    #[serde(default)]
    pub insulation: SystemAssessment,
    #[serde(default)]
    pub framework: SystemAssessment,
    #[serde(default)]
    pub roof: SystemAssessment,
}

impl Assessments {
    /// Systems in report order with their display labels.
    pub fn labelled(&self) -> [(&'static str, &SystemAssessment); 9] {
        [
            ("Menuiseries", &self.openings),
            ("Chauffage", &self.heating),
            ("Humidité", &self.humidity),
            ("Façade", &self.facade),
            ("Tableau électrique", &self.electrical_panel),
            ("Ventilation", &self.ventilation),
            ("Isolation", &self.insulation),
            ("Charpente", &self.framework),
            ("Toiture", &self.roof),
        ]
    }
}

/// Ratings (1 to 5) recorded for one room; absent fields were not rated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRatings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub windows: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ventilation: Option<u8>,
}

impl RoomRatings {
    pub fn present(&self) -> impl Iterator<Item = u8> {
        [self.windows, self.heating, self.humidity, self.ventilation]
            .into_iter()
            .flatten()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalEvaluation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<GlobalCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Evaluations {
    #[serde(default)]
    pub rooms: BTreeMap<String, RoomRatings>,
    #[serde(default)]
    pub global: GlobalEvaluation,
}

/// Client payload for create and full-document update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpertiseDraft {
    #[serde(default)]
    pub status: RecordStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visit_date: Option<NaiveDate>,
    pub beneficiary: Beneficiary,
    #[serde(default)]
    pub building: Building,
    #[serde(default)]
    pub assessments: Assessments,
    #[serde(default)]
    pub evaluations: Evaluations,
}

impl ExpertiseDraft {
    pub fn validate(&self, today: NaiveDate) -> Result<(), String> {
        self.beneficiary.validate()?;

        if let Some(year) = self.building.construction_year {
            if year > today.year() {
                return Err(format!("construction year {year} is in the future"));
            }
        }
        if let Some(area) = self.building.living_area {
            if !area.is_finite() || area < 0.0 {
                return Err("living area must be a positive number".to_string());
            }
        }

        for (room, ratings) in &self.evaluations.rooms {
            if let Some(rating) = ratings.present().find(|r| !(1..=5).contains(r)) {
                return Err(format!(
                    "rating {rating} for room '{room}' is outside the 1-5 scale"
                ));
            }
        }
        if let Some(score) = self.evaluations.global.score {
            if !(0.0..=5.0).contains(&score) {
                return Err(format!("global score {score} is outside the 0-5 scale"));
            }
        }
        Ok(())
    }
}

/// Stored inspection report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expertise {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub content: ExpertiseDraft,
    pub created_by: String,
    #[serde(with = "crate::store::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::store::timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Document for Expertise {
    const COLLECTION: &'static str = "expertises";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ExpertiseDraft {
        ExpertiseDraft {
            beneficiary: Beneficiary {
                name: "Mme Lemoine".to_string(),
                ..Beneficiary::default()
            },
            ..ExpertiseDraft::default()
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date")
    }

    #[test]
    fn explicit_global_score_stays_on_the_rating_scale() {
        let mut scored = draft();
        for accepted in [0.0, 2.5, 5.0] {
            scored.evaluations.global.score = Some(accepted);
            assert!(scored.validate(today()).is_ok(), "{accepted}");
        }
        for rejected in [42.0, 5.01, -0.5, f64::NAN] {
            scored.evaluations.global.score = Some(rejected);
            assert!(scored.validate(today()).is_err(), "{rejected}");
        }
    }

    #[test]
    fn construction_year_cannot_be_in_the_future() {
        let mut future = draft();
        future.building.construction_year = Some(2026);
        assert!(future.validate(today()).is_err());
        future.building.construction_year = Some(2025);
        assert!(future.validate(today()).is_ok());
    }
}
