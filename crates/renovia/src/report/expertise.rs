use super::writer::ReportWriter;
use super::{or_dash, ReportError};
use crate::records::expertise::scoring::{resolved_condition, resolved_score, room_score};
use crate::records::expertise::{Expertise, SystemAssessment};

const ROOM_COLUMNS: [(f32, &str); 6] = [
    (0.0, "Pièce"),
    (50.0, "Menuiseries"),
    (75.0, "Chauffage"),
    (97.0, "Humidité"),
    (119.0, "Ventilation"),
    (143.0, "Moyenne"),
];

fn rating(value: Option<u8>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v}/5"))
}

fn details_line(assessment: &SystemAssessment) -> Option<String> {
    if assessment.details.is_empty() {
        return None;
    }
    let parts: Vec<String> = assessment
        .details
        .iter()
        .map(|(key, value)| match value {
            serde_json::Value::String(text) => format!("{key}: {text}"),
            other => format!("{key}: {other}"),
        })
        .collect();
    Some(parts.join(", "))
}

/// Renders the inspection report with the resolved global evaluation.
pub fn expertise_pdf(expertise: &Expertise) -> Result<Vec<u8>, ReportError> {
    let content = &expertise.content;
    let mut writer = ReportWriter::new(&format!("Expertise {}", expertise.id))?;

    writer.title("Rapport d'expertise");
    writer.subtitle(&format!(
        "Référence {} | Statut {} | Créé le {}",
        expertise.id,
        content.status.label(),
        expertise.created_at.format("%d/%m/%Y")
    ));

    writer.heading("Bénéficiaire");
    writer.field("Nom", &content.beneficiary.name);
    writer.optional_field("Adresse", content.beneficiary.full_address().as_deref());
    writer.optional_field("Téléphone", content.beneficiary.phone.as_deref());
    writer.optional_field("Email", content.beneficiary.email.as_deref());
    if let Some(date) = content.visit_date {
        writer.field("Date de visite", &date.format("%d/%m/%Y").to_string());
    }

    let building = &content.building;
    writer.heading("Logement");
    writer.field("Type", building.kind.label());
    writer.field(
        "Année de construction",
        &or_dash(building.construction_year.map(|y| y.to_string())),
    );
    writer.field(
        "Surface habitable",
        &or_dash(building.living_area.map(|a| format!("{a:.0} m²"))),
    );
    writer.field(
        "Nombre de niveaux",
        &or_dash(building.floors.map(|f| f.to_string())),
    );

    writer.heading("Diagnostic par poste");
    for (label, assessment) in content.assessments.labelled() {
        let condition = assessment
            .condition
            .map_or("Non évalué", |condition| condition.label());
        writer.field(label, condition);
        writer.optional_field("  Détails", details_line(assessment).as_deref());
        writer.optional_field("  Commentaire", assessment.comment.as_deref());
    }

    let evaluations = &content.evaluations;
    writer.heading("Évaluation par pièce");
    if evaluations.rooms.is_empty() {
        writer.paragraph("Aucune pièce évaluée.");
    } else {
        writer.row(&ROOM_COLUMNS, true);
        for (room, ratings) in &evaluations.rooms {
            let average = room_score(ratings).map_or_else(|| "-".to_string(), |s| format!("{s:.1}"));
            let cells = [
                rating(ratings.windows),
                rating(ratings.heating),
                rating(ratings.humidity),
                rating(ratings.ventilation),
                average,
            ];
            writer.row(
                &[
                    (ROOM_COLUMNS[0].0, room.as_str()),
                    (ROOM_COLUMNS[1].0, cells[0].as_str()),
                    (ROOM_COLUMNS[2].0, cells[1].as_str()),
                    (ROOM_COLUMNS[3].0, cells[2].as_str()),
                    (ROOM_COLUMNS[4].0, cells[3].as_str()),
                    (ROOM_COLUMNS[5].0, cells[4].as_str()),
                ],
                false,
            );
        }
    }

    writer.heading("Évaluation globale");
    writer.field("Note globale", &format!("{:.1} / 5", resolved_score(evaluations)));
    writer.field("État général", resolved_condition(evaluations).label());
    writer.optional_field("Commentaire", evaluations.global.comment.as_deref());

    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::expertise::{Condition, ExpertiseDraft, RoomRatings};
    use crate::records::Beneficiary;
    use chrono::Utc;

    fn expertise(rooms: usize) -> Expertise {
        let mut content = ExpertiseDraft {
            beneficiary: Beneficiary {
                name: "Mme Bernard".to_string(),
                city: Some("Nantes".to_string()),
                ..Beneficiary::default()
            },
            ..ExpertiseDraft::default()
        };
        content.assessments.roof.condition = Some(Condition::Mauvais);
        content
            .assessments
            .roof
            .details
            .insert("couverture".to_string(), serde_json::json!("tuiles"));
        for index in 0..rooms {
            content.evaluations.rooms.insert(
                format!("piece-{index:02}"),
                RoomRatings {
                    windows: Some(3),
                    heating: Some(4),
                    humidity: None,
                    ventilation: Some(2),
                },
            );
        }
        let now = Utc::now();
        Expertise {
            id: "exp-1".to_string(),
            content,
            created_by: "u1".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn renders_a_pdf_document() {
        let bytes = expertise_pdf(&expertise(3)).expect("renders");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn renders_without_any_room() {
        let bytes = expertise_pdf(&expertise(0)).expect("renders");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn details_are_flattened_in_key_order() {
        let mut assessment = SystemAssessment::default();
        assert_eq!(details_line(&assessment), None);
        assessment
            .details
            .insert("vitrage".to_string(), serde_json::json!("double"));
        assessment
            .details
            .insert("age".to_string(), serde_json::json!(12));
        assert_eq!(
            details_line(&assessment).as_deref(),
            Some("age: 12, vitrage: double")
        );
    }
}
