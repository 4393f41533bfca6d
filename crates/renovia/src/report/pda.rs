use super::writer::ReportWriter;
use super::{euros, ReportError};
use crate::records::pda::Pda;

/// Renders a subsidy application summary. Amounts come straight from the stored record.
pub fn pda_pdf(pda: &Pda) -> Result<Vec<u8>, ReportError> {
    let content = &pda.content;
    let mut writer = ReportWriter::new(&format!("Plan d'aide {}", pda.id))?;

    writer.title("Plan d'aide");
    writer.subtitle(&format!(
        "{} | Statut {} | Créé le {}",
        content.title,
        content.status.label(),
        pda.created_at.format("%d/%m/%Y")
    ));

    writer.heading("Bénéficiaire");
    writer.field("Nom", &content.beneficiary.name);
    writer.optional_field("Adresse", content.beneficiary.full_address().as_deref());
    writer.optional_field("Téléphone", content.beneficiary.phone.as_deref());
    writer.optional_field("Email", content.beneficiary.email.as_deref());

    writer.heading("Projet");
    writer.field("Intitulé", &content.title);
    writer.optional_field("Type de travaux", Some(content.improvement_type.as_str()));

    writer.heading("Financement");
    writer.field("Revenu fiscal de référence", &euros(content.fiscal_income));
    writer.field("Coût estimé des travaux", &euros(content.estimated_cost));
    writer.field("Montant de l'aide", &euros(pda.grant_amount));
    writer.field(
        "Reste à charge",
        &euros((content.estimated_cost - pda.grant_amount).max(0.0)),
    );

    if let Some(notes) = content.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        writer.heading("Notes");
        writer.paragraph(notes);
    }

    writer.finish()
}
