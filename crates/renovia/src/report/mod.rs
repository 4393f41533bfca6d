//! PDF exports for expertises and subsidy applications.

mod expertise;
mod pda;
mod writer;

use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

pub use expertise::expertise_pdf;
pub use pda::pda_pdf;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("pdf rendering failed: {0}")]
    Render(String),
}

/// Download response for a rendered report.
pub fn pdf_attachment(filename: String, bytes: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, mime::APPLICATION_PDF.to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

pub(crate) fn euros(amount: f64) -> String {
    format!("{amount:.2} €").replace('.', ",")
}

pub(crate) fn or_dash(value: Option<String>) -> String {
    value.unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachment_sets_pdf_headers() {
        let response = pdf_attachment("pda-42.pdf".to_string(), b"%PDF-1.3".to_vec());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[CONTENT_DISPOSITION],
            "attachment; filename=\"pda-42.pdf\""
        );
    }

    #[test]
    fn euros_use_french_decimal_separator() {
        assert_eq!(euros(2857.0), "2857,00 €");
        assert_eq!(euros(3527.156), "3527,16 €");
    }
}
