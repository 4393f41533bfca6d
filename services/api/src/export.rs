use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Args, ValueEnum};
use renovia::config::AppConfig;
use renovia::error::AppError;
use renovia::records::expertise::scoring::fill_derived;
use renovia::records::expertise::{Expertise, ExpertiseDraft};
use renovia::records::pda::{grant_amount, Pda, PdaDraft};
use renovia::report::{expertise_pdf, pda_pdf};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

const OFFLINE_AUTHOR: &str = "offline-export";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ExportKind {
    Expertise,
    Pda,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// Kind of document contained in the input file
    #[arg(long, value_enum)]
    pub(crate) kind: ExportKind,
    /// JSON file holding a stored record, an API response envelope, or a bare draft
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Destination of the rendered PDF
    #[arg(long)]
    pub(crate) output: PathBuf,
}

/// Stored record first, so that ids and owners survive; a bare draft otherwise.
#[derive(Deserialize)]
#[serde(untagged)]
enum Input<R, D> {
    Record(R),
    Draft(D),
}

fn parse<T: DeserializeOwned>(raw: &str) -> Result<T, AppError> {
    let mut value: Value =
        serde_json::from_str(raw).map_err(|err| AppError::Input(err.to_string()))?;
    if value.get("success").is_some() {
        value = value
            .get_mut("data")
            .map(Value::take)
            .ok_or_else(|| AppError::Input("response envelope carries no data".to_string()))?;
    }
    serde_json::from_value(value).map_err(|err| AppError::Input(err.to_string()))
}

fn document_id(input: &Path) -> String {
    input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("export")
        .to_string()
}

pub(crate) fn load_expertise(raw: &str, id: &str) -> Result<Expertise, AppError> {
    match parse::<Input<Expertise, ExpertiseDraft>>(raw)? {
        Input::Record(expertise) => Ok(expertise),
        Input::Draft(mut content) => {
            content
                .validate(Utc::now().date_naive())
                .map_err(AppError::Input)?;
            fill_derived(&mut content.evaluations);
            let now = Utc::now();
            Ok(Expertise {
                id: id.to_string(),
                content,
                created_by: OFFLINE_AUTHOR.to_string(),
                created_at: now,
                updated_at: now,
            })
        }
    }
}

/// Drafts get their grant computed with the configured ratio; stored records keep theirs.
pub(crate) fn load_pda(raw: &str, id: &str, grant_ratio: f64) -> Result<Pda, AppError> {
    match parse::<Input<Pda, PdaDraft>>(raw)? {
        Input::Record(pda) => Ok(pda),
        Input::Draft(content) => {
            content.validate().map_err(AppError::Input)?;
            let now = Utc::now();
            Ok(Pda {
                id: id.to_string(),
                grant_amount: grant_amount(content.estimated_cost, grant_ratio),
                content,
                created_by: OFFLINE_AUTHOR.to_string(),
                created_at: now,
                updated_at: now,
            })
        }
    }
}

pub(crate) fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let raw = std::fs::read_to_string(&args.input)?;
    let id = document_id(&args.input);

    let bytes = match args.kind {
        ExportKind::Expertise => expertise_pdf(&load_expertise(&raw, &id)?)?,
        ExportKind::Pda => {
            let config = AppConfig::load()?;
            pda_pdf(&load_pda(&raw, &id, config.subsidy.grant_ratio)?)?
        }
    };

    std::fs::write(&args.output, &bytes)?;
    println!(
        "Wrote {} ({} bytes) from {}",
        args.output.display(),
        bytes.len(),
        args.input.display()
    );
    Ok(())
}
