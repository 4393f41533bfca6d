use crate::export::{run_export, ExportArgs};
use crate::seed::{run_seed, SeedArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use renovia::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "renovia",
    about = "Serve and administer the Renovia expertise and subsidy service",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Create the configured administrator and optionally import accounts from CSV
    Seed(SeedArgs),
    /// Render an expertise or PDA JSON document to PDF without a running server
    Export(ExportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Seed(args) => run_seed(args).await,
        Command::Export(args) => run_export(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportKind;
    use std::path::PathBuf;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["renovia"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn export_requires_kind_input_and_output() {
        let cli = Cli::try_parse_from([
            "renovia",
            "export",
            "--kind",
            "pda",
            "--input",
            "pda.json",
            "--output",
            "pda.pdf",
        ])
        .expect("parses");
        match cli.command {
            Some(Command::Export(args)) => {
                assert_eq!(args.kind, ExportKind::Pda);
                assert_eq!(args.output, PathBuf::from("pda.pdf"));
            }
            other => panic!("unexpected command: {other:?}"),
        }

        assert!(Cli::try_parse_from(["renovia", "export", "--kind", "pda"]).is_err());
        assert!(Cli::try_parse_from([
            "renovia", "export", "--kind", "invoice", "--input", "a", "--output", "b"
        ])
        .is_err());
    }

    #[test]
    fn serve_accepts_bind_overrides() {
        let cli = Cli::try_parse_from(["renovia", "serve", "--host", "0.0.0.0", "--port", "8080"])
            .expect("parses");
        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.host.as_deref(), Some("0.0.0.0"));
                assert_eq!(args.port, Some(8080));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
