mod cli;
mod export;
mod infra;
mod routes;
mod seed;
mod server;

use renovia::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
