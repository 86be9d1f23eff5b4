mod cli;
mod infra;
mod matcher;
mod routes;
mod server;

use slotmatch::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
