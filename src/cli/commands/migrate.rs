use anyhow::Context;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::DatabaseManager;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = crate::cli::connect().await?;
    let result = DatabaseManager::migrate(&pool).await.context("failed to run migrations");
    DatabaseManager::close(pool).await;
    result?;

    output_success(&output_format, "Migrations applied", None)
}
