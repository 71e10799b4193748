use anyhow::Context;
use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::database::{CatalogProvider, DatabaseManager, PgCatalogProvider};
use crate::prerequisites::PrerequisiteGraph;

#[derive(Subcommand)]
pub enum PrerequisiteCommands {
    #[command(about = "Check the stored prerequisite graph for circular references")]
    Verify,

    #[command(about = "Report whether adding COURSE -> PREREQUISITE would create a cycle")]
    Check {
        #[arg(help = "Course id")]
        course: Uuid,
        #[arg(help = "Prerequisite course id")]
        prerequisite: Uuid,
    },
}

pub async fn handle(cmd: PrerequisiteCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = crate::cli::connect().await?;
    let graph = load_graph(&PgCatalogProvider::new(pool.clone())).await;
    DatabaseManager::close(pool).await;
    let graph = graph?;

    match cmd {
        PrerequisiteCommands::Verify => verify(&graph, &output_format),
        PrerequisiteCommands::Check { course, prerequisite } => check(&graph, course, prerequisite, &output_format),
    }
}

async fn load_graph(provider: &dyn CatalogProvider) -> anyhow::Result<PrerequisiteGraph> {
    let mut catalog = provider.begin().await.context("failed to open transaction")?;
    let edges = catalog
        .prerequisite_edges()
        .await
        .context("failed to load prerequisite edges")?;
    Ok(PrerequisiteGraph::from_edges(edges))
}

fn verify(graph: &PrerequisiteGraph, output_format: &OutputFormat) -> anyhow::Result<()> {
    match graph.find_cycle() {
        None => output_success(
            output_format,
            &format!("Prerequisite graph is acyclic ({} edges)", graph.edge_count()),
            Some(json!({ "edges": graph.edge_count() })),
        ),
        Some(cycle) => {
            let path = cycle.iter().map(Uuid::to_string).collect::<Vec<_>>().join(" -> ");
            output_error(output_format, &format!("Circular prerequisite chain: {}", path), Some("CYCLE"))?;
            anyhow::bail!("prerequisite graph contains a cycle")
        }
    }
}

fn check(
    graph: &PrerequisiteGraph,
    course: Uuid,
    prerequisite: Uuid,
    output_format: &OutputFormat,
) -> anyhow::Result<()> {
    let cycle = graph.would_create_cycle(course, prerequisite);
    let message = if cycle {
        format!("Adding {} as a prerequisite of {} would create a circular reference", prerequisite, course)
    } else {
        format!("{} can be added as a prerequisite of {}", prerequisite, course)
    };
    output_success(output_format, &message, Some(json!({ "wouldCreateCycle": cycle })))
}
