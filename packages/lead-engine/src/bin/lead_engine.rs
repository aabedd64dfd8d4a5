//! Batch run over recorded search results.
//!
//! Reads the hits file named by `LEAD_ENGINE_HITS`, processes every target,
//! and prints both outreach lanes plus run stats as JSON on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use lead_engine::{EngineConfig, HttpTransport, MemoryStore, Pipeline, SearchHit, SourceType};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// One query's worth of recorded results.
#[derive(Debug, Deserialize)]
struct RecordedQuery {
    pack: String,
    source_type: SourceType,
    query: String,
    hits: Vec<SearchHit>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,lead_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = EngineConfig::from_env().context("Failed to load configuration")?;

    let hits_path = std::env::var("LEAD_ENGINE_HITS").context("LEAD_ENGINE_HITS must be set")?;
    let raw = std::fs::read_to_string(&hits_path)
        .with_context(|| format!("Failed to read hits file {}", hits_path))?;
    let recorded: Vec<RecordedQuery> =
        serde_json::from_str(&raw).with_context(|| format!("Failed to parse hits file {}", hits_path))?;

    let transport = HttpTransport::new(&config.fetch).context("Failed to build HTTP client")?;
    let store = Arc::new(MemoryStore::new());
    let pipeline = Pipeline::new(transport, store.clone(), config)
        .context("Failed to initialize pipeline")?
        .with_cache(store);

    let mut stats = lead_engine::RunStats::new();
    for query in &recorded {
        stats.merge(
            pipeline
                .admit_hits(&query.pack, query.source_type, &query.query, &query.hits)
                .await,
        );
    }
    tracing::info!(
        queries = recorded.len(),
        targets = pipeline.ledger().len(),
        "Recorded hits admitted"
    );

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing in-flight fetches");
            on_signal.cancel();
        }
    });

    stats.merge(pipeline.process(&cancel).await);

    let lanes = pipeline.export(Utc::now()).await.context("Failed to project leads")?;
    let report = serde_json::json!({
        "outreach_mvp_client": lanes.outreach_mvp_client,
        "outreach_partnership": lanes.outreach_partnership,
        "stats": stats,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    tracing::info!(
        leads = lanes.len(),
        failed = stats.failed_urls.len(),
        success = stats.is_success(),
        "Run completed"
    );
    Ok(())
}
