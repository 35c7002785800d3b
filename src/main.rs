use anyhow::{Context, Result};
use clap::Parser;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info};

use review_vibes::config::AnalysisConfig;
use review_vibes::model::{HttpModelScorer, ModelScorer};
use review_vibes::orchestrator::run_analysis;
use review_vibes::store::ResultStore;

/// Review Vibes - customer review sentiment and theme analysis
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Input file: a JSON array of row objects
    input: PathBuf,

    /// Name of the column holding the review text
    #[arg(short, long)]
    text_column: String,

    /// Output directory for generated files (default: "out")
    #[arg(short, long, default_value = "out")]
    output_dir: String,

    /// Endpoint of an external sentiment-inference model (optional)
    #[arg(long)]
    model_url: Option<String>,

    /// Override the clustering similarity threshold
    #[arg(long)]
    similarity_threshold: Option<f64>,

    /// Override the external-model batch size
    #[arg(long)]
    model_batch_size: Option<usize>,
}

fn load_rows(path: &PathBuf) -> Result<Vec<BTreeMap<String, String>>> {
    if !path.exists() {
        return Err(anyhow::anyhow!(
            "input file not found at {}\n\
             Expected a JSON array of row objects, e.g.:\n\
             [{{\"review\": \"excellent produit\", \"source\": \"shop\"}}]\n",
            path.display()
        ));
    }

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let rows: Vec<BTreeMap<String, serde_json::Value>> = serde_json::from_str(&raw)
        .with_context(|| format!("decoding JSON rows from {}", path.display()))?;

    // Non-string cells (numbers, booleans) are stringified so a numeric
    // rating column still lands in the metadata map.
    Ok(rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|(k, v)| {
                    let s = match v {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    };
                    (k, s)
                })
                .collect()
        })
        .collect())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();

    info!("Starting review_vibes");

    let args = Args::parse();

    let rows = load_rows(&args.input)?;
    info!("Loaded {} rows from {}", rows.len(), args.input.display());

    let mut cfg = AnalysisConfig::default();
    if let Some(threshold) = args.similarity_threshold {
        debug!("Overriding similarity threshold: {}", threshold);
        cfg.similarity_threshold = threshold;
    }
    if let Some(batch) = args.model_batch_size {
        debug!("Overriding model batch size: {}", batch);
        cfg.model_batch_size = batch;
    }

    let scorer = match &args.model_url {
        Some(url) => {
            debug!("External model enabled - endpoint={}", url);
            Some(HttpModelScorer::new(url.clone())?)
        }
        None => {
            debug!("External model disabled - lexical+emoji composite only");
            None
        }
    };
    let scorer_ref = scorer.as_ref().map(|s| s as &dyn ModelScorer);

    let result = run_analysis(&rows, &args.text_column, &cfg, scorer_ref).await;

    // Park the result under a session key the way the owning service
    // does, then persist the JSON artifact for the report layer.
    let mut store = ResultStore::new();
    let session_key = store.insert(result);
    info!("Session key: {}", session_key);

    let out_dir = std::path::Path::new(&args.output_dir);
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;

    let result = store
        .get(&session_key)
        .context("freshly stored result disappeared")?;
    let out_path = out_dir.join("analysis.json");
    std::fs::write(&out_path, serde_json::to_vec_pretty(result)?)
        .with_context(|| format!("writing {}", out_path.display()))?;
    info!("Wrote {}", out_path.display());

    Ok(())
}
