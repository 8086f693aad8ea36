use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use facegate_core::{build_gallery, response_schema, GallerySummary, Panel};
use facegated::{Config, GeminiClient, Scanner};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "facegate", about = "Facegate identity and anti-spoof scanner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the reference photos that would be sent with a scan
    Gallery {
        /// Gallery directory (default: FACEGATE_GALLERY_DIR or ./known_faces)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
    /// Scan one image against the gallery using the live inference service
    Scan {
        /// Image file to scan (jpg, jpeg, png)
        image: PathBuf,
        /// Print the full outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the structured-output schema sent with each request
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Commands::Gallery { dir } => {
            let dir = dir.unwrap_or_else(|| config.gallery_dir.clone());
            let gallery = build_gallery(&dir, config.gallery_order)
                .with_context(|| format!("reading gallery {}", dir.display()))?;
            if gallery.is_empty() {
                println!("No authorized users in {}", dir.display());
            }
            for entry in &gallery.entries {
                let summary = GallerySummary::from(entry);
                println!("{}\t{}\t{} bytes", summary.person, summary.mime_type, summary.bytes);
            }
        }
        Commands::Scan { image, json } => {
            let bytes = std::fs::read(&image)
                .with_context(|| format!("reading {}", image.display()))?;
            let client = GeminiClient::from_config(&config)?;
            let scanner = Scanner::from_config(Arc::new(client), &config);

            tracing::info!(
                image = %image.display(),
                bytes = bytes.len(),
                model = %config.model,
                "scan requested"
            );
            println!("Analyzing biometric data...");
            let outcome = scanner.scan(&bytes).await;
            tracing::info!(scan_id = %outcome.scan_id, state = ?outcome.state, "scan finished");

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print_panel(&outcome.panel);
            }
        }
        Commands::Schema => {
            println!("{}", serde_json::to_string_pretty(&response_schema())?);
        }
    }

    Ok(())
}

fn print_panel(panel: &Panel) {
    if let Some(metric) = &panel.metric {
        println!("Confidence: {metric}");
    }
    println!("{}", panel.alert.text());
    if let Some(fill) = panel.progress {
        let filled = usize::from(fill) / 5;
        println!("[{}{}] {fill}%", "#".repeat(filled), "-".repeat(20 - filled));
    }
    if let Some(analysis) = &panel.analysis {
        println!("{}", analysis.text());
    }
}
