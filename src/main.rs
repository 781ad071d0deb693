use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use log::{error, info, warn};

use shoelens::{
    BrandModel, BuiltinEmbedder, ImageEmbedder, LinearBrandModel, ModelManager, PipelineContext,
    RuntimeConfig, Upload,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web demo
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        address: String,
        #[arg(long, default_value_t = 7860)]
        port: u16,
        /// Path to the classifier artifact
        #[arg(long, default_value = "models/shoes.json")]
        artifact: PathBuf,
        /// Path to the embedding weights; defaults to the managed cache location
        #[arg(long)]
        weights: Option<PathBuf>,
    },
    /// Classify a single image file and print the result
    Predict {
        image: PathBuf,
        #[arg(long, default_value = "models/shoes.json")]
        artifact: PathBuf,
        #[arg(long)]
        weights: Option<PathBuf>,
    },
    /// Download and verify the embedding network weights
    Fetch {
        /// Force a fresh download of the weights files
        #[arg(short, long)]
        fresh: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            address,
            port,
            artifact,
            weights,
        } => {
            let context = build_context(&artifact, weights.as_deref())?;
            let status = context.status();
            let addr: SocketAddr = format!("{}:{}", address, port).parse()?;

            println!("shoelens — shoe brand classification demo");
            println!("  Artifact: {:?} (fitted: {})", artifact, status.fitted);
            println!("  Embedder: {}", if status.embedder_available { "available" } else { "unavailable" });
            println!();
            println!("  Open http://{} in your browser", addr);
            println!();

            shoelens::server::run_server(context, addr).await?;
        }

        Commands::Predict {
            image,
            artifact,
            weights,
        } => {
            let context = build_context(&artifact, weights.as_deref())?;
            let file_name = image
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("upload")
                .to_string();
            let upload = Upload::new(file_name, std::fs::read(&image)?);

            match context.classify(&upload) {
                Ok(prediction) => {
                    let mut scores: Vec<_> = prediction.scores.into_iter().collect();
                    scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

                    println!("Predicted brand: {}", prediction.label);
                    println!("Decision scores (sorted):");
                    for (label, score) in scores {
                        println!("  {}: {:.3}", label, score);
                    }
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Fetch { fresh } => {
            let manager = ModelManager::new_default()?;
            let embedder = BuiltinEmbedder::ResNet18;

            if fresh {
                info!("Fresh download requested - removing any existing weights...");
                manager.remove_download(embedder)?;
            }

            manager.ensure_downloaded(embedder).await?;
            println!(
                "Weights ready at {:?}",
                manager.get_weights_path(embedder)
            );
        }
    }

    Ok(())
}

fn build_context(artifact: &Path, weights: Option<&Path>) -> anyhow::Result<PipelineContext> {
    let model: Option<Arc<dyn BrandModel>> = match LinearBrandModel::load(artifact) {
        Ok(model) => {
            if model.is_fitted() {
                info!(
                    "Classifier artifact loaded from {:?} ({} labels)",
                    artifact,
                    model.labels.len()
                );
            } else {
                warn!("Classifier artifact at {:?} is not fitted", artifact);
            }
            Some(Arc::new(model))
        }
        Err(e) => {
            error!("Failed to load classifier artifact: {}", e);
            None
        }
    };

    let weights_path = match weights {
        Some(path) => path.to_path_buf(),
        None => ModelManager::new_default()?.get_weights_path(BuiltinEmbedder::ResNet18),
    };
    let embedder = ImageEmbedder::initialize(
        weights_path,
        BuiltinEmbedder::ResNet18.characteristics(),
        &RuntimeConfig::default(),
    );

    Ok(PipelineContext::new(model, Arc::new(embedder)))
}
