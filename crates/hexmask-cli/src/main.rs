//! Hexmask CLI: mask images locally or run uploads through the full pipeline.
//!
//! Configuration comes from the environment (and `.env`); see `Config::from_env`.

use anyhow::Context;
use clap::{Parser, Subcommand};
use hexmask_cli::bootstrap::App;
use hexmask_cli::{content_type_for, init_tracing, require_persistent_store, truncate_string};
use hexmask_core::models::HexImage;
use hexmask_core::Config;
use hexmask_processing::{HexMask, ImageProcessor};
use hexmask_services::UploadRequest;
use serde::Serialize;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "hexmask", about = "Hexagon image masking pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mask a single image file without touching any store
    Mask {
        /// Source image
        input: PathBuf,
        /// Where to write the masked PNG
        output: PathBuf,
        /// Output side length; 0 keeps the cropped size
        #[arg(long)]
        size: Option<u32>,
    },
    /// Upload a file through the pipeline and wait for masking to finish
    Upload {
        /// Path to the file to upload
        file: PathBuf,
        /// Alternative text for the asset
        #[arg(long)]
        alt: String,
        /// Store the file without masking it
        #[arg(long)]
        no_mask: bool,
        /// Override the content type guessed from the extension
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Show an asset and its hex image (requires DATABASE_URL)
    Status {
        /// Asset UUID
        asset_id: Uuid,
    },
    /// List hex images, newest first (requires DATABASE_URL)
    List {
        /// Output format: json or table
        #[arg(long, default_value = "table")]
        format: String,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

fn print_table(images: &[HexImage]) {
    println!(
        "{:<36}  {:<24}  {:<10}  {}",
        "ID", "TITLE", "STATUS", "URL"
    );
    for image in images {
        println!(
            "{:<36}  {:<24}  {:<10}  {}",
            image.id,
            truncate_string(&image.title, 24),
            image.transform_status.to_string(),
            image.hex_url.as_deref().unwrap_or("-")
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    match cli.command {
        Commands::Mask {
            input,
            output,
            size,
        } => {
            let data = tokio::fs::read(&input)
                .await
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let source = ImageProcessor::extract_metadata(&data)
                .with_context(|| format!("{} is not a readable image", input.display()))?;

            let canonical_size = match size {
                Some(0) => None,
                Some(n) => Some(n),
                None => config.mask.canonical_size,
            };
            let mask = HexMask::new(canonical_size);
            let masked = tokio::task::spawn_blocking(move || mask.transform(&data))
                .await
                .context("Masking task failed")??;

            tokio::fs::write(&output, &masked)
                .await
                .with_context(|| format!("Failed to write {}", output.display()))?;
            let result = ImageProcessor::extract_metadata(&masked)?;

            print_json(&serde_json::json!({
                "input": source,
                "output": result,
                "path": output.display().to_string(),
            }))?;
        }
        Commands::Upload {
            file,
            alt,
            no_mask,
            content_type,
        } => {
            let data = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let original_filename = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let content_type =
                content_type.unwrap_or_else(|| content_type_for(&file).to_string());

            let mut app = App::build(config).await?;
            let asset = app
                .uploads
                .upload(UploadRequest {
                    data,
                    original_filename,
                    content_type,
                    alt,
                    mask_requested: !no_mask,
                })
                .await?;

            if asset.mask_requested && !asset.transform_status.is_terminal() {
                let outcome = app.wait_for(asset.id).await?;
                tracing::info!(asset_id = %asset.id, outcome = %outcome, "Masking finished");
            }

            let asset = app
                .store
                .get_asset(asset.id)
                .await?
                .context("Asset disappeared after upload")?;
            let hex_image = app.link.find_by_asset(asset.id).await?;
            app.shutdown().await;

            print_json(&serde_json::json!({
                "asset": asset,
                "hex_image": hex_image,
            }))?;
        }
        Commands::Status { asset_id } => {
            require_persistent_store(&config, "status")?;
            let app = App::build(config).await?;
            let asset = app
                .store
                .get_asset(asset_id)
                .await?
                .with_context(|| format!("Asset {} not found", asset_id))?;
            let hex_image = app.link.find_by_asset(asset_id).await?;
            app.shutdown().await;

            print_json(&serde_json::json!({
                "asset": asset,
                "hex_image": hex_image,
            }))?;
        }
        Commands::List { format } => {
            require_persistent_store(&config, "list")?;
            let app = App::build(config).await?;
            let images = app.link.list().await?;
            app.shutdown().await;

            match format.as_str() {
                "json" => print_json(&images)?,
                "table" => print_table(&images),
                other => {
                    return Err(anyhow::anyhow!(
                        "Invalid format '{}'. Must be: json or table",
                        other
                    ))
                }
            }
        }
    }

    Ok(())
}
