//! Command line entry point for Wardrobe Studio

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use wardrobe_studio::{
    config::Settings,
    image::{normalize, RawUpload},
    model::{Catalog, Category},
    service::{classify_or_default, GeminiService, StylingService},
    state::ProcessingState,
    studio::GenerationMode,
    Session,
};

#[derive(Parser, Debug)]
#[command(name = "wardrobe-studio", version, about = "Style outfits from your own wardrobe photos")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, default_value = "config/default.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify garment photos and print the result as JSON
    Classify {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Build an outfit from garment photos and generate a styled image
    Style {
        /// Rendering profile: avatar or flat-lay
        #[arg(long, default_value = "avatar")]
        mode: GenerationMode,
        /// Garment photo, optionally with a category: `path[=Category]`.
        /// Order is layering order (first = innermost).
        #[arg(long = "item")]
        items: Vec<ItemArg>,
        /// Selfie used to generate the avatar face
        #[arg(long)]
        face: Option<PathBuf>,
        /// Catalog file to import items from
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Catalog item ids to import
        #[arg(long = "catalog-item", requires = "catalog")]
        catalog_items: Vec<String>,
        /// Override the output directory
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Clone)]
struct ItemArg {
    path: PathBuf,
    category: Option<Category>,
}

impl FromStr for ItemArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.rsplit_once('=') {
            Some((path, category)) => Ok(Self {
                path: PathBuf::from(path),
                category: Some(category.parse().map_err(|e| format!("{}", e))?),
            }),
            None => Ok(Self {
                path: PathBuf::from(s),
                category: None,
            }),
        }
    }
}

fn init_logging(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

    if settings.logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }
}

/// Log every status change while an operation is running
fn spawn_progress_log(mut progress: watch::Receiver<ProcessingState>) {
    tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let state = progress.borrow_and_update().clone();
            if state.is_loading {
                info!(status = %state.status_message, "Working");
            }
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Load configuration
    let mut settings = Settings::load_from_path(&cli.config)?;
    settings.validate()?;
    init_logging(&settings);

    info!(
        model = %settings.service.image_model,
        upload_policy = ?settings.upload.policy,
        studio_policy = ?settings.studio.policy,
        "Loaded configuration"
    );

    match cli.command {
        Command::Classify { files } => {
            let service = GeminiService::new(&settings.service)?;
            for file in files {
                let image = normalize(RawUpload::from_path(&file))
                    .await
                    .with_context(|| format!("failed to read {}", file.display()))?;
                let classification = classify_or_default(&service, &image).await?;
                println!(
                    "{}",
                    serde_json::json!({
                        "file": file.display().to_string(),
                        "category": classification.category,
                        "description": classification.description,
                    })
                );
            }
        }
        Command::Style {
            mode,
            items,
            face,
            catalog,
            catalog_items,
            out,
        } => {
            if let Some(out) = out {
                settings.output.dir = out.to_string_lossy().to_string();
            }

            let service: Arc<dyn StylingService> = Arc::new(GeminiService::new(&settings.service)?);
            let session = Session::new(settings, service);
            spawn_progress_log(session.watch_processing());

            if let Some(face) = face {
                session.create_profile_avatar(RawUpload::from_path(face)).await?;
            }

            // Uploads are named by full path so overrides stay distinct
            let categories: HashMap<String, Option<Category>> = items
                .iter()
                .map(|item| (item.path.display().to_string(), item.category))
                .collect();
            let uploads = items
                .iter()
                .map(|item| RawUpload::from_path(&item.path).with_name(item.path.display().to_string()))
                .collect();
            session.upload_garments(uploads).await?;
            if let Some(notice) = session.notice() {
                warn!(notice = %notice, "Some items were skipped");
                session.dismiss_notice();
            }

            while let Some(pending) = session.pending_decision() {
                let explicit = pending
                    .source_name
                    .as_ref()
                    .and_then(|name| categories.get(name).copied().flatten());
                match explicit {
                    Some(category) => session.confirm_pending(category)?,
                    None => session.accept_suggestion()?,
                };
            }

            if let Some(path) = catalog {
                let catalog = Catalog::load(&path)
                    .await
                    .with_context(|| format!("failed to load catalog {}", path.display()))?;
                for id in &catalog_items {
                    match catalog.get(id) {
                        Some(item) => {
                            session.import_from_catalog(item)?;
                        }
                        None => warn!(catalog_id = %id, "Catalog item not found"),
                    }
                }
            }

            // Bulk-promote the whole wardrobe into the studio
            session.toggle_selection_mode();
            for garment in session.garments() {
                session.toggle_selected(&garment.id);
            }
            let committed = session.commit_selection();
            info!(garments = committed, mode = %mode, "Studio ready");

            session.generate(mode).await?;
            if let Some(path) = session.save_generated().await? {
                println!("{}", path.display());
            }
        }
    }

    Ok(())
}
