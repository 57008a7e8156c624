//! videolog - browse studio video clips from a media library manifest

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use videolog_common::config::{default_config_path, write_toml_config, LoggingConfig, TomlConfig};
use videolog_common::events::{EventBus, ThumbnailSize};

use videolog_browser::config::{build_registry, load_config, resolve_library_manifest};
use videolog_browser::manifest::ManifestLibrary;
use videolog_browser::metadata::MetadataInspector;
use videolog_browser::{BrowseSession, MediaLibrary};

/// Command-line arguments for videolog
#[derive(Parser, Debug)]
#[command(name = "videolog")]
#[command(about = "Browse video clips recorded near your studios")]
#[command(version)]
struct Args {
    /// Configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Media library manifest (JSON)
    #[arg(short, long, global = true)]
    library: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List configured studios
    Studios,

    /// List clips recorded near a studio
    Browse {
        /// Studio name or id
        studio: String,

        /// Also load thumbnails
        #[arg(long)]
        thumbnails: bool,

        /// Thumbnail edge length in pixels
        #[arg(long, default_value_t = 200)]
        thumbnail_size: u32,
    },

    /// Show common metadata for one clip
    Inspect {
        /// Asset identifier
        asset: String,

        /// Do not download assets that are not on this device
        #[arg(long)]
        local_only: bool,
    },

    /// Configuration file helpers
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Write a default configuration file
    Init {
        /// Destination (defaults to the per-user config path)
        path: Option<PathBuf>,
    },
}

/// Stderr subscriber active while the configuration is resolved
fn bootstrap_subscriber() -> impl tracing::Subscriber + Send + Sync + 'static {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish()
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(std::sync::Mutex::new(file)),
                )
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (toml_config, source) = load_config(args.config.clone(), bootstrap_subscriber())
        .context("Failed to load configuration")?;
    init_tracing(&toml_config.logging)?;

    info!("Starting videolog {}", env!("CARGO_PKG_VERSION"));
    if let Some(path) = source.path() {
        info!("Config: {}", path.display());
    }

    match args.command {
        Command::Config {
            action: ConfigAction::Init { path },
        } => init_config(path),
        Command::Studios => {
            let registry = build_registry(&toml_config)?;
            for studio in registry.studios() {
                let center = studio.center();
                println!(
                    "{}  {:<24} {:>10.6} {:>11.6}  r={}m",
                    studio.id(),
                    studio.name(),
                    center.latitude,
                    center.longitude,
                    studio.radius_m()
                );
            }
            Ok(())
        }
        Command::Browse {
            studio,
            thumbnails,
            thumbnail_size,
        } => {
            let session = open_session(&toml_config, args.library).await?;
            browse(&session, &studio, thumbnails, thumbnail_size).await
        }
        Command::Inspect { asset, local_only } => {
            let session = open_session(&toml_config, args.library).await?;
            inspect(&session, &asset, local_only).await
        }
    }
}

fn init_config(path: Option<PathBuf>) -> Result<()> {
    let path = match path.or_else(default_config_path) {
        Some(path) => path,
        None => bail!("Could not determine a config directory; pass a path"),
    };
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    write_toml_config(&TomlConfig::default(), &path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

async fn open_session(toml_config: &TomlConfig, library: Option<PathBuf>) -> Result<BrowseSession> {
    let manifest_path = resolve_library_manifest(library, toml_config)?;
    let library: Arc<dyn MediaLibrary> = Arc::new(
        ManifestLibrary::load(&manifest_path)
            .await
            .with_context(|| format!("Failed to open library {}", manifest_path.display()))?,
    );
    let registry = Arc::new(build_registry(toml_config)?);
    let session = BrowseSession::new(
        library,
        registry,
        toml_config.acceptance_window,
        EventBus::new(toml_config.event_capacity),
    );

    let status = session.request_access().await;
    if !status.is_granted() {
        bail!("Access to the media library is {status}. Please enable it in settings.");
    }
    Ok(session)
}

async fn browse(
    session: &BrowseSession,
    studio_key: &str,
    thumbnails: bool,
    thumbnail_size: u32,
) -> Result<()> {
    let studio = session
        .registry()
        .lookup(studio_key)
        .with_context(|| format!("No studio named {studio_key}"))?
        .clone();

    let Some(assets) = session.open_studio(studio.id()).await? else {
        bail!("Media library access not granted");
    };

    println!(
        "{}: {} clip(s) within {}m ({})",
        studio.name(),
        assets.len(),
        studio.radius_m(),
        session.cache().window()
    );
    for asset in assets.iter() {
        let distance = asset
            .location
            .map(|l| format!("{:.0}m", studio.center().distance_to(&l)))
            .unwrap_or_default();
        let created = asset
            .created_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();
        println!("  {:<32} {:<26} {:>8}", asset.id, created, distance);
    }

    if thumbnails {
        let cancel = CancellationToken::new();
        let ctrl_c_cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                ctrl_c_cancel.cancel();
            }
        });

        let size = ThumbnailSize::new(thumbnail_size, thumbnail_size);
        let summary = session.load_thumbnails(studio.id(), size, &cancel).await?;
        println!(
            "Thumbnails: {} ready, {} failed, {} cancelled",
            summary.ready, summary.failed, summary.cancelled
        );
    }
    Ok(())
}

async fn inspect(session: &BrowseSession, asset_id: &str, local_only: bool) -> Result<()> {
    let asset = session.find_asset(asset_id).await?;

    let report = if local_only {
        let library: Arc<dyn MediaLibrary> = session.library();
        MetadataInspector::new(library, session.event_bus().clone())
            .local_only()
            .inspect(&asset)
            .await?
    } else {
        session.inspect_asset(&asset).await?
    };

    println!("{}", asset.id);
    if report.fetched_from_network {
        println!("  (downloaded for inspection)");
    }
    for entry in &report.entries {
        println!("  [{}] {} = {}", entry.format, entry.common_key, entry.value);
    }
    for failure in &report.failed_formats {
        println!("  [{}] unreadable: {}", failure.format, failure.reason);
    }
    Ok(())
}
