use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use vitrine_cache::{BlobCache, JsonCache};
use vitrine_config::{VitrineConfig, default_data_dir};
use vitrine_coordinator::{
  BackgroundCoordinator, ChannelBroadcaster, Command, CoordinatorHandle, CoordinatorRunner, Reply,
};
use vitrine_http::{FetcherOptions, ReqwestFetcher};
use vitrine_manager::ArtManager;
use vitrine_provider::{ProviderContext, ProviderRegistry};
use vitrine_store::{FsBlobStore, FsKvStore};

/// Vitrine - rotating artwork from remote art collections
#[derive(Parser)]
#[command(name = "vitrine")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.vitrine)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Show the current artwork, advancing afterwards if turnover is on
  Show,

  /// Advance to the next displayable artwork
  Rotate,

  /// Switch to another provider
  Switch {
    /// Provider name (see `vitrine providers`)
    provider: String,
  },

  /// Change a user setting (turnoverAlways, artProvider)
  Set {
    key: String,

    /// JSON value; anything that is not JSON is taken as a string
    value: String,
  },

  /// Print the current asset index
  Current,

  /// List registered providers
  Providers,

  /// Sync the active provider and warm the current image
  Sync,

  /// Drop cached metadata and images
  ClearCache {
    /// Only this provider (default: all)
    provider: Option<String>,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_tracing();

  let data_dir = match cli.data_dir {
    Some(dir) => dir,
    None => default_data_dir().context("could not determine home directory")?,
  };

  let Some(command) = cli.command else {
    println!("vitrine - use --help to see available commands");
    return Ok(());
  };

  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async { run(command, &data_dir).await })
}

fn init_tracing() {
  tracing_subscriber::registry()
    .with(EnvFilter::try_from_env("VITRINE_LOG").unwrap_or_else(|_| EnvFilter::new("info")))
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .init();
}

async fn run(command: Commands, data_dir: &Path) -> Result<()> {
  let config_path = data_dir.join("config.json");
  debug!(config = %config_path.display(), "loading configuration");
  let config = VitrineConfig::load(&config_path)
    .await
    .with_context(|| format!("failed to load config: {}", config_path.display()))?;

  tokio::fs::create_dir_all(data_dir)
    .await
    .with_context(|| format!("failed to create data directory: {}", data_dir.display()))?;

  let manager = Arc::new(build_manager(&config, data_dir).await?);
  info!(
    data_dir = %data_dir.display(),
    provider = manager.current_provider().await.name(),
    "vitrine ready"
  );

  match command {
    Commands::Providers => return print_json(&manager.providers()),
    Commands::ClearCache { provider } => {
      let names = match provider {
        Some(name) => vec![name],
        None => manager.providers().into_iter().map(|p| p.name).collect(),
      };
      for name in &names {
        manager
          .clear_provider_cache(name)
          .await
          .with_context(|| format!("failed to clear cache for '{}'", name))?;
      }
      return print_json(&serde_json::json!({ "cleared": names }));
    }
    _ => {}
  }

  let broadcaster = ChannelBroadcaster::new(16);
  let coordinator = Arc::new(
    BackgroundCoordinator::new(manager.clone(), Arc::new(broadcaster.clone()))
      .with_max_attempts(config.rotation.max_attempts),
  );

  if let Commands::Sync = command {
    let index = coordinator
      .initialize()
      .await
      .context("failed to sync art data")?;
    let total = manager.synced_asset_count().await;
    return print_json(&serde_json::json!({ "currentIndex": index, "totalAssets": total }));
  }

  let runner = CoordinatorRunner::new(coordinator, broadcaster);
  let handle = runner.handle();
  let cancel = CancellationToken::new();
  let task = tokio::spawn(runner.start(cancel.clone()));

  let result = dispatch(command, &handle, &manager).await;

  cancel.cancel();
  task.await.context("coordinator runner panicked")?;
  result
}

async fn build_manager(config: &VitrineConfig, data_dir: &Path) -> Result<ArtManager> {
  let fetcher = Arc::new(
    ReqwestFetcher::with_options(FetcherOptions {
      timeout: config.http.timeout(),
      user_agent: config.http.user_agent.clone(),
    })
    .context("failed to create http client")?,
  );

  let kv = Arc::new(FsKvStore::new(data_dir.join("store.json")));
  let blobs = Arc::new(FsBlobStore::new(data_dir.join("images")));
  let ttl_ms = i64::try_from(config.cache.ttl().as_millis()).unwrap_or(i64::MAX);

  let ctx = ProviderContext::new(
    fetcher.clone(),
    JsonCache::new(kv.clone()).with_ttl(ttl_ms),
    BlobCache::new(blobs, fetcher),
  );
  let registry = ProviderRegistry::from_config(ctx, config);

  ArtManager::load(registry, kv)
    .await
    .context("failed to load art state")
}

async fn dispatch(command: Commands, handle: &CoordinatorHandle, manager: &ArtManager) -> Result<()> {
  let command = match command {
    Commands::Show => {
      let reply = send(handle, Command::GetCurrentArt).await?;
      print_json(&reply)?;

      let Reply::CurrentArt(art) = &reply else {
        return Ok(());
      };
      if manager.turnover_always().await {
        handle
          .request(Command::RotateToNext {
            current_index: Some(art.current_index),
          })
          .await
          .context("failed to advance to the next artwork")?;
      }
      return Ok(());
    }
    Commands::Rotate => Command::RotateToNext {
      current_index: None,
    },
    Commands::Switch { provider } => Command::SwitchProvider {
      provider_name: provider,
    },
    Commands::Set { key, value } => Command::UpdateSetting {
      key,
      value: serde_json::from_str(&value).unwrap_or(Value::String(value)),
    },
    Commands::Current => Command::RequestCurrentAsset,
    Commands::Providers | Commands::Sync | Commands::ClearCache { .. } => {
      return Err(anyhow!("command is not handled by the coordinator"));
    }
  };

  let reply = send(handle, command).await?;
  print_json(&reply)
}

async fn send(handle: &CoordinatorHandle, command: Command) -> Result<Reply> {
  let kind = command.kind();
  handle
    .request(command)
    .await
    .with_context(|| format!("'{}' failed", kind))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}
