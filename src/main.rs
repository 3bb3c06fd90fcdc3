//! Operator CLI for the contract proxy loader.
//!
//! Run `warm` once from the deployment's startup script, before workers
//! are spawned, so every worker finds a warm cache.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use contract_loader::cache::{CacheKey, FsProxyCache};
use contract_loader::config::ConfigStore;
use contract_loader::discovery::watcher::SourceWatcher;
use contract_loader::host::{Definitions, HookOptions, ResolutionChain};
use contract_loader::loader::{BootstrapOutcome, CacheState, LoadOrchestrator};
use contract_loader::observability::logging;

#[derive(Parser)]
#[command(name = "contract-loader")]
#[command(about = "Precompute and serve contract proxies", long_about = None)]
struct Cli {
    /// Configuration file (defaults to $CONTRACT_LOADER_CONFIG or the deployment path).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured cache directory.
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show whether the proxy cache is cold
    Status,
    /// Rebuild the proxy cache if it is cold
    Warm {
        /// Rebuild even if the cache is warm
        #[arg(long)]
        force: bool,
    },
    /// Resolve names through the registered loader
    Resolve {
        names: Vec<String>,
        /// Log resolution errors instead of failing
        #[arg(long)]
        no_throw: bool,
    },
    /// Print the cache key derived for a name
    Key { name: String },
    /// Rebuild on every source change (development only)
    Watch,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = ConfigStore::resolve_path(cli.config.as_deref());
    let config = Arc::new(ConfigStore::load(&config_path)?);
    logging::init(&config.config().logging.level);

    let cache_dir = cli
        .cache_dir
        .clone()
        .unwrap_or_else(|| config.config().cache_dir.clone());

    match cli.command {
        Commands::Status => {
            let settings = config.config();
            let cache = FsProxyCache::open(&cache_dir, &settings.artifact_extension)?;
            let state = CacheState::inspect(&cache, settings.warm_threshold, &settings.environment)?;
            println!("cache:       {}", cache_dir.display());
            println!("artifacts:   {}", state.artifacts);
            println!("environment: {}", state.environment);
            match state.reason() {
                Some(reason) => println!("state:       cold ({})", reason),
                None => println!("state:       warm"),
            }
        }
        Commands::Warm { force } => {
            let orchestrator = LoadOrchestrator::builder(config.clone(), Arc::new(Definitions::new()))
                .cache_dir(&cache_dir)
                .force_rebuild(force)
                .build()?;
            print_outcome(orchestrator.bootstrap_outcome());
        }
        Commands::Resolve { names, no_throw } => {
            let definitions = Arc::new(Definitions::new());
            let orchestrator = Arc::new(LoadOrchestrator::new(&cache_dir, config.clone(), definitions.clone())?);
            let chain = ResolutionChain::new();
            orchestrator.register(&chain, HookOptions { throws: !no_throw, prepend: true });

            for name in &names {
                match chain.resolve(name) {
                    Ok(true) => println!("{}: resolved", name),
                    Ok(false) => println!("{}: unresolved", name),
                    Err(e) => println!("{}: error: {}", name, e),
                }
            }
            if definitions.is_empty() {
                println!("nothing defined");
            }
        }
        Commands::Key { name } => {
            let key = CacheKey::derive(&name, config.config().namespace_separator);
            println!("{}", key);
        }
        Commands::Watch => watch(config, cache_dir).await?,
    }

    Ok(())
}

async fn watch(config: Arc<ConfigStore>, cache_dir: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let settings = config.config();
    if !settings.environment.is_development() {
        return Err(format!(
            "watch rebuilds the cache while it may be read; refusing in {} environment",
            settings.environment
        )
        .into());
    }

    let rebuild = |force: bool| -> Result<(), Box<dyn std::error::Error>> {
        let orchestrator = LoadOrchestrator::builder(config.clone(), Arc::new(Definitions::new()))
            .cache_dir(&cache_dir)
            .force_rebuild(force)
            .build()?;
        print_outcome(orchestrator.bootstrap_outcome());
        Ok(())
    };

    rebuild(false)?;

    let (watcher, mut changes) = SourceWatcher::new(&settings.project_dirs, &settings.source_extension);
    let _watcher = watcher.run()?;

    loop {
        tokio::select! {
            change = changes.recv() => {
                let Some(change) = change else { break };
                // Coalesce a burst of events into one rebuild.
                while changes.try_recv().is_ok() {}
                tracing::info!(paths = ?change.paths, "Sources changed");
                if let Err(e) = rebuild(true) {
                    tracing::error!(error = %e, "Rebuild failed; waiting for the next change");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Stopping watcher");
                break;
            }
        }
    }
    Ok(())
}

fn print_outcome(outcome: Option<&BootstrapOutcome>) {
    match outcome {
        None => println!("cache warm, nothing to do"),
        Some(BootstrapOutcome::Rebuilt { id, structures, pruned, elapsed }) => println!(
            "rebuilt {} proxies (pruned {} stale) in {:?} [bootstrap {}]",
            structures, pruned, elapsed, id
        ),
        Some(BootstrapOutcome::Skipped { artifacts }) => {
            println!("cache already warm once the lock was held ({} artifacts)", artifacts)
        }
    }
}
