use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, bail, eyre};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use netimage::application::{
    CompletionQueue, CoordinatorOptions, CoordinatorPorts, DownloadCoordinator,
    completion_channel,
};
use netimage::domain::DownloadOutcome;
use netimage::infrastructure::{
    AppConfig, BaseUrlResolver, CacheDirResolver, CliArgs, InMemoryFakeRegistry, MemoryImageCache,
    NetworkActivityFlag, ReqwestTransport, StorageManager,
};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = &config.log_path {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

fn load_config(args: &CliArgs) -> Result<AppConfig> {
    let mut config = match StorageManager::new() {
        Ok(storage) => storage.load_config(args.config.as_deref())?,
        Err(_) => match &args.config {
            Some(path) => StorageManager::with_dir(std::env::temp_dir()).load_config(Some(path))?,
            None => AppConfig::default(),
        },
    };
    config.merge_with_args(args);
    Ok(config)
}

fn create_coordinator(
    config: &AppConfig,
    memory_cache: Arc<MemoryImageCache>,
    inline: bool,
) -> Result<(DownloadCoordinator, Option<CompletionQueue>)> {
    let cache_dir = config
        .effective_cache_dir()
        .ok_or_else(|| eyre!("no cache directory available"))?;
    let destinations = CacheDirResolver::new(cache_dir)?;

    let ports = CoordinatorPorts {
        transport: Arc::new(ReqwestTransport::with_timeout(config.timeout_secs)?),
        urls: Arc::new(BaseUrlResolver::new(&config.base_url)),
        destinations: Arc::new(destinations),
        memory_cache,
        fakes: Arc::new(InMemoryFakeRegistry::new()),
        activity: Arc::new(NetworkActivityFlag::new()),
    };

    let (mut options, queue) = if inline {
        (CoordinatorOptions::inline(), None)
    } else {
        let (sender, queue) = completion_channel();
        (CoordinatorOptions::background(sender), Some(queue))
    };
    options.corrupt_cache_policy = config.corrupt_cache_policy;
    options.token = config.auth_token();
    if config.token.is_some() && options.token.is_none() {
        warn!("Configured token is not usable as a bearer token, ignoring it");
    }

    Ok((DownloadCoordinator::new(ports, options), queue))
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();
    let config = load_config(&args)?;

    init_logging(&config)?;

    info!(version = netimage::VERSION, base_url = %config.base_url, "Starting netimage");

    let memory_cache = Arc::new(MemoryImageCache::new(config.memory_cache_size));
    let (coordinator, queue) = create_coordinator(&config, memory_cache.clone(), args.inline)?;

    let (tx, rx) = tokio::sync::oneshot::channel();
    coordinator
        .fetch_image(&args.path, args.cache_name.as_deref(), move |outcome| {
            let _ = tx.send(outcome);
        })
        .await;

    if let Some(mut queue) = queue {
        if !queue.run_next().await {
            bail!("fetch finished without delivering an outcome");
        }
    }

    let outcome = rx.await.wrap_err("fetch completion was dropped")?;
    debug!(stats = %memory_cache.stats(), "Memory cache");

    match outcome {
        DownloadOutcome::Image(image) => {
            println!("{}: {}x{}", args.path, image.width(), image.height());
            if let Some(output) = &args.output {
                image
                    .save(output)
                    .wrap_err_with(|| format!("failed to write {}", output.display()))?;
                info!(path = %output.display(), "Saved decoded image");
            }
            Ok(())
        }
        DownloadOutcome::Failure(err) => {
            if err.is_recoverable() {
                warn!(path = %args.path, code = err.code(), error = %err, "Fetch failed");
            } else {
                error!(path = %args.path, code = err.code(), error = %err, "Fetch rejected");
            }
            bail!("{} failed ({}): {}", args.path, err.code(), err.message())
        }
    }
}
