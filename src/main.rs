use clap::Parser;
use gia_vang::cli::{Cli, Commands};
use gia_vang::config::{CacheBackendKind, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
            eprintln!("Using default configuration");
            Config::parse(include_str!("../config.toml.example"))?
        }
    }
    .with_env_overrides();

    // Initialize telemetry
    gia_vang::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Check(args) => {
            tracing::info!(sources = config.sources.len(), "Checking gold prices");
            args.execute(&config).await?;
        }
        Commands::Record(args) => {
            tracing::info!(vendor = args.vendor.id(), "Recording price");
            args.execute(&config).await?;
        }
        Commands::Show(args) => {
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!(
                "  Cache: {:?} {} (prefix {})",
                config.cache.backend,
                config.cache.path.display(),
                config.cache.key_prefix
            );
            if config.cache.backend == CacheBackendKind::Redis {
                let redis = &config.cache.redis;
                match redis.url {
                    Some(ref url) => println!("  Redis: {}", url),
                    None => println!(
                        "  Redis: {}:{}",
                        redis.host.as_deref().unwrap_or("-"),
                        redis.port
                    ),
                }
            }
            println!(
                "  Fetch: timeout={}s, attempts={}",
                config.fetch.timeout_secs, config.fetch.max_attempts
            );
            for source in &config.sources {
                println!(
                    "  Source: {} {} (scale {})",
                    source.vendor, source.url, source.scale
                );
            }
            println!(
                "  Telemetry: level={}, format={:?}, metrics_port={:?}",
                config.telemetry.log_level, config.telemetry.log_format, config.telemetry.metrics_port
            );
        }
    }

    Ok(())
}
