mod cli;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use avmeta::{
    config::{self, Config},
    covers::CoverStore,
    scraper::{JavbusScraper, Scraper, ScraperManager},
    source::{Avtoday, Jable, Source, SourceManager},
};
use avmeta_db::pool::init_pool;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "avmeta=trace,avmeta_db=debug".to_string()
        } else {
            "avmeta=info,avmeta_db=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Resolve { avid, source, json } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(resolve(avid, source, json, cli.config.as_deref()))
        }
        Commands::SetCookie { source, cookie } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let manager = build_manager(&config)?;
            if manager.set_source_cookie(&source, &cookie) {
                println!("已保存 {} 的 Cookie", source);
                Ok(())
            } else {
                anyhow::bail!("Unknown source: {}", source)
            }
        }
        Commands::Bootstrap { source } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(bootstrap(source, cli.config.as_deref()))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("avmeta {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Build the full resolver from configuration: database pool, cover store,
/// scraper chain, and the ordered source list.
fn build_manager(config: &Config) -> Result<SourceManager> {
    let data_dir = config::resolve_data_dir(config)?;
    std::fs::create_dir_all(&data_dir)?;

    let db_path = data_dir.join("avmeta.db");
    tracing::info!("Using database at {}", db_path.display());
    let pool = init_pool(&db_path.to_string_lossy())?;

    let covers = CoverStore::new(&data_dir)?;

    let proxy = config.proxy.as_deref();
    let http = &config.http;

    let scraper_list: Vec<Arc<dyn Scraper>> = vec![
        Arc::new(JavbusScraper::javbus(http, proxy)?),
        Arc::new(JavbusScraper::busdmm(http, proxy)?),
        Arc::new(JavbusScraper::dmmsee(http, proxy)?),
    ];
    let scrapers = Arc::new(ScraperManager::new(scraper_list));

    let sources: Vec<Arc<dyn Source>> = vec![
        Arc::new(Avtoday::new(pool.clone(), http, proxy)?),
        Arc::new(Jable::new(pool.clone(), http, proxy)?),
    ];

    Ok(SourceManager::new(pool, covers, scrapers, sources))
}

async fn resolve(
    avid: String,
    source: Option<String>,
    json: bool,
    config_path: Option<&std::path::Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let manager = build_manager(&config)?;

    let resolved = match source {
        Some(ref source) => manager.resolve_from(&avid, source).await,
        None => manager.resolve(&avid).await,
    };

    // Flush the background save (enrichment, cover, cache row) before exit.
    manager.drain_saves().await;

    match resolved {
        Some(info) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("{}", info.display_text());
            }
            Ok(())
        }
        None => {
            println!("获取失败了！");
            std::process::exit(1);
        }
    }
}

async fn bootstrap(source: String, config_path: Option<&std::path::Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let manager = build_manager(&config)?;

    let Some(target) = manager.source(&source) else {
        anyhow::bail!("Unknown source: {}", source);
    };

    if target.bootstrap_session().await {
        println!("已获取 {} 的 Cookie", target.name());
        Ok(())
    } else {
        anyhow::bail!("Session bootstrap failed for {}", target.name())
    }
}

fn validate_config(path: Option<&std::path::Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!(
                "  Proxy: {}",
                config.proxy.as_deref().unwrap_or("(direct connection)")
            );
            println!("  Data dir: {:?}", config::resolve_data_dir(&config)?);
            println!("  HTTP timeout: {}s", config.http.timeout_secs);
            println!(
                "  Cookie bootstrap: {} attempts, {}ms apart",
                config.http.cookie_retry_times, config.http.retry_interval_ms
            );
        }
        None => {
            println!("No config file specified, using defaults");
            let config = Config::default();
            println!("  HTTP timeout: {}s", config.http.timeout_secs);
        }
    }

    Ok(())
}
