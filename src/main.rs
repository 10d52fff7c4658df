mod cli;

use anyhow::{bail, Context};
use ragvec::{Config, InMemoryStore};
use tracing_subscriber::EnvFilter;

fn init_tracing(config: &Config) {
    // Directives were validated when the config was loaded
    let filter = EnvFilter::new(config.log_filter.as_deref().unwrap_or("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;
    init_tracing(&config);

    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(String::as_str) {
        None => {
            let store = InMemoryStore::with_config(config.store.clone());
            cli::run_repl(&store);
        }
        Some("serve") => {
            ragvec::server::serve(&config)
                .await
                .with_context(|| format!("server on {} failed", config.server.bind))?;
        }
        Some(other) => bail!("unknown argument '{other}'. Usage: ragvec [serve]"),
    }

    Ok(())
}
