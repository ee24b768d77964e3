use std::collections::BTreeSet;
use std::error::Error;

use semdisc::{DiscoveryEngine, Iri, LoggingYamlConfig, SemdiscConfig};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: semdisc <config.yaml> <concept-iri>...";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let Some(config_path) = args.next() else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };
    let initial: BTreeSet<Iri> = args.map(Iri::new).collect();
    if initial.is_empty() {
        eprintln!("{USAGE}");
        std::process::exit(2);
    }

    let config = SemdiscConfig::from_file(&config_path)?;
    init_tracing(&config.logging);

    let engine = DiscoveryEngine::from_config(&config)?;
    let outcome = engine.reachable_operations(&initial).await?;

    println!(
        "{} operation(s) reachable from {} concept(s), {} pass(es), {}",
        outcome.operations.len(),
        initial.len(),
        outcome.passes.len(),
        outcome.completion
    );
    for result in engine.rank(outcome.operations.into_values()) {
        println!(
            "{:>5.2}  {:<15}  {}",
            result.score().unwrap_or_default(),
            result.match_type().to_string(),
            result.matched_resource()
        );
    }
    Ok(())
}

/// `RUST_LOG` wins over the configured level when set.
fn init_tracing(logging: &LoggingYamlConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.to_ascii_lowercase()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    #[cfg(feature = "json-logs")]
    if logging.json {
        builder.json().init();
        return;
    }
    builder.init();
}
