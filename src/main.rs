use std::env;
use std::sync::Arc;

use sw::config::Config;
use sw::core::Node;
use sw::evm::introspection::EvmRpc;
use sw::evm::introspection::NoIntrospection;
use sw::evm::introspection::TokenIntrospector;
use sw::monitor::Monitor;
use sw::store::postgres::PgStore;
use sw::workers::Worker;
use sw::workers::Workflow;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<(), String> {
    // Configure tracing subscriber
    let filter = env::var("SW_LOG").unwrap_or(String::from("sw=info"));
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_max_level(tracing::Level::INFO)
        .with_env_filter(filter)
        .finish();

    let _guard = tracing::subscriber::set_global_default(subscriber);

    tracing::info!("starting sw v{VERSION}");
    if cfg!(feature = "test-utilities") {
        tracing::warn!("build includes test-utilities, use cargo's `--no-default-features` flag");
    } else {
        tracing::debug!("compiled without test-utilities");
    }

    let config = Config::from_env().map_err(|e| e.to_string())?;
    tracing::info!(
        "indexing {} (ss58 prefix {}) from height {}",
        config.chain,
        config.ss58_prefix,
        config.start_height
    );

    let mut monitor = Monitor::new();

    let node = Node::new("archive", &config.archive_url);
    let introspector: Arc<dyn TokenIntrospector> = match &config.rpc_url {
        Some(url) => Arc::new(EvmRpc::new(url)),
        None => {
            tracing::warn!("no SW_RPC_URL set, token metadata will be left empty");
            Arc::new(NoIntrospection)
        }
    };
    let store = PgStore::new(&config.postgres)
        .await
        .map_err(|e| e.to_string())?;
    let workflow = Workflow::new(&config, Arc::new(node.clone()), introspector);
    let mut worker = Worker::new(
        "sw",
        node,
        store,
        workflow,
        config.start_height,
        config.batch_size,
        monitor.sender(),
    );

    // Start monitor
    tokio::spawn(async move {
        monitor.start().await;
    });

    // Worker returns on ctrl-c
    match worker.start().await {
        Ok(()) => {
            tracing::info!("exiting");
            Ok(())
        }
        Err(e) => {
            tracing::error!("{e}");
            Err(e.to_string())
        }
    }
}
