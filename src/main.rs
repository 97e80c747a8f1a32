use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::Notify;

use snippetbox::app::Application;
use snippetbox::config::{Config, Overrides};
use snippetbox::models::{open_db, SnippetModel};
use snippetbox::server::{
    create_reusable_listener, start_server_loop, start_signal_handler, ServerState,
};
use snippetbox::templates::TemplateCache;
use snippetbox::{handler, logger};

/// Command-line flags; each one overrides the file and environment layers
#[derive(Debug, Parser)]
#[command(version, about = "Share and view short text snippets")]
struct Args {
    /// HTTP network address
    #[arg(long)]
    addr: Option<SocketAddr>,

    /// Database data source name
    #[arg(long)]
    dsn: Option<String>,

    /// Configuration file, without extension
    #[arg(long, default_value = "snippetbox")]
    config: String,

    /// Directory served under /static/
    #[arg(long)]
    static_dir: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut cfg = Config::load_from(&args.config)?;
    cfg.apply_overrides(Overrides {
        addr: args.addr,
        dsn: args.dsn,
        static_dir: args.static_dir,
    });
    logger::init(&cfg.logging)?;

    // Create the Tokio runtime, sized by the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;

    let pool = open_db(&cfg.database).await?;
    logger::log_database_ready(&cfg.database.dsn);

    let app = Arc::new(Application::new(
        SnippetModel::new(pool.clone()),
        TemplateCache::new(),
    ));
    let chain = handler::routes(app, &cfg);

    let listener = create_reusable_listener(addr, cfg.server.backlog)?;
    logger::log_server_start(&addr, &cfg);

    let shutdown = Arc::new(Notify::new());
    start_signal_handler(Arc::clone(&shutdown))?;

    let state = Arc::new(ServerState::new(cfg, chain));
    start_server_loop(listener, state, shutdown).await;

    pool.close().await;
    Ok(())
}
