use anyhow::{Result, anyhow};
use clap::Parser;
use postsweep_actor::{Actor, exit_code};
use postsweep_app::cli::Cli;
use postsweep_app::sweep;
use postsweep_common::observability::{LogConfig, LogFormat, init_logging, shutdown_logging};
use postsweep_config::{PostsweepConfig, PostsweepConfigLoader};
use postsweep_graph::GraphApi;

const DEFAULT_CONFIG_FILE: &str = "postsweep.yaml";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Load config (env wins over file)
    let loader = match &cli.config {
        Some(path) => PostsweepConfigLoader::new().with_file(path),
        None => PostsweepConfigLoader::new().with_optional_file(DEFAULT_CONFIG_FILE),
    };
    let mut cfg: PostsweepConfig = loader.load()?;
    if let Some(dir) = cli.storage_dir {
        cfg.storage.dir = dir;
    }

    // 2) Logging
    let format = match cli.log_format {
        Some(f) => f,
        None => cfg.logging.format.parse::<LogFormat>().map_err(|e| anyhow!(e))?,
    };
    let log_path = init_logging(LogConfig {
        log_dir: cfg.logging.dir.clone(),
        emit_stderr: cfg.logging.stderr,
        format,
        default_filter: cfg.logging.filter.clone(),
        ..LogConfig::default()
    })?;
    tracing::debug!(log_file = %log_path.display(), "logging initialised");

    // 3) Wire collaborators inside the actor scope and run
    let graph_settings = cfg.graph;
    let result = Actor::from_settings(&cfg.storage)
        .run(|ctx| async move {
            let graph = GraphApi::new(&graph_settings.base_url, graph_settings.api_version.as_str())?
                .with_timeout(graph_settings.timeout());
            sweep(ctx, graph).await
        })
        .await;
    if let Ok(summary) = &result {
        tracing::info!(query = %summary.query, pushed = summary.pushed, "run complete");
    }

    let code = exit_code(&result);
    shutdown_logging();
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
