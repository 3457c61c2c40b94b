use std::path::PathBuf;

use clap::Parser;
use postsweep_common::observability::LogFormat;

/// Search Facebook posts for a keyword and store the flattened results.
///
/// The query and access token come from the actor input record
/// (`storage/key_value_stores/default/INPUT.json` by default).
#[derive(Debug, Parser)]
#[command(name = "postsweep", version)]
pub struct Cli {
    /// YAML configuration file. Without it, `postsweep.yaml` is read if present.
    #[arg(long, env = "POSTSWEEP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Root of the local storage tree (overrides `storage.dir`).
    #[arg(long, env = "POSTSWEEP_STORAGE_DIR")]
    pub storage_dir: Option<PathBuf>,

    /// Log encoding: `text` or `json` (overrides `logging.format`).
    #[arg(long, env = "POSTSWEEP_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,
}
