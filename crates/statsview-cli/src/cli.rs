use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "statsview",
    version,
    about = "Inspect and export load-test statistics summaries",
    long_about = None,
    arg_required_else_help(true),
    propagate_version(true)
)]
pub(crate) struct Cli {
    /// Tracing filter directive, e.g. `info` or `statsview_core=debug`.
    #[arg(long, global = true, env = "STATSVIEW_LOG", default_value = "info")]
    pub(crate) log_level: String,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Render one node into the display slots and print them.
    #[command(arg_required_else_help = true)]
    Show {
        /// `stats.js`, JSON file, or report directory.
        artifact: PathBuf,
        /// `pathFormatted` of the node to show; defaults to the root.
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Check every consistency rule and list all failures.
    #[command(arg_required_else_help = true)]
    Validate { artifact: PathBuf },

    /// Write the tree as JSON, HTML or CSV.
    #[command(arg_required_else_help = true)]
    Export {
        artifact: PathBuf,
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Output file; stdout when omitted.
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// HTML page title.
        #[arg(long)]
        title: Option<String>,
        /// Leave out the response-time distribution tables (HTML only).
        #[arg(long, default_value_t = false)]
        no_buckets: bool,
    },

    /// Print the display slot ids in render order.
    Slots,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum ExportFormat {
    Json,
    Html,
    Csv,
}
