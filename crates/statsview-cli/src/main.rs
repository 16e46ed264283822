mod cli;

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use statsview_core::artifact::{load_tree, read_node, resolve_artifact_path};
use statsview_core::model::validate_root;
use statsview_core::render::{render, MemorySurface, SlotId};
use statsview_core::report::{export_csv, export_html, export_json, ReportOptions, RunInfo};
use statsview_core::StatsError;

use crate::cli::{Cli, Commands, ExportFormat};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries command output.
    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<ExitCode, StatsError> {
    match command {
        Commands::Show { artifact, path } => {
            let tree = load_tree(&artifact)?;
            let node = match path.as_deref() {
                Some(id) => tree.node(id)?,
                None => tree.root(),
            };
            let mut surface: MemorySurface = MemorySurface::new();
            render(&node.stats, &mut surface)?;

            let mut out = std::io::stdout().lock();
            writeln!(out, "{} ({}, {})", node.name, node.kind, node.path_id)?;
            for (slot, text) in surface.iter() {
                writeln!(out, "  {:<34} {}", slot.to_string(), text)?;
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Validate { artifact } => {
            let root = read_node(&artifact)?;
            let errors = validate_root(&root);
            if errors.is_empty() {
                info!(path = %artifact.display(), "artifact is consistent");
                println!("ok");
                return Ok(ExitCode::SUCCESS);
            }
            for err in &errors {
                println!("{err}");
            }
            error!("{} validation failure(s)", errors.len());
            Ok(ExitCode::FAILURE)
        }

        Commands::Export {
            artifact,
            format,
            out,
            title,
            no_buckets,
        } => {
            let tree = load_tree(&artifact)?;
            let rendered = match format {
                ExportFormat::Json => export_json(&tree)?,
                ExportFormat::Csv => export_csv(&tree)?,
                ExportFormat::Html => {
                    let run = RunInfo::from_artifact_path(&resolve_artifact_path(&artifact));
                    let options = ReportOptions {
                        title,
                        include_buckets: !no_buckets,
                    };
                    export_html(&tree, run.as_ref(), &options)?
                }
            };
            match out {
                Some(path) => {
                    std::fs::write(&path, rendered)?;
                    info!(path = %path.display(), ?format, "report written");
                }
                None => std::io::stdout().lock().write_all(rendered.as_bytes())?,
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Slots => {
            for slot in SlotId::all() {
                println!("{slot}");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
