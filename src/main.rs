use anyhow::bail;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod cli;
mod parser;
mod table;

use cli::{Cli, Commands};
use table::TableLayout;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Analyze {
            community,
            hand,
            diagnostics,
            json,
        } => {
            if community.len() != hand.len() {
                bail!(
                    "{} community image(s) but {} hand image(s); pass them in pairs",
                    community.len(),
                    hand.len()
                );
            }

            let analyzer =
                parser::build_analyzer(cli.config.as_deref(), cli.templates, diagnostics)?;
            let pairs: Vec<(PathBuf, PathBuf)> = community.into_iter().zip(hand).collect();
            let results = analyzer.analyze_batch(&pairs);

            for (index, ((community, _), result)) in pairs.iter().zip(&results).enumerate() {
                parser::print_result(&community.display().to_string(), result);

                if let Some(path) = &json {
                    let out = if results.len() == 1 { path.clone() } else { indexed(path, index) };
                    analyzer.export_json(result, &out)?;
                    println!("  JSON saved: {:?}", out);
                }
            }
        }
        Commands::Table {
            screenshots,
            diagnostics,
        } => {
            let analyzer =
                parser::build_analyzer(cli.config.as_deref(), cli.templates, diagnostics)?;
            let layout = TableLayout::default();

            for screenshot in &screenshots {
                match parser::parse_table_capture(&analyzer, &layout, screenshot) {
                    Ok(result) => parser::print_result(&screenshot.display().to_string(), &result),
                    Err(e) => eprintln!("{}: {:#}", screenshot.display(), e),
                }
            }
        }
    }

    Ok(())
}

/// `out.json` -> `out_3.json`
fn indexed(path: &Path, index: usize) -> PathBuf {
    let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let ext = path.extension().map(|e| e.to_string_lossy().into_owned());
    let name = match ext {
        Some(ext) => format!("{}_{}.{}", stem, index, ext),
        None => format!("{}_{}", stem, index),
    };
    path.with_file_name(name)
}
