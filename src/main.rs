use std::io::Read;

use clap::Parser;
use serde::Serialize;
use tracing::Level;

use mcd::{Item, Kind, MonospaceFonts, Params, Style, Variant};

const DEFAULT_STYLE: &str = include_str!("../styles/default.json");

#[derive(Parser)]
#[command(
    name = "mcd",
    about = "Lay out association clauses of a conceptual data model and print their drawing descriptors as JSON"
)]
struct Cli {
    /// Input file with one clause per line (reads from stdin if not provided)
    file: Option<std::path::PathBuf>,

    /// Style file (JSON object); the bundled style is used if not provided
    #[arg(long, short = 's')]
    style: Option<std::path::PathBuf>,

    /// Cartouche marking dependent-entity associations
    #[arg(long, default_value = "DF")]
    df_label: String,

    /// Cardinality template, `{min}` and `{max}` are substituted
    #[arg(long, default_value = "{min},{max}")]
    card_format: String,

    /// Character advance as a fraction of the font size
    #[arg(long, default_value_t = 0.6)]
    advance_ratio: f64,

    /// Line height as a fraction of the font size
    #[arg(long, default_value_t = 1.2)]
    line_height_ratio: f64,

    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Serialize)]
struct Report<'a> {
    association: &'a str,
    kind: Kind,
    variant: Variant,
    width: Option<i64>,
    height: Option<i64>,
    legs: Vec<&'a str>,
    descriptor: Vec<Item>,
}

fn read_or_exit(path: &std::path::Path) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("ERROR: failed to read {}: {e}", path.display());
        std::process::exit(1);
    })
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let input = match &cli.file {
        Some(path) => read_or_exit(path),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).unwrap_or_else(|e| {
                eprintln!("ERROR: failed to read stdin: {e}");
                std::process::exit(1);
            });
            buf
        }
    };

    let style_text = match &cli.style {
        Some(path) => read_or_exit(path),
        None => DEFAULT_STYLE.to_string(),
    };

    let params = Params {
        df_label: cli.df_label,
        card_format: cli.card_format,
    };
    let fonts = MonospaceFonts {
        advance_ratio: cli.advance_ratio,
        line_height_ratio: cli.line_height_ratio,
    };

    let result = Style::from_json(&style_text).and_then(|style| {
        let associations = mcd::layout_clauses(&input, &params, &style, &fonts)?;
        tracing::info!(count = associations.len(), "laid out associations");
        let mut reports = Vec::with_capacity(associations.len());
        for a in &associations {
            reports.push(Report {
                association: a.name(),
                kind: a.kind(),
                variant: a.variant(),
                width: a.width(),
                height: a.height(),
                legs: a.leg_identifiers().collect(),
                descriptor: a.describe()?,
            });
        }
        Ok(serde_json::to_string_pretty(&reports)?)
    });

    match result {
        Ok(output) => println!("{output}"),
        Err(e) => {
            eprintln!("ERROR: {e}");
            std::process::exit(1);
        }
    }
}
