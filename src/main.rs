use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use timber_cruiser::{
    analysis::StatsMetric,
    io::{self, read_sheet},
    models::{parse_inventory_date, Stand},
    visualization::{
        print_diameter_table, print_logs_table, print_stand_summary, print_statistics_table,
    },
    CruiseConfig,
};

#[derive(Parser)]
#[command(
    name = "timber-cruiser",
    about = "Timber Cruiser - merchantable volume, grading, and stand statistics",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a cruise sheet and report stand summaries and statistics
    Cruise {
        /// Path to input sheet (CSV, JSON, or Excel)
        #[arg(short, long)]
        input: PathBuf,

        /// Stand name to report (default: every stand in the sheet)
        #[arg(short, long)]
        stand: Option<String>,

        /// Stand acreage to record
        #[arg(short, long, default_value = "0.0")]
        acres: f64,

        /// Inventory date (e.g. 01/15/2020; default: today)
        #[arg(short, long)]
        date: Option<String>,

        /// Optional TOML file with cruise defaults
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Skip the log merchandizing table
        #[arg(long)]
        no_logs: bool,
    },

    /// Show what a cruise sheet contains without computing volumes
    Summary {
        /// Path to input sheet (CSV, JSON, or Excel)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Convert a cruise sheet: .json keeps the normalized record,
    /// .csv/.xlsx compute and export the inventory table
    Convert {
        /// Input sheet path
        #[arg(short, long)]
        input: PathBuf,

        /// Output path (.json, .csv, or .xlsx)
        #[arg(short, long)]
        output: PathBuf,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}

fn build_stands(
    sheet: &timber_cruiser::io::sheet::CruiseSheet,
    only: Option<&str>,
    acres: f64,
    date: Option<&str>,
) -> Result<Vec<Stand>> {
    let date = match date {
        Some(s) => parse_inventory_date(s)?,
        None => chrono::Local::now().date_naive(),
    };
    let names: Vec<String> = match only {
        Some(name) => vec![name.to_string()],
        None => sheet.stands.keys().cloned().collect(),
    };
    let mut stands = Vec::new();
    for name in names {
        let mut stand = Stand::new(name, acres, date);
        stand.import(sheet)?;
        stands.push(stand);
    }
    Ok(stands)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Cruise {
            input,
            stand,
            acres,
            date,
            config,
            no_logs,
        } => {
            let config = match config {
                Some(path) => CruiseConfig::from_file(path)?,
                None => CruiseConfig::default(),
            };
            println!(
                "\n{}",
                format!("Timber Cruise: {}", input.display()).bold().cyan()
            );
            let sheet = read_sheet(&input)?;
            let stands = build_stands(&sheet, stand.as_deref(), acres, date.as_deref())?;
            for stand in &stands {
                println!(
                    "  {} {} plots, {} trees",
                    stand.name().bold(),
                    stand.plot_count(),
                    stand.tree_count()
                );
                print_stand_summary(stand);
                print_diameter_table(stand);
                if !no_logs {
                    print_logs_table(stand);
                }
                print_statistics_table(stand);
                if let Ok(ci) =
                    stand.confidence_interval(StatsMetric::NetBfAc, config.confidence_level)
                {
                    println!(
                        "\n{} {:.0} bd ft/ac ({:.0}% CI {:.0} - {:.0}, +/-{:.1}%)",
                        "Net board feet:".bold(),
                        ci.mean,
                        ci.confidence_level * 100.0,
                        ci.lower,
                        ci.upper,
                        ci.sampling_error_percent
                    );
                }
            }
        }

        Commands::Summary { input } => {
            let sheet = read_sheet(&input)?;
            println!(
                "\n{}",
                format!("Cruise sheet: {}", input.display()).bold().cyan()
            );
            for (name, record) in &sheet.stands {
                let trees: usize = record.plots.values().map(|p| p.trees.len()).sum();
                println!(
                    "  {} - {} plots, {} trees",
                    name.bold(),
                    record.plots.len(),
                    trees
                );
            }
        }

        Commands::Convert {
            input,
            output,
            pretty,
        } => {
            let sheet = read_sheet(&input)?;
            let ext = output
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("")
                .to_lowercase();
            match ext.as_str() {
                "json" => io::write_json(&sheet, &output, pretty)?,
                "csv" => {
                    let stands = build_stands(&sheet, None, 0.0, None)?;
                    io::write_inventory_csv(&stands, &output)?;
                }
                "xlsx" => {
                    let stands = build_stands(&sheet, None, 0.0, None)?;
                    io::write_inventory_xlsx(&stands, &output)?;
                }
                other => anyhow::bail!("unsupported output format: .{other}"),
            }
            println!("{} {}", "Wrote".green(), output.display());
        }
    }
    Ok(())
}
