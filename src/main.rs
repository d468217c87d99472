//! # Scan the saved universe with default thresholds
//! market-scanner scan
//!
//! # Scan the 100 largest names with a custom config, without writing JSON
//! market-scanner scan --config scanner.toml --top-n 100 --no-save
//!
//! # Build the universe from a screener export
//! market-scanner import --csv finviz.csv --output data/universe.txt

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::info;

use market_scanner::{
    loader::DirectoryLoader,
    logger::init_logger,
    universe::{import_from_csv, resolve_universe, save_ticker_list},
    Scanner, ScannerConfig,
};

#[derive(Parser)]
#[command(name = "market-scanner")]
#[command(about = "Classify stocks as strong trend, panic or euphoria")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load, filter and classify the ticker universe
    Scan {
        /// Path to a TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory holding profiles.csv and prices/
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Ticker list, one symbol per line
        #[arg(short, long)]
        universe: Option<PathBuf>,

        /// Only scan the first N tickers of the list
        #[arg(short = 'n', long)]
        top_n: Option<usize>,

        /// Directory for the JSON report
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the report without writing JSON
        #[arg(long)]
        no_save: bool,
    },

    /// Import tickers from a screener CSV export
    Import {
        /// CSV file to read
        #[arg(long)]
        csv: PathBuf,

        /// Column holding the tickers (detected when omitted)
        #[arg(long)]
        column: Option<String>,

        /// Ticker list to write
        #[arg(short, long, default_value = "data/universe.txt")]
        output: PathBuf,
    },
}

fn main() -> eyre::Result<()> {
    init_logger();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            config,
            data,
            universe,
            top_n,
            output,
            no_save,
        } => {
            let mut settings = ScannerConfig::load(config.as_deref())?;
            if let Some(data) = data {
                settings = settings.with_data_dir(data);
            }
            if let Some(universe) = universe {
                settings = settings.with_universe_file(universe);
            }
            if let Some(output) = output {
                settings = settings.with_results_dir(output);
            }
            if top_n.is_some() {
                settings = settings.with_top_n(top_n);
            }

            let tickers = resolve_universe(&settings.universe_file, settings.top_n)?;
            let loader = DirectoryLoader::new(&settings.data_dir, settings.history_days);
            let scanner = Scanner::new(settings)?;

            let Some(report) = scanner.run(&loader, &tickers)? else {
                return Ok(());
            };

            println!("{}", report.render());

            if !no_save {
                report.save(&scanner.config().results_dir)?;
            }

            info!("Analysis complete");
        }
        Commands::Import {
            csv,
            column,
            output,
        } => {
            let tickers = import_from_csv(&csv, column.as_deref())?;
            save_ticker_list(&output, &tickers)?;
        }
    }

    Ok(())
}
