use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Local;
use clap::Parser;
use miette::IntoDiagnostic;
use tracing::info;
use tracing_subscriber::EnvFilter;

use enterobase_fetch::app::AssemblyFetcher;
use enterobase_fetch::config::{ConfigLoader, RunOptions};
use enterobase_fetch::domain::Database;
use enterobase_fetch::enterobase::{DEFAULT_SERVER, EnterobaseHttpClient};
use enterobase_fetch::error::EnteroError;
use enterobase_fetch::output::{ConsoleOutput, JsonOutput, OutputMode};
use enterobase_fetch::pacing::DEFAULT_INTERVAL_SECS;
use enterobase_fetch::prompt::{CredentialSource, TerminalCredentials};
use enterobase_fetch::registry::BarcodeRegistry;

#[derive(Parser)]
#[command(name = "entero-fetch")]
#[command(about = "Download genome assemblies from Enterobase using a list of assembly barcodes")]
#[command(version)]
struct Cli {
    /// Two-column tab-delimited file (name, barcode). Pass `i` to print instructions.
    #[arg(short, long, required_unless_present = "instructions")]
    input: Option<PathBuf>,

    /// Enterobase database to download assemblies from.
    #[arg(short, long, default_value_t = Database::default().to_string())]
    database: String,

    /// Output directory [default: ./Enterobase_Assemblies<YYYYMMDD_HHMM>]
    #[arg(short, long)]
    outdir: Option<PathBuf>,

    /// Append the barcode to each file name (`name__barcode.fna`).
    #[arg(short, long, alias = "append_barcode")]
    append_barcode: bool,

    /// Seconds to wait between two consecutive barcodes; non-positive means 4.
    #[arg(short, long, default_value_t = DEFAULT_INTERVAL_SECS as i64, allow_negative_numbers = true)]
    time: i64,

    /// Enterobase server base URL.
    #[arg(long, default_value = DEFAULT_SERVER)]
    server: String,

    /// Print the run summary as JSON instead of progress lines.
    #[arg(long)]
    json: bool,

    /// Print instructions for building the input list and exit.
    #[arg(long)]
    instructions: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<EnteroError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &EnteroError) -> u8 {
    match error {
        EnteroError::InvalidDatabase(_)
        | EnteroError::MissingInput(_)
        | EnteroError::InputRead(_) => 0,
        EnteroError::Authentication { .. }
        | EnteroError::Http(_)
        | EnteroError::InvalidResponse(_) => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if cli.instructions || cli.input.as_deref() == Some(Path::new("i")) {
        print_instructions();
        return Ok(());
    }
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Interactive
    };

    let input = cli
        .input
        .ok_or_else(|| miette::Report::msg("--input is required"))?;
    let options = RunOptions {
        input,
        database: cli.database,
        output_dir: cli.outdir,
        append_barcode: cli.append_barcode,
        interval_secs: cli.time,
        server: cli.server,
    };

    let config = ConfigLoader::resolve(options, Local::now())?;
    let registry = BarcodeRegistry::load(&config.input)?;
    ConfigLoader::ensure_output_dir(&config)?;
    info!(
        database = %config.database,
        entries = registry.len(),
        output_dir = %config.output_dir,
        "downloader initialised"
    );

    let credentials = TerminalCredentials.credentials()?;
    let client = EnterobaseHttpClient::new(&config.server)?;
    let fetcher = AssemblyFetcher::new(client, credentials, &config);

    match output_mode {
        OutputMode::Json => {
            let summary = fetcher.run(&registry, &JsonOutput)?;
            JsonOutput::print_summary(&summary).into_diagnostic()?;
        }
        OutputMode::Interactive => {
            let summary = fetcher.run(&registry, &ConsoleOutput)?;
            ConsoleOutput::print_summary(&summary);
        }
    }
    Ok(())
}

fn print_instructions() {
    println!();
    println!("Creating the barcode list from Enterobase:");
    println!();
    println!("1. Open enterobase.warwick.ac.uk, pick a database and choose \"Search strains\".");
    println!("2. Search for the strains you want.");
    println!("3. Set \"Experimental Data\" (top right) to \"Assembly Stats\".");
    println!("4. Save the table with \"Data > Save to Local File\".");
    println!("5. The saved file has one column per table column, including \"Assembly Barcode\".");
    println!("6. Build a two-column TSV (name, barcode) from it; names become output file names.");
    println!();
    println!("A valid Enterobase login with API access to the chosen database is required.");
    println!(
        "Set {} and {} to skip the interactive prompt.",
        enterobase_fetch::prompt::USERNAME_ENV,
        enterobase_fetch::prompt::PASSWORD_ENV
    );
}
