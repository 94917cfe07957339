use std::io::{self, Write};

use serde::Serialize;

use crate::app::{ProgressEvent, ProgressSink, RunSummary};

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Interactive,
    Json,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_summary(result: &RunSummary) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}

/// Prints one progress line per processed barcode.
pub struct ConsoleOutput;

impl ConsoleOutput {
    pub fn print_summary(result: &RunSummary) {
        let green = "\x1b[32m";
        let yellow = "\x1b[33m";
        let cyan = "\x1b[36m";
        let reset = "\x1b[0m";

        println!();
        println!("{cyan}Enterobase download summary ({}){reset}", result.database);
        println!(
            "{green}Downloaded assemblies: {}/{}{reset}",
            result.downloaded(),
            result.processed
        );
        println!(
            "{yellow}Barcode lookup errors: {}{reset}",
            result.lookup_errors.len()
        );
        println!(
            "{yellow}FASTA download errors: {}{reset}",
            result.download_errors.len()
        );
        println!("   output: {}", result.output_dir);
        println!("   barcode errors: {}", result.lookup_log);
        println!("   fasta errors: {}", result.download_log);
    }
}

impl ProgressSink for ConsoleOutput {
    fn event(&self, event: ProgressEvent) {
        let mut stdout = io::stdout();
        let _ = match event.elapsed {
            Some(elapsed) => writeln!(stdout, "{} ({:.1}s)", event.message, elapsed.as_secs_f64()),
            None => writeln!(stdout, "{}", event.message),
        };
        let _ = stdout.flush();
    }
}
