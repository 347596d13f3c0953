use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Read delimited files as typed record datasets", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the declared field names
    Fields(SourceArgs),
    /// Count the records in a dataset
    Count(CountArgs),
    /// Print the first records of a dataset
    Preview(PreviewArgs),
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Input delimited file
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Field names, in column order
    #[arg(short = 'f', long = "fields", value_delimiter = ',', required = true)]
    pub fields: Vec<String>,
    /// Field delimiter (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Treat the first row as data instead of a header
    #[arg(long = "no-header")]
    pub no_header: bool,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct CountArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Count at most this many records
    #[arg(long)]
    pub limit: Option<u64>,
    /// Count against a private snapshot of the input
    #[arg(long)]
    pub snapshot: bool,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Number of records to display
    #[arg(long, default_value_t = 10)]
    pub rows: u64,
    /// Read through a private snapshot of the input
    #[arg(long)]
    pub snapshot: bool,
    /// Emit one JSON object per record instead of a table
    #[arg(long)]
    pub json: bool,
    /// Annotate each cell with its resolved kind
    #[arg(long)]
    pub kinds: bool,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
