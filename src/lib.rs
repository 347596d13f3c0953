pub mod cli;
pub mod copy;
pub mod csv_source;
pub mod dataset;
pub mod error;
pub mod io_utils;
pub mod literal;
pub mod record;
pub mod store;
pub mod table;
pub mod truncate;

use std::{env, io::Write, sync::OnceLock};

use anyhow::{Context, anyhow};
use clap::Parser;
use log::{LevelFilter, debug, info};

pub use crate::{
    copy::CopyDataset,
    csv_source::{CsvDataset, CsvOptions},
    dataset::{Connection, Dataset, collect_records, count_records},
    error::{DatasetError, Result},
    literal::{Literal, LiteralKind},
    record::Record,
    truncate::TruncateDataset,
};

use crate::cli::{Cli, Commands, CountArgs, PreviewArgs, SourceArgs};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_dataset", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Fields(args) => handle_fields(&args),
        Commands::Count(args) => handle_count(&args),
        Commands::Preview(args) => handle_preview(&args),
    }
}

fn source_dataset(args: &SourceArgs) -> anyhow::Result<CsvDataset> {
    let encoding =
        io_utils::resolve_encoding(args.input_encoding.as_deref()).map_err(|err| anyhow!(err))?;
    let options = CsvOptions {
        has_header: !args.no_header,
        delimiter: io_utils::resolve_input_delimiter(&args.input, args.delimiter),
        encoding,
    };
    debug!(
        "Reading {:?} with delimiter '{}' and {} field(s)",
        args.input,
        io_utils::printable_delimiter(options.delimiter),
        args.fields.len()
    );
    Ok(CsvDataset::with_options(
        &args.input,
        options,
        args.fields.clone(),
    ))
}

/// Wraps the input in a snapshot and/or a limit, in that order.
fn compose(
    args: &SourceArgs,
    snapshot: bool,
    limit: Option<u64>,
) -> anyhow::Result<Box<dyn Dataset>> {
    let base = source_dataset(args)?;
    let dataset: Box<dyn Dataset> = if snapshot {
        let copy = CopyDataset::new(&base)
            .with_context(|| format!("Snapshotting {:?}", args.input))?;
        base.release()
            .with_context(|| format!("Releasing {:?}", args.input))?;
        Box::new(copy)
    } else {
        Box::new(base)
    };
    let dataset: Box<dyn Dataset> = match limit {
        Some(limit) => Box::new(TruncateDataset::new(dataset, limit)),
        None => dataset,
    };
    Ok(dataset)
}

fn handle_fields(args: &SourceArgs) -> anyhow::Result<()> {
    let dataset = source_dataset(args)?;
    let mut stdout = std::io::stdout().lock();
    for field in dataset.fields() {
        writeln!(stdout, "{field}")?;
    }
    dataset.release()?;
    Ok(())
}

fn handle_count(args: &CountArgs) -> anyhow::Result<()> {
    let dataset = compose(&args.source, args.snapshot, args.limit)?;
    let count = match dataset.num_records() {
        Some(count) => count,
        None => {
            // The count swallows the cause; rescan to report it.
            let mut conn = dataset
                .open()
                .with_context(|| format!("Opening {:?}", args.source.input))?;
            let scanned = collect_records(conn.as_mut(), None);
            let _ = conn.close();
            scanned.with_context(|| format!("Counting records in {:?}", args.source.input))?;
            return Err(anyhow!(
                "Record count for {:?} is unknown",
                args.source.input
            ));
        }
    };
    println!("{count}");
    info!("Counted {count} record(s) in {:?}", args.source.input);
    dataset.release()?;
    Ok(())
}

fn handle_preview(args: &PreviewArgs) -> anyhow::Result<()> {
    let dataset = compose(&args.source, args.snapshot, Some(args.rows))?;
    let fields = dataset.fields();
    let mut conn = dataset
        .open()
        .with_context(|| format!("Opening {:?}", args.source.input))?;
    let records = collect_records(conn.as_mut(), None);
    conn.close()?;
    let records = records.with_context(|| format!("Reading {:?}", args.source.input))?;

    let mut stdout = std::io::stdout().lock();
    if args.json {
        for record in &records {
            serde_json::to_writer(&mut stdout, record)?;
            writeln!(stdout)?;
        }
    } else {
        write!(
            stdout,
            "{}",
            table::render_records(&fields, &records, args.kinds)
        )?;
    }
    info!(
        "Displayed {} record(s) from {:?}",
        records.len(),
        args.source.input
    );
    dataset.release()?;
    Ok(())
}
