//! `pubnorm` binary: normalize a saved PubMed response and export the records.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use pubnorm::export::parse_fields;
use pubnorm::{
    CsvExporter, DocumentReader, JsonLinesExporter, JsonReader, Normalizer, NormalizerConfig,
    PubmedXmlReader, RecordExporter,
};

/// Normalize PubMed citation documents into article records.
#[derive(Parser, Debug)]
#[command(name = "pubnorm")]
#[command(version)]
#[command(about = "Normalize PubMed citation documents into article records")]
struct Args {
    /// Saved efetch XML response, or JSON holding one document or an array of them.
    input: PathBuf,

    /// How to read the input (guessed from the file extension by default).
    #[arg(long, value_enum)]
    input_format: Option<InputFormat>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Jsonl)]
    format: OutputFormat,

    /// Output file. Records go to stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory that relative output paths are resolved against.
    #[arg(long, env = "PUBNORM_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Comma separated fields to export, e.g. "pmid,title".
    #[arg(long)]
    fields: Option<String>,

    /// Write publication dates as "year-month-day" text.
    #[arg(long)]
    convert_date: bool,

    /// Normalize on all cores.
    #[arg(long)]
    parallel: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum InputFormat {
    Xml,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Jsonl,
}

impl Args {
    fn input_format(&self) -> InputFormat {
        self.input_format.unwrap_or_else(|| {
            match self.input.extension().and_then(|ext| ext.to_str()) {
                Some(ext) if ext.eq_ignore_ascii_case("xml") => InputFormat::Xml,
                _ => InputFormat::Json,
            }
        })
    }

    fn output_path(&self) -> Option<PathBuf> {
        let output = self.output.as_ref()?;
        Some(match &self.output_dir {
            Some(dir) if output.is_relative() => dir.join(output),
            _ => output.clone(),
        })
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let input = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let documents = match args.input_format() {
        InputFormat::Xml => PubmedXmlReader::new().read(&input),
        InputFormat::Json => JsonReader::new().read(&input),
    }
    .with_context(|| format!("failed to parse {}", args.input.display()))?;

    let normalizer = Normalizer::new().with_config(NormalizerConfig {
        convert_date: args.convert_date,
        run_in_parallel: args.parallel,
    });
    let records = normalizer.normalize_all(&documents)?;
    info!(
        documents = documents.len(),
        records = records.len(),
        "normalized documents"
    );

    let fields = args
        .fields
        .as_deref()
        .map(parse_fields)
        .transpose()?
        .unwrap_or_default();
    let output = args.output_path();
    match args.format {
        OutputFormat::Csv => write_records(
            &CsvExporter::new().with_fields(fields),
            &records,
            output.as_deref(),
        ),
        OutputFormat::Jsonl => write_records(
            &JsonLinesExporter::new().with_fields(fields),
            &records,
            output.as_deref(),
        ),
    }
    .context("failed to export records")
}

fn write_records(
    exporter: &impl RecordExporter,
    records: &[pubnorm::ArticleRecord],
    output: Option<&Path>,
) -> pubnorm::Result<()> {
    match output {
        Some(path) => exporter.export_to_path(records, path),
        None => exporter.export(records, io::stdout().lock()),
    }
}

/// Logs go to stderr so stdout stays clean for exported records.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("pubnorm=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pubnorm=warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}
