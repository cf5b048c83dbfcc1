// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! ferro-extract CLI
//!
//! Command-line interface for extracting canonical variants from VCF files.

use clap::{Args, Parser, Subcommand};
use ferro_extract::cli::{output_error, write_variants, OutputFormat};
use ferro_extract::export::{write_table, BamSurgeonWriter};
use ferro_extract::vcf::VcfRecordIterator;
use ferro_extract::{ConfigFile, ExtractConfig, ExtractError, VariantExtractor};
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

type FileExtractor = VariantExtractor<VcfRecordIterator<Box<dyn BufRead>>>;

#[derive(Parser)]
#[command(name = "ferro-extract")]
#[command(author, version, about = "Extract and canonicalize variants from VCF files")]
#[command(
    long_about = "Extract SNVs, indels and structural variants from VCF files in a single \
canonical representation. Breakend mates are paired, compound edits are split into atomic \
events and multiallelic records are expanded.

Examples:
  ferro-extract extract input.vcf.gz -o canonical.vcf
  ferro-extract extract input.vcf --format json --pass-only
  ferro-extract table input.vcf -o variants.csv --fasta GRCh38.fa
  ferro-extract bamsurgeon input.vcf spikes/sample1"
)]
struct Cli {
    /// Log level filter (e.g. warn, info, debug, ferro_extract=trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// Input VCF file, plain or gzipped (use - for stdin)
    input: PathBuf,

    /// Drop records whose FILTER is not PASS
    #[arg(long)]
    pass_only: bool,

    /// Emit breakends without a mate instead of failing
    #[arg(long)]
    allow_unpaired: bool,

    /// Reference FASTA used to fill anchor bases
    #[arg(short = 'f', long)]
    fasta: Option<PathBuf>,

    /// Configuration file (defaults to .ferro-extract.toml or ~/.config/ferro/extract.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write canonical variants as VCF or JSON lines
    Extract {
        #[command(flatten)]
        input: InputArgs,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "vcf", value_parser = ["vcf", "json"])]
        format: String,
    },

    /// Write one CSV row per variant
    Table {
        #[command(flatten)]
        input: InputArgs,

        /// Output CSV file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write BAMSurgeon SNV, indel and SV input files (PASS records only)
    Bamsurgeon {
        #[command(flatten)]
        input: InputArgs,

        /// Output prefix; files are <prefix>_snv.in, <prefix>_indel.in and <prefix>_sv.in
        output_schema: String,

        /// Seed for the random sequence of symbolic insertions
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(&cli.log_level) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    let result = match cli.command {
        Commands::Extract {
            input,
            output,
            format,
        } => extract_command(&input, output.as_deref(), &format),
        Commands::Table { input, output } => table_command(&input, output.as_deref()),
        Commands::Bamsurgeon {
            input,
            output_schema,
            seed,
        } => bamsurgeon_command(&input, &output_schema, seed),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let _ = output_error(&mut io::stderr(), &e, OutputFormat::Vcf);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(level: &str) -> Result<(), String> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter =
        EnvFilter::try_new(level).map_err(|e| format!("Invalid log level '{}': {}", level, e))?;

    // Library diagnostics go through `log`; try_init() bridges them in
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .try_init()
        .map_err(|e| format!("Failed to initialize logging: {}", e))
}

/// Resolve the extraction settings: config file first, CLI flags on top
fn resolve_config(args: &InputArgs) -> Result<ExtractConfig, ExtractError> {
    let file_config = match &args.config {
        Some(path) => ConfigFile::load_from_path(path)?,
        None => ConfigFile::load().unwrap_or_default(),
    };
    Ok(file_config.merge_with_cli(args.pass_only, args.allow_unpaired, args.fasta.as_deref()))
}

fn open_extractor(args: &InputArgs, config: ExtractConfig) -> Result<FileExtractor, ExtractError> {
    info!("Reading VCF file: {}", args.input.display());
    VariantExtractor::from_path(&args.input, config)
}

fn create_output(path: Option<&Path>) -> Result<Box<dyn Write>, ExtractError> {
    match path {
        Some(p) if p != Path::new("-") => {
            let file = File::create(p).map_err(|e| ExtractError::Io {
                msg: format!("Failed to create '{}': {}", p.display(), e),
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        _ => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

fn extract_command(
    args: &InputArgs,
    output: Option<&Path>,
    format: &str,
) -> Result<(), ExtractError> {
    let format: OutputFormat = format.parse()?;
    let mut extractor = open_extractor(args, resolve_config(args)?)?;
    let header = extractor.header().clone();
    let mut writer = create_output(output)?;

    let written = write_variants(&mut writer, &header, extractor.by_ref(), format)?;
    info!("Wrote {} variants ({})", written, extractor.stats());
    Ok(())
}

fn table_command(args: &InputArgs, output: Option<&Path>) -> Result<(), ExtractError> {
    let mut extractor = open_extractor(args, resolve_config(args)?)?;
    let writer = create_output(output)?;

    let rows = write_table(writer, extractor.by_ref())?;
    info!("Wrote {} rows ({})", rows, extractor.stats());
    Ok(())
}

fn bamsurgeon_command(
    args: &InputArgs,
    output_schema: &str,
    seed: Option<u64>,
) -> Result<(), ExtractError> {
    // Spike-ins are only generated for confident calls
    let config = resolve_config(args)?.with_pass_only(true);
    let mut extractor = open_extractor(args, config)?;

    let mut writer = BamSurgeonWriter::create(output_schema)?;
    if let Some(seed) = seed {
        writer = writer.with_seed(seed);
    }
    for variant in extractor.by_ref() {
        writer.write(&variant?)?;
    }
    let counts = writer.counts();
    writer.finish()?;

    info!(
        "Output files generated: {s}_snv.in ({}), {s}_indel.in ({}), {s}_sv.in ({}); {} skipped",
        counts.snv,
        counts.indel,
        counts.sv,
        counts.skipped,
        s = output_schema
    );
    info!("{}", extractor.stats());
    Ok(())
}
