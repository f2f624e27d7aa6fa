//! `importprep` command-line front end.
//!
//! ```text
//! importprep columns 会員一覧.xlsx
//! importprep schema --registry docs/データ項目一覧.md
//! importprep export 'uploads/*.csv' -c content.id -c content.status -s content.status=チェック可 -e utf-8 --no-bom -o out
//! ```

use anyhow::{Context as _, Result, bail};
use clap::{ArgAction, Parser, Subcommand};
use importprep::io::glob::expand_inputs;
use importprep::logging;
use importprep::schema::SchemaResolution;
use importprep::{
    EncodingPolicy, OutputEncoding, Pipeline, ReplacementRule, RunContext, RunOutcome, Settings,
    load_source,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "importprep", version, about = "Prepare import-ready CSV files")]
struct Cli {
    /// Configuration file. Defaults to ./importprep.toml when present.
    #[arg(long, global = true, env = "IMPORTPREP_CONFIG")]
    config: Option<PathBuf>,

    /// Registry document declaring column types. Overrides the configuration.
    #[arg(long, global = true)]
    registry: Option<PathBuf>,

    /// Increase log detail (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the columns of an input file with their declared types
    Columns {
        /// Spreadsheet (.xlsx) or delimited (.csv, .tsv, .txt) file
        input: PathBuf,
    },
    /// Print the resolved column schema as JSON
    Schema,
    /// Select, replace, annotate and export one or more files
    Export {
        /// Input files or glob patterns
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output column, in output order. Repeat for more; all columns when omitted.
        #[arg(short = 'c', long = "column", value_name = "COLUMN")]
        columns: Vec<String>,

        /// Overwrite a whole column. A bare COLUMN uses its preset default.
        #[arg(short = 's', long = "set", value_name = "COLUMN[=VALUE]")]
        rules: Vec<ReplacementRule>,

        /// Output encoding: utf-8 or shift_jis.
        #[arg(short, long)]
        encoding: Option<OutputEncoding>,

        /// Prefix UTF-8 output with a byte-order mark.
        #[arg(long, overrides_with = "no_bom")]
        bom: bool,

        /// Do not prefix UTF-8 output with a byte-order mark.
        #[arg(long, overrides_with = "bom")]
        no_bom: bool,

        /// Directory for the exported files.
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("warning: {e:#}");
    }
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(registry) = cli.registry {
        settings.registry.path = registry;
    }

    match cli.command {
        Command::Columns { input } => handle_columns(&settings, &input),
        Command::Schema => handle_schema(&settings),
        Command::Export {
            inputs,
            columns,
            rules,
            encoding,
            bom,
            no_bom,
            out_dir,
        } => {
            let encoding = encoding.unwrap_or(settings.output.encoding);
            let add_bom = match (bom, no_bom) {
                (true, _) => true,
                (_, true) => false,
                _ => settings.output.add_bom,
            };
            let ctx = RunContext {
                selection: (!columns.is_empty()).then_some(columns),
                rules,
                policy: EncodingPolicy::new(encoding, add_bom),
            };
            let out_dir = out_dir.unwrap_or_else(|| settings.output.directory.clone());
            handle_export(&settings, &inputs, &ctx, &out_dir)
        }
    }
}

fn read_input(path: &Path) -> Result<(String, Vec<u8>)> {
    let name = path
        .file_name()
        .with_context(|| format!("not a file: {}", path.display()))?
        .to_string_lossy()
        .into_owned();
    let bytes = std::fs::read(path).with_context(|| format!("open {}", path.display()))?;
    Ok((name, bytes))
}

fn handle_columns(settings: &Settings, input: &Path) -> Result<()> {
    let (name, bytes) = read_input(input)?;
    let source = load_source(&name, &bytes, &settings.source)?;
    let resolver = settings.schema_resolver();
    let schema = resolver.schema();
    for (i, column) in source.table.columns().iter().enumerate() {
        println!("{}\t{}\t{}", i + 1, column, schema.type_of(column));
    }
    println!("rows: {}", source.row_count());
    Ok(())
}

fn handle_schema(settings: &Settings) -> Result<()> {
    let resolver = settings.schema_resolver();
    let resolution = resolver.resolve();
    if let SchemaResolution::Fallback(e) = resolution {
        eprintln!("warning: {e}; every column defaults to string");
    }
    println!("{}", serde_json::to_string_pretty(resolution.schema())?);
    Ok(())
}

fn handle_export(
    settings: &Settings,
    inputs: &[String],
    ctx: &RunContext,
    out_dir: &Path,
) -> Result<()> {
    let paths = expand_inputs(inputs)?;
    let pipeline = Pipeline::new(settings);

    let mut failed = 0usize;
    for path in &paths {
        match export_one(&pipeline, path, ctx, out_dir) {
            Ok(Some(written)) => println!("{}", written.display()),
            Ok(None) => info!(input = %path.display(), "nothing selected; skipped"),
            Err(e) => {
                error!(input = %path.display(), "{e:#}");
                failed += 1;
            }
        }
    }
    if failed > 0 {
        bail!("{failed} of {} input(s) failed", paths.len());
    }
    Ok(())
}

fn export_one(
    pipeline: &Pipeline,
    path: &Path,
    ctx: &RunContext,
    out_dir: &Path,
) -> Result<Option<PathBuf>> {
    let (name, bytes) = read_input(path)?;
    match pipeline.run(&name, &bytes, ctx)? {
        RunOutcome::Exported(artifact) => {
            let written = artifact.write_to(out_dir)?;
            info!(
                output = %written.display(),
                rows = artifact.data_rows,
                mime = %artifact.mime_type,
                "exported"
            );
            Ok(Some(written))
        }
        RunOutcome::NothingSelected => Ok(None),
    }
}
