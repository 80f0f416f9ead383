use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;
use vocab_format::{LoadMode, TabularColumns};
use vocab_types::MarkerSet;

use lummi_vocab::{
    CleanOp, InputSpec, NormalizeOptions, OrphanScope, ReadSettings, ReportFormat, SourceFormat,
    TokenizeMethod, render, run_clean, run_fix, run_merge,
};

const DEFAULT_MARKERS: &str = "extended";
const DEFAULT_SOURCE_COLUMN: &str = "english";
const DEFAULT_TARGET_COLUMN: &str = "lummi";
const DEFAULT_LOAD_MODE: &str = "owned";

#[derive(Parser)]
#[command(name = "lummi-vocab")]
#[command(about = "Merge, deduplicate, and repair English-Lummi vocabulary files")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Context markers: `legacy` (_), `extended` (_ ( "), or literal characters.
    #[arg(long, global = true, env = "LUMMI_MARKERS", default_value = DEFAULT_MARKERS)]
    markers: MarkerSet,
    /// Source-term column name in tabular inputs.
    #[arg(long, global = true, env = "LUMMI_SOURCE_COLUMN", default_value = DEFAULT_SOURCE_COLUMN)]
    source_column: String,
    /// Target-term column name in tabular inputs.
    #[arg(long, global = true, env = "LUMMI_TARGET_COLUMN", default_value = DEFAULT_TARGET_COLUMN)]
    target_column: String,
    /// `mmap` or `owned`.
    #[arg(long, global = true, env = "LUMMI_LOAD_MODE", default_value = DEFAULT_LOAD_MODE, value_parser = parse_load_mode)]
    load_mode: LoadMode,
    #[arg(long, global = true, env = "LUMMI_REPORT", value_enum, default_value_t = ReportFormat::Text)]
    report: ReportFormat,
}

impl GlobalArgs {
    fn settings(&self) -> ReadSettings {
        ReadSettings {
            markers: self.markers.clone(),
            columns: TabularColumns {
                source: self.source_column.clone(),
                target: self.target_column.clone(),
            },
            load_mode: self.load_mode,
        }
    }
}

#[derive(Args)]
struct PairArgs {
    /// Vocabulary file whose header and entries come first.
    #[arg(long)]
    primary: PathBuf,
    #[arg(long)]
    secondary: PathBuf,
    #[arg(long, short)]
    output: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge any number of inputs given as `[vocab:|quizlet:|pairs:]<path>`.
    Merge {
        #[arg(long, short)]
        output: PathBuf,
        #[arg(required = true)]
        inputs: Vec<InputSpec>,
    },
    /// Merge a flashcard export into a vocabulary file.
    Quizlet(PairArgs),
    /// Merge a tabular pairs CSV into a vocabulary file.
    Pairs(PairArgs),
    /// Reattach orphaned context lines using a reference vocabulary file.
    Fix {
        #[command(flatten)]
        files: PairArgs,
        #[arg(long, value_enum, default_value_t = OrphanScope::Leading)]
        orphans: OrphanScope,
    },
    /// Trim, lowercase, NFC-compose, and collapse whitespace in entry terms.
    Normalize {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, short)]
        output: PathBuf,
        #[arg(long, default_value_t = false)]
        keep_case: bool,
        #[arg(long, default_value_t = false)]
        no_nfc: bool,
    },
    /// Re-space entry terms by whitespace or punctuation tokens.
    Tokenize {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, short)]
        output: PathBuf,
        #[arg(long, value_enum, default_value_t = TokenizeMethod::Whitespace)]
        method: TokenizeMethod,
    },
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let settings = cli.global.settings();
    info!(
        "markers: {}, load mode: {:?}, columns: {}/{}",
        settings.markers, settings.load_mode, settings.columns.source, settings.columns.target
    );

    let start = Instant::now();
    let report = match cli.command {
        Commands::Merge { output, inputs } => run_merge(&inputs, &output, &settings)?,
        Commands::Quizlet(files) => run_merge(
            &[
                InputSpec::new(SourceFormat::Vocabulary, files.primary),
                InputSpec::new(SourceFormat::Alternating, files.secondary),
            ],
            &files.output,
            &settings,
        )?,
        Commands::Pairs(files) => run_merge(
            &[
                InputSpec::new(SourceFormat::Vocabulary, files.primary),
                InputSpec::new(SourceFormat::Tabular, files.secondary),
            ],
            &files.output,
            &settings,
        )?,
        Commands::Fix { files, orphans } => run_fix(
            &files.primary,
            &files.secondary,
            &files.output,
            orphans,
            &settings,
        )?,
        Commands::Normalize {
            input,
            output,
            keep_case,
            no_nfc,
        } => run_clean(
            &input,
            &output,
            CleanOp::Normalize(NormalizeOptions {
                lowercase: !keep_case,
                nfc: !no_nfc,
            }),
            &settings,
        )?,
        Commands::Tokenize {
            input,
            output,
            method,
        } => run_clean(&input, &output, CleanOp::Tokenize(method), &settings)?,
    };
    info!("finished in {} ms", start.elapsed().as_millis());

    println!("{}", render(&report, cli.global.report)?);
    Ok(())
}

fn parse_load_mode(raw: &str) -> Result<LoadMode, String> {
    match raw.to_ascii_lowercase().as_str() {
        "mmap" => Ok(LoadMode::Mmap),
        "owned" => Ok(LoadMode::Owned),
        other => Err(format!("unknown load mode {other:?} (expected mmap or owned)")),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level)
        .init();
}
