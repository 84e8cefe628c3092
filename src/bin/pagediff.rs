use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pagediff", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare two page images and write diff, threshold and marks artifacts.
    Compare(CompareArgs),
    /// Print the default settings as JSON.
    Defaults,
}

#[derive(Parser, Debug)]
struct CompareArgs {
    /// First page image.
    #[arg(long)]
    a: PathBuf,

    /// Second page image.
    #[arg(long)]
    b: PathBuf,

    /// Session folder receiving `diff/`, `thres/` and `marks/`.
    #[arg(long)]
    session: PathBuf,

    /// Settings JSON; missing fields take their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Comparison type recorded in the report (overrides the settings file).
    #[arg(long, value_enum)]
    kind: Option<KindChoice>,

    /// Append the outcome to `<session>/_comparison.report`.
    #[arg(long)]
    report: bool,

    /// Write log events to this file instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindChoice {
    Manual,
    Auto,
}

impl From<KindChoice> for pagediff::CompareKind {
    fn from(k: KindChoice) -> Self {
        match k {
            KindChoice::Manual => Self::Manual,
            KindChoice::Auto => Self::Auto,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Compare(args) => cmd_compare(args),
        Command::Defaults => cmd_defaults(),
    }
}

fn make_log_sink(log_file: Option<&Path>) -> anyhow::Result<tracing::Dispatch> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let dispatch = match log_file {
        Some(path) => {
            pagediff::ensure_parent_dir(path)?;
            let f = File::options()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("open log file '{}'", path.display()))?;
            tracing::Dispatch::new(
                builder
                    .with_ansi(false)
                    .with_writer(Mutex::new(f))
                    .finish(),
            )
        }
        None => tracing::Dispatch::new(builder.with_writer(std::io::stderr).finish()),
    };
    Ok(dispatch)
}

fn cmd_compare(args: CompareArgs) -> anyhow::Result<()> {
    let mut settings = match &args.config {
        Some(path) => pagediff::CompareSettings::from_json_path(path)?,
        None => pagediff::CompareSettings::default(),
    };
    if let Some(kind) = args.kind {
        settings.kind = kind.into();
    }

    let sink = make_log_sink(args.log_file.as_deref())?;
    let comparator =
        pagediff::Comparator::new(settings, &args.session)?.with_log_sink(sink.clone());
    let outcome = comparator.compare(&args.a, &args.b)?;

    match (&outcome.incompatibility, outcome.score()) {
        (Some(reason), _) => println!("{}: INVALID ({reason})", outcome.name),
        (None, Some(score)) => println!(
            "{}: ssim {score:.5}, {} region(s)",
            outcome.name,
            outcome.regions().len()
        ),
        (None, None) => {}
    }

    if args.report {
        let report = pagediff::ComparisonReport::in_dir(&args.session);
        tracing::dispatcher::with_default(&sink, || report.append(&outcome))?;
        eprintln!("updated {}", report.path().display());
    }

    if let Some(err) = outcome.persist_error {
        return Err(err).context("comparison computed but artifacts were not written");
    }
    Ok(())
}

fn cmd_defaults() -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&pagediff::CompareSettings::default())
        .context("serialize default settings")?;
    println!("{json}");
    Ok(())
}
