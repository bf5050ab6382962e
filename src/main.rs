use clap::Parser;
use differ::areas::config::Config;
use differ::areas::mirror::DEFAULT_SUFFIX;
use differ::artifacts::diff::engine::CompareFlags;
use differ::commands::compare::{Compare, CompareOptions};
use differ::commands::report::{ColorChoice, ReportOptions, terminal_width};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const EXIT_DIFFERENCES: u8 = 1;
const EXIT_USAGE: u8 = 2;

#[derive(Parser)]
#[command(
    name = "differ",
    version = "0.1.0",
    about = "Compare a directory tree with its numbered mirror",
    long_about = "This command compares a directory tree with its mirror, found by renaming the \
    configured path component (default `data`) to `<component>.<NUMBER>`. \
    Document archives are inspected member by member, and cosmetic differences \
    can be synced from the primary tree onto the mirror.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
"
)]
struct Cli {
    #[arg(index = 1, help = "The primary tree (defaults to the current directory)")]
    path: Option<PathBuf>,
    #[arg(
        index = 2,
        default_value_t = DEFAULT_SUFFIX,
        value_parser = clap::value_parser!(u32).range(1..),
        help = "The mirror number"
    )]
    number: u32,
    #[arg(long, help = "Compare content hashes instead of sizes")]
    hash: bool,
    #[arg(long, help = "Report modification-time differences")]
    date: bool,
    #[arg(short, long, help = "List member-level differences of document archives")]
    verbose: bool,
    #[arg(long, help = "Sync cosmetic archive and permission differences from A to B")]
    sync: bool,
    #[arg(long, value_name = "NAME", help = "The path component naming the primary tree")]
    component: Option<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(EXIT_USAGE)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = Config::load();
    let color = ColorChoice::detect();
    colored::control::set_override(color.is_enabled());

    let path = match cli.path {
        Some(path) => path,
        None => std::env::current_dir()?,
    };

    let mut flags = CompareFlags::empty();
    flags.set(CompareFlags::HASH, cli.hash);
    flags.set(CompareFlags::DATE, cli.date);

    let options = CompareOptions {
        path,
        suffix: cli.number,
        component: cli.component,
        flags,
        sync: cli.sync,
        report: ReportOptions {
            verbose: cli.verbose,
            width: terminal_width(),
            color,
        },
    };

    let compare = Compare::new(options, &config)?;
    let outcome = compare.run(std::io::stdout().lock(), &mut std::io::stderr().lock())?;

    if outcome.has_differences() {
        Ok(ExitCode::from(EXIT_DIFFERENCES))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
