//! Namely command line
//!
//! Parses options into a rule configuration and feeds the file list to the
//! renamer.

use anyhow::Result;
use clap::Parser;
use namely::{
    BuildSummary, CaseTransform, Config, Normalizer, Outcome, RenameError, Renamer, RuleConfig,
};
use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const EXAMPLES: &str = r#"Examples:
  namely --dry-run --start 7 --width 3 --increment 2 --regex "IMG(\d\d)(\d+).*" "foo-\2-\#.jpg" /var/photos/*
  namely --dry-run --lower /var/photos/*
  namely --dry-run --width 3 --lower --normalize --regex "" "\@-\#.jpg" "Sailing 5:12/"

In a replacement, \# is the counter and \@ is the file's parent directory name."#;

#[derive(Parser, Debug)]
#[command(name = "namely")]
#[command(author, version, about = "Yet another batch file renamer", after_help = EXAMPLES)]
struct Cli {
    /// Replace the file name extension with the given value
    #[arg(short, long, value_name = "EXT")]
    ext: Option<String>,

    /// Capitalize the file name
    #[arg(short = 'C', long)]
    capitalize: bool,

    /// Uppercase the file name
    #[arg(short = 'U', long)]
    upper: bool,

    /// Lowercase the file name
    #[arg(short, long)]
    lower: bool,

    /// Replace runs of non-alphanumeric characters with dashes
    #[arg(short = 'z', long)]
    normalize: bool,

    /// Treat every argument as a directory and name its files after it,
    /// normalized and lowercased, with an auto-incrementing counter
    #[arg(short = 'x', long)]
    special: bool,

    /// Show the resulting name changes without renaming anything
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Regex replacement: the first argument is the pattern, the second the
    /// replacement, which may contain \# (counter) and \@ (parent directory)
    #[arg(short, long)]
    regex: bool,

    /// Starting counter value [default: 1]
    #[arg(short, long, allow_negative_numbers = true)]
    start: Option<i64>,

    /// Amount by which to increment the counter [default: 1]
    #[arg(short, long, allow_negative_numbers = true)]
    increment: Option<i64>,

    /// Zero-pad width for the counter, 0 to use the argument count [default: 2]
    #[arg(short, long)]
    width: Option<usize>,

    /// Path to config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// [PATTERN REPLACEMENT] FILE...
    #[arg(value_name = "ARGS")]
    args: Vec<OsString>,
}

impl Cli {
    fn case_transform(&self) -> Option<CaseTransform> {
        if self.upper {
            Some(CaseTransform::Upper)
        } else if self.lower {
            Some(CaseTransform::Lower)
        } else if self.capitalize {
            Some(CaseTransform::Capitalize)
        } else {
            None
        }
    }

    /// Turn the options into a rule and the list of paths to process
    fn into_rule(self, config: &Config) -> namely::Result<(RuleConfig, Vec<PathBuf>)> {
        let mut rule = RuleConfig::new().with_counter(
            self.start.unwrap_or(config.counter.start),
            self.increment.unwrap_or(config.counter.increment),
            self.width.unwrap_or(config.counter.width),
        );

        if let Some(case) = self.case_transform() {
            rule = rule.with_case(case);
        }
        if let Some(ext) = &self.ext {
            rule = rule.with_extension(ext);
        }
        if self.normalize {
            rule = rule.with_normalizer(Normalizer::Default);
        }
        rule = rule.with_special(self.special);

        if self.regex && self.args.len() < 3 {
            return Err(RenameError::Usage(
                "Need at least 3 arguments for regex, replacement, and files".to_string(),
            ));
        }
        if self.args.is_empty() {
            return Err(RenameError::Usage(
                "Need at least 1 file or directory argument".to_string(),
            ));
        }

        let mut args = self.args.into_iter();
        if self.regex {
            let pattern = utf8_arg(args.next())?;
            let replacement = utf8_arg(args.next())?;
            rule = rule.with_regex(&pattern, &replacement)?;
        }

        Ok((rule, args.map(PathBuf::from).collect()))
    }
}

fn utf8_arg(arg: Option<OsString>) -> namely::Result<String> {
    arg.unwrap_or_default()
        .into_string()
        .map_err(|raw| RenameError::Usage(format!("Argument is not valid UTF-8: {:?}", raw)))
}

fn init_logging(verbose: bool, configured: &str) {
    let log_level = if verbose { "debug" } else { configured };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("NAMELY_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())
        .map_err(|e| RenameError::Config(format!("{:#}", e)))?;
    init_logging(cli.verbose, &config.general.log_level);

    let dry_run = cli.dry_run;
    let (rule, files) = cli.into_rule(&config)?;
    let mut renamer = Renamer::new(rule)?;

    if dry_run {
        info!("** DRY RUN ** Files are not renamed!");
    }
    let summary = process(&mut renamer, files, dry_run, &mut std::io::stdout().lock())?;
    info!("Renamed {} of {}", summary.renamed, summary.total);

    Ok(())
}

/// Print the pairs (dry run) or commit them, then report the counts
fn process(
    renamer: &mut Renamer,
    files: Vec<PathBuf>,
    dry_run: bool,
    out: &mut impl Write,
) -> Result<BuildSummary> {
    let mut build = renamer.build(files);

    if dry_run {
        for outcome in build.by_ref() {
            if let Outcome::Renamed(pair) = outcome? {
                writeln!(out, "{}", pair)?;
            }
        }
    } else {
        Renamer::rename(build.pairs())?;
    }

    Ok(build.summary())
}

/// Exit code for a failed run: 1 for configuration mistakes, 2 otherwise
fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<RenameError>() {
        Some(e) if e.is_usage() => 1,
        _ => 2,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = exit_code(&e);
            if code == 1 {
                eprintln!("Error: {:#}", e);
            } else {
                eprintln!("Unexpected Error: {:#}", e);
            }
            ExitCode::from(code)
        }
    }
}
