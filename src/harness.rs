//! Program entry point for a suite.
//!
//! [`Harness`] is what a `harness = false` test target (or any binary) calls from `main`: it builds the runtime,
//! installs logging, reads flags and environment, attaches the stock reporters, runs one suite and turns the
//! result into a process exit code.
//!
//! ```rust,no_run
//! use std::process::ExitCode;
//! use testit::{Harness, TestOptions};
//!
//! fn main() -> ExitCode {
//!     Harness::new("smoke").run(|suite| {
//!         suite.register_section("boots", || async { Ok(()) }, TestOptions::default())
//!     })
//! }
//! ```

use std::io;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{Parser, ValueEnum};

use crate::config::SuiteConfig;
use crate::errors::SuiteResult;
use crate::reporter::{ConsoleReporter, ExitReporter, JsonReporter, OutcomeSlot};
use crate::suite::Suite;
use crate::timeout::Timeout;

/// Output format for progress reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Indented human-readable progress
    #[default]
    Console,
    /// One JSON object per event
    Json,
}

/// Flags accepted by a suite binary
#[derive(Parser, Debug, Default)]
#[command(name = "testit")]
#[command(about = "Run a testit suite", long_about = None)]
pub struct HarnessArgs {
    /// Disable ANSI colors
    #[arg(long)]
    pub no_color: bool,

    /// Default timeout for items that do not set one (e.g. "5s", "Infinity")
    #[arg(long, value_name = "DURATION")]
    pub timeout: Option<Timeout>,

    /// Progress output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Console)]
    pub format: OutputFormat,

    /// Extra arguments forwarded by the test launcher (ignored)
    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub passthrough: Vec<String>,
}

impl HarnessArgs {
    /// Parse the process arguments.
    ///
    /// Help and version requests print and exit. Anything else clap rejects (flags meant for another test
    /// launcher) is logged and the defaults are used instead.
    pub fn from_env() -> Self {
        match Self::try_parse() {
            Ok(args) => args,
            Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unrecognised harness arguments");
                Self::default()
            }
        }
    }

    /// Layer these flags over `config`.
    pub fn apply(&self, mut config: SuiteConfig) -> SuiteConfig {
        if self.no_color {
            config.colors = false;
        }
        if let Some(timeout) = self.timeout {
            config.default_timeout = timeout;
        }
        config
    }
}

/// Runs one suite as a program.
pub struct Harness {
    config: SuiteConfig,
    args: Option<HarnessArgs>,
}

impl Harness {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(SuiteConfig::new().with_name(name))
    }

    pub fn with_config(config: SuiteConfig) -> Self {
        Self { config, args: None }
    }

    /// Use these flags instead of parsing the process arguments.
    pub fn with_args(mut self, args: HarnessArgs) -> Self {
        self.args = Some(args);
        self
    }

    /// Register the tree with `register`, run it, and report the outcome as an exit code.
    pub fn run<F>(self, register: F) -> ExitCode
    where
        F: FnOnce(&Suite) -> SuiteResult<()>,
    {
        init_logging();

        let args = self.args.unwrap_or_else(HarnessArgs::from_env);
        let config = args.apply(self.config.apply_env());

        let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(runtime) => runtime,
            Err(e) => {
                eprintln!("Error starting async runtime: {}", e);
                return ExitCode::FAILURE;
            }
        };

        let outcome = OutcomeSlot::new();
        let suite = Suite::with_config(config.clone());
        match args.format {
            OutputFormat::Console => {
                suite.add_reporter(ConsoleReporter::stdout(config.colors));
                suite.add_reporter(ExitReporter::stdout(config.name.clone(), outcome.clone()));
            }
            OutputFormat::Json => {
                suite.add_reporter(JsonReporter::stdout());
                suite.add_reporter(ExitReporter::new(config.name.clone(), io::stderr(), outcome.clone()));
            }
        }

        if let Err(e) = register(&suite) {
            eprintln!("{:?}", miette::Report::new(e));
            return ExitCode::FAILURE;
        }

        if let Err(e) = runtime.block_on(suite.run()) {
            if e.is_precondition() {
                eprintln!("{:?}", miette::Report::new(e));
            }
        }

        outcome.get().map_or(ExitCode::FAILURE, |o| o.exit_code())
    }
}

/// Install the tracing subscriber once, with an env-based filter defaulting to warnings.
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .try_init();
}
