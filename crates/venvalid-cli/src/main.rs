//! venvalid - check the environment against a specification document
//!
//! Commands:
//! - `check`: resolve every declared variable, fail on the first problem
//! - `explain`: describe what a spec document declares
//! - `version`: print version information

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use venvalid::resolve_env;
use venvalid_cli::logging::{init_logging, LogConfig, LogFormat, LogLevel};
use venvalid_cli::report::{
    render_error_human, render_error_summary, CheckReport, ErrorReport, ExplainReport,
};
use venvalid_cli::{load_spec, CliError, ExitCode, OutputFormat, SCHEMA_VERSION};

/// Validate and type-convert environment variables against a spec document
#[derive(Parser)]
#[command(name = "venvalid")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Silence all logging
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Log format on stderr (human or jsonl)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a spec document against the current environment
    Check(CheckArgs),

    /// Describe the variables a spec document declares
    Explain(ExplainArgs),

    /// Print version information
    Version,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Path to the JSON spec document
    #[arg(long, env = "VENVALID_SPEC")]
    spec: PathBuf,

    /// Include resolved values in the output. Error messages always quote
    /// the rejected raw value.
    #[arg(long)]
    show_values: bool,
}

#[derive(Args, Debug)]
struct ExplainArgs {
    /// Path to the JSON spec document
    #[arg(long, env = "VENVALID_SPEC")]
    spec: PathBuf,
}

impl GlobalOpts {
    fn use_color(&self) -> bool {
        !self.no_color && std::io::stderr().is_terminal()
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version are not failures
            let code = if err.use_stderr() {
                ExitCode::ArgsError
            } else {
                ExitCode::Clean
            };
            let _ = err.print();
            std::process::exit(code.as_i32());
        }
    };

    let log_config = LogConfig::from_env(
        LogLevel::from_verbosity(cli.global.verbose, cli.global.quiet),
        cli.global.log_format,
    )
    .with_ansi(cli.global.use_color());
    init_logging(&log_config);

    let exit_code = match &cli.command {
        Commands::Check(args) => run_check(&cli.global, args),
        Commands::Explain(args) => run_explain(&cli.global, args),
        Commands::Version => {
            print_version(&cli.global);
            ExitCode::Clean
        }
    };

    debug!(exit_code = %exit_code, "done");
    std::process::exit(exit_code.as_i32());
}

fn run_check(global: &GlobalOpts, args: &CheckArgs) -> ExitCode {
    let spec_label = args.spec.display().to_string();
    let result = load_spec(&args.spec)
        .and_then(|spec| resolve_env(&spec).map_err(CliError::from));

    match result {
        Ok(config) => {
            info!(spec = %spec_label, variables = config.len(), "environment satisfies spec");
            let report = CheckReport::new(&spec_label, &config, args.show_values);
            match global.format {
                OutputFormat::Json => print_json(&report),
                OutputFormat::Human => print!("{}", report.render_human()),
                OutputFormat::Summary => println!("{}", report.render_summary()),
                OutputFormat::Exitcode => {}
            }
            ExitCode::Clean
        }
        Err(err) => output_error(global, "check", &err),
    }
}

fn run_explain(global: &GlobalOpts, args: &ExplainArgs) -> ExitCode {
    let spec_label = args.spec.display().to_string();
    match load_spec(&args.spec) {
        Ok(spec) => {
            let report = ExplainReport::new(&spec_label, &spec);
            match global.format {
                OutputFormat::Json => print_json(&report),
                OutputFormat::Human => print!("{}", report.render_human()),
                OutputFormat::Summary => println!("{}", report.render_summary()),
                OutputFormat::Exitcode => {}
            }
            ExitCode::Clean
        }
        Err(err) => output_error(global, "explain", &err),
    }
}

fn output_error(global: &GlobalOpts, command: &'static str, err: &CliError) -> ExitCode {
    let exit_code = err.exit_code();
    info!(command, exit_code = %exit_code, "command failed");

    match global.format {
        OutputFormat::Json => match serde_json::to_string_pretty(&ErrorReport::new(command, err)) {
            Ok(text) => eprintln!("{}", text),
            Err(_) => eprintln!("{}", err),
        },
        OutputFormat::Human => eprintln!("{}", render_error_human(err, global.use_color())),
        OutputFormat::Summary => eprintln!("{}", render_error_summary(command, err)),
        OutputFormat::Exitcode => {}
    }
    exit_code
}

fn print_json<T: serde::Serialize>(payload: &T) {
    match serde_json::to_string_pretty(payload) {
        Ok(text) => println!("{}", text),
        Err(err) => eprintln!("failed to serialize output: {}", err),
    }
}

fn print_version(global: &GlobalOpts) {
    let version_info = serde_json::json!({
        "schema_version": SCHEMA_VERSION,
        "venvalid_version": env!("CARGO_PKG_VERSION"),
        "rust_version": env!("CARGO_PKG_RUST_VERSION"),
    });

    match global.format {
        OutputFormat::Json => print_json(&version_info),
        OutputFormat::Exitcode => {}
        _ => {
            println!("venvalid {}", env!("CARGO_PKG_VERSION"));
            println!("schema version: {}", SCHEMA_VERSION);
        }
    }
}
