//! Wordlist Minlen - streaming minimum-length wordlist filter
//!
//! Main entry point for the command-line application.

use anyhow::Context;
use clap::Parser;
use std::process;
use std::sync::atomic::Ordering;

use wordlist_minlen::cli::Args;
use wordlist_minlen::error::FilterErrorKind;
use wordlist_minlen::processor::{EngineConfig, FilterEngine, FilterResult};
use wordlist_minlen::progress::{
    print_banner, print_error, print_info, print_settings, print_success, print_summary,
    LogProgress, NoProgress, ProgressSink, SpinnerProgress,
};
use wordlist_minlen::prompt::Prompter;

/// Input missing or processing failed
const EXIT_FAILURE: i32 = 2;

/// Conventional status for termination by SIGINT
const EXIT_INTERRUPTED: i32 = 130;

fn main() {
    // Parse command-line arguments
    let args = Args::parse();

    // Set up logging; RUST_LOG still wins when set
    let level = if args.verbose {
        "debug"
    } else if args.quiet {
        "warn"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(args) {
        Ok(code) => process::exit(code),
        Err(e) => {
            print_error(&format!("{}", e));

            // Print chain of errors
            for cause in e.chain().skip(1) {
                print_error(&format!("  Caused by: {}", cause));
            }

            process::exit(1);
        }
    }
}

fn run(args: Args) -> anyhow::Result<i32> {
    if !args.quiet {
        print_banner();
    }

    let request = if args.needs_prompt() {
        Prompter::stdio().request(&args)?
    } else {
        args.to_request()?
    };
    let config = EngineConfig::from_args(&args)?;

    if !args.quiet {
        print_settings(&request);
        print_info("Start processing... (press Ctrl+C to stop)");
    }

    let progress: Box<dyn ProgressSink> = if args.quiet {
        Box::new(NoProgress)
    } else if args.verbose {
        Box::new(LogProgress)
    } else {
        Box::new(SpinnerProgress::new())
    };
    let mut engine = FilterEngine::new(config).with_progress(progress);

    // Installed only now so Ctrl+C during the prompts still exits immediately
    let interrupt = engine.interrupt_handle();
    ctrlc::set_handler(move || interrupt.store(true, Ordering::Relaxed))
        .context("Failed to install Ctrl+C handler")?;

    let result = engine.run(&request);

    if !args.quiet || !result.is_success() {
        print_summary(&request, &result);
    }
    if !args.quiet && result.is_success() {
        print_success(&format!("Output written to: {}", request.output.display()));
    }

    Ok(exit_code(&result))
}

fn exit_code(result: &FilterResult) -> i32 {
    match result.error_kind() {
        None => 0,
        Some(FilterErrorKind::Interrupted) => {
            print_error("Interrupted by user.");
            EXIT_INTERRUPTED
        }
        Some(_) => {
            print_error("Filtering failed.");
            EXIT_FAILURE
        }
    }
}
