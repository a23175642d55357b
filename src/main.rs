use clap::Parser;
use owo_colors::OwoColorize;
use std::path::Path;
use std::process::ExitCode;

use aurora::cli::{generate_completions, Args, Commands};
use aurora::config::AppConfig;
use aurora::diagnostic::render_diagnostics;
use aurora::interpreter::{parse_source, Interpreter};
use aurora::repl::Repl;

fn main() -> ExitCode {
    let args = Args::parse();

    if let Some(Commands::Complete { shell }) = args.command {
        generate_completions(shell);
        return ExitCode::SUCCESS;
    }

    let config = AppConfig::from_args(&args);

    match &args.script {
        Some(script) => run_script(script, &config),
        None => match Repl::new(config.color_enabled) {
            Ok(mut repl) => match repl.run() {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    error_message(&config, &format!("repl failed: {}", err));
                    ExitCode::FAILURE
                }
            },
            Err(err) => {
                error_message(&config, &format!("cannot start repl: {}", err));
                ExitCode::FAILURE
            }
        },
    }
}

fn run_script(script: &Path, config: &AppConfig) -> ExitCode {
    let source = match std::fs::read_to_string(script) {
        Ok(source) => source,
        Err(err) => {
            error_message(
                config,
                &format!("cannot read {}: {}", script.display(), err),
            );
            return ExitCode::FAILURE;
        }
    };

    let file_name = script.display().to_string();
    verbose_log(config, &format!("parsing {}", file_name));

    let program = match parse_source(&source, &file_name) {
        Ok(program) => program,
        Err(err) => {
            eprint!(
                "{}",
                render_diagnostics(
                    &source,
                    &file_name,
                    &[err.to_diagnostic()],
                    config.color_enabled
                )
            );
            return ExitCode::FAILURE;
        }
    };

    verbose_log(config, "evaluating");

    let mut interpreter = Interpreter::new();
    match interpreter.run_program(&program) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error_message(config, &err.message());
            for frame in err.trace.iter().take(5) {
                eprintln!("  in {}", frame);
            }
            ExitCode::FAILURE
        }
    }
}

fn verbose_log(config: &AppConfig, message: &str) {
    if config.verbose {
        eprintln!("[aurora:debug] {}", message);
    }
}

fn error_message(config: &AppConfig, message: &str) {
    if config.color_enabled {
        eprintln!("{} {}", "error:".red().bold(), message);
    } else {
        eprintln!("error: {}", message);
    }
}
