//! Application entry point and dispatch.

use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use callgen_core::constants::exit_codes;
use callgen_core::sources::{lines_builder, next_line};
use callgen_core::{CancellationToken, LoggingObserver, NoOpObserver, RunObserver};

use crate::config::AppConfig;
use crate::errors::exit_code;
use crate::output::{Presenter, Status, Summary};

/// Run the application and return the process exit code.
pub fn run(config: &AppConfig) -> Result<i32> {
    // Handle shell completion
    if let Some(shell) = config.completion {
        let mut cmd = <AppConfig as clap::CommandFactory>::command();
        crate::completion::generate_completion(&mut cmd, shell, &mut io::stdout());
        return Ok(exit_codes::SUCCESS);
    }

    let path = config
        .path
        .as_deref()
        .context("an input path is required")?;

    let options = match config.run_options() {
        Ok(options) => options,
        Err(err) => {
            eprintln!("Error: {err}");
            return Ok(exit_codes::ERROR_CONFIG);
        }
    };

    let observer: Arc<dyn RunObserver> = if config.verbose {
        Arc::new(LoggingObserver::default())
    } else {
        Arc::new(NoOpObserver::new())
    };

    let generator = lines_builder(path)
        .options(options)
        .observer(observer)
        .step(next_line);
    let run = generator
        .try_start()
        .context("failed to start producer thread")?;

    ctrlc_handler(run.cancel_token())?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let presenter = Presenter::new(config.number, config.quiet, config.json);
    stream_lines(config, path, run, &presenter, &mut out)
}

fn stream_lines(
    config: &AppConfig,
    path: &Path,
    mut run: callgen_core::Run<String, io::Error>,
    presenter: &Presenter,
    out: &mut dyn Write,
) -> Result<i32> {
    let mut printed = 0u64;
    let mut limit_reached = false;
    for (line_no, line) in (1u64..).zip(run.by_ref()) {
        if let Some(pattern) = &config.grep {
            if !line.contains(pattern.as_str()) {
                continue;
            }
        }
        presenter.line(out, line_no, &line)?;
        printed += 1;
        if config.limit > 0 && printed >= config.limit {
            limit_reached = true;
            break;
        }
    }

    let run_id = run.id();
    let read = run.delivered();
    let outcome = if limit_reached {
        run.abort()
    } else {
        run.finish()
    };

    // The producer may or may not have seen the end of input before the
    // abort, so a run stopped at the limit reports LimitReached either way.
    let (status, error, code) = match &outcome {
        Ok(_) if limit_reached => (Status::LimitReached, None, exit_codes::SUCCESS),
        Ok(_) => (Status::Completed, None, exit_codes::SUCCESS),
        Err(err) if limit_reached && err.is_cancelled() => {
            (Status::LimitReached, None, exit_codes::SUCCESS)
        }
        Err(err) if err.is_cancelled() => (Status::Cancelled, Some(err), exit_code(err)),
        Err(err) => (Status::Failed, Some(err), exit_code(err)),
    };
    info!(run_id, lines_read = read, lines_printed = printed, ?status, "run ended");

    if config.wants_summary() {
        let summary = Summary::new(path, run_id, read, printed, status, error);
        presenter.summary(out, &summary)?;
    }
    out.flush()?;

    if let Some(err) = error {
        eprintln!("Error: {err}");
    }
    Ok(code)
}

fn ctrlc_handler(cancel: CancellationToken) -> Result<()> {
    ctrlc::set_handler(move || {
        cancel.cancel();
    })
    .context("failed to set Ctrl+C handler")
}
