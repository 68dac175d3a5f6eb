use std::process::ExitCode;

use rdfsolve::config::Config;
use rdfsolve::model::read_sources_csv;
use rdfsolve::orchestrator::{exit_code, BatchOrchestrator, RowStatus};

/// Minimal positional CLI: `rdfsolve <sources.csv> [output_dir] [format]`.
/// Argument parsing is deliberately bare-bones — the batch orchestrator is
/// the thing under test here, not CLI ergonomics.
#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    dotenvy::dotenv().ok();

    let mut config = Config::from_env();
    let args: Vec<String> = std::env::args().skip(1).collect();

    let Some(sources_path) = args.first() else {
        eprintln!("usage: rdfsolve <sources.csv> [output_dir] [jsonld|void|all]");
        return ExitCode::from(2);
    };
    if let Some(dir) = args.get(1) {
        config.output_dir = dir.clone();
    }
    if let Some(fmt) = args.get(2) {
        match fmt.parse() {
            Ok(parsed) => config.format = parsed,
            Err(e) => {
                eprintln!("invalid format: {e}");
                return ExitCode::from(2);
            }
        }
    }

    let sources = match read_sources_csv(sources_path) {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("failed to read sources CSV: {e}");
            return ExitCode::from(2);
        }
    };

    let output_dir = config.output_dir.clone();
    let orchestrator = BatchOrchestrator::new(config);

    let result = orchestrator
        .run(&sources, &output_dir, |name, idx, total, status| match status {
            RowStatus::Succeeded => tracing::info!("[{}/{}] {name}: mined", idx + 1, total),
            RowStatus::Skipped => tracing::info!("[{}/{}] {name}: skipped (no endpoint)", idx + 1, total),
            RowStatus::Failed(err) => tracing::warn!("[{}/{}] {name}: failed: {err}", idx + 1, total),
        })
        .await;

    match result {
        Ok(result) => {
            tracing::info!(
                "done: {} succeeded, {} failed, {} skipped",
                result.succeeded.len(),
                result.failed.len(),
                result.skipped.len()
            );
            ExitCode::from(exit_code(&result) as u8)
        }
        Err(e) => {
            tracing::error!("batch run failed: {e}");
            ExitCode::from(1)
        }
    }
}
