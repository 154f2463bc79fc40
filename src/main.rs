mod cli;

use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use bex_lib::{BexError, Config, ExtractRequest, ExtractSource, ExtractionResult, ThemeEngine};
use cli::Commands;

#[tokio::main]
async fn main() -> ExitCode {
    run().await
}

async fn run() -> ExitCode {
    let args = cli::parse();
    init_tracing(args.verbose);

    let mut config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => return report_error(&err),
    };

    match args.command {
        Commands::Website {
            url,
            viewport,
            nav_timeout,
            network_idle_timeout,
            process_timeout,
            output,
        } => {
            if let Some(viewport) = viewport {
                config.viewport = viewport;
            }
            if let Some(secs) = nav_timeout {
                config.timeouts.navigation = Duration::from_secs(secs);
            }
            if let Some(secs) = network_idle_timeout {
                config.timeouts.network_idle = Duration::from_secs(secs);
            }
            if let Some(secs) = process_timeout {
                config.timeouts.process = Duration::from_secs(secs);
            }

            let engine = ThemeEngine::new(config);
            let request = ExtractRequest {
                source: ExtractSource::Website,
                data: url,
            };
            finish(engine.extract(&request).await, output.as_deref())
        }
        Commands::Image {
            input,
            base64,
            output,
        } => {
            let source = if base64 {
                ExtractSource::Base64
            } else if input.starts_with("http://") || input.starts_with("https://") {
                ExtractSource::Url
            } else {
                ExtractSource::File
            };

            let engine = ThemeEngine::new(config);
            let request = ExtractRequest {
                source,
                data: input,
            };
            finish(engine.extract(&request).await, output.as_deref())
        }
    }
}

fn finish(result: bex_lib::Result<ExtractionResult>, output: Option<&Path>) -> ExitCode {
    match result.and_then(|r| write_result(&r, output)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report_error(&err),
    }
}

fn write_result(result: &ExtractionResult, output: Option<&Path>) -> bex_lib::Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    match output {
        Some(path) => std::fs::write(path, json.as_bytes())?,
        None => println!("{json}"),
    }
    Ok(())
}

/// Client-caused failures exit 2, everything else exits 1, mirroring the
/// 4xx/5xx split an embedding API layer would apply.
fn report_error(err: &BexError) -> ExitCode {
    let payload = err.to_payload();
    match serde_json::to_string(&payload) {
        Ok(json) => eprintln!("{json}"),
        Err(_) => eprintln!("{err}"),
    }
    if err.is_client_error() {
        ExitCode::from(2)
    } else {
        ExitCode::FAILURE
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "bex=debug,bex_lib=debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
