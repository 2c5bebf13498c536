// Hello workflow CLI
//
// Design Decision: Use clap derive for ergonomic argument parsing.
// Design Decision: Support text/json/yaml output formats for scripting.
// Design Decision: Logs go to stderr at warn by default so stdout stays parseable.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use hello_cli::{execute, Cli, CliError, HttpEngine};
use hello_core::telemetry::{init_telemetry, TelemetryConfig};
use hello_core::{load_dotenv, EngineConfig};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version are not failures
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    load_dotenv();
    let _telemetry_guard = init_telemetry(
        TelemetryConfig::from_env()
            .with_default_service_name("hello-client")
            .with_default_filter("warn")
            .with_stderr(),
    );

    match run(cli).await {
        Ok(rendered) => {
            print!("{}", rendered);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<String, CliError> {
    let config = EngineConfig::from_env()?;
    let engine = Arc::new(HttpEngine::new(&config)?);
    let outcome = execute(cli.command, engine, &config).await?;
    outcome.render(cli.output)
}
