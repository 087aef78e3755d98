//! querybench - compare PostgreSQL client strategies.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use querybench::{report, Args, QuerySpec, ReportFormat, Runner, Strategy};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    // Logs go to stderr; stdout carries only the report.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "querybench=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();

    if args.list_backends {
        let mut out = io::stdout().lock();
        for strategy in Strategy::ALL {
            writeln!(out, "{}\t{}", strategy.name(), strategy.label())?;
        }
        return Ok(ExitCode::SUCCESS);
    }

    let config = args.into_config();
    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "invalid configuration");
        return Ok(ExitCode::from(2));
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        iterations = config.iterations,
        backends = config.strategies.len(),
        schema = %config.schema,
        "starting benchmark"
    );

    let spec = QuerySpec::pg_tables(&config.schema);
    let connector = config.connector();
    let backends = config
        .strategies
        .iter()
        .map(|strategy| strategy.build(connector.clone()))
        .collect();

    let runner = Runner::new(&spec, config.iterations).with_timeout(config.per_backend_timeout);
    let results = runner.run_all(backends).await;

    let mut out = io::stdout().lock();
    match config.format {
        ReportFormat::Text => {
            report::write_text(&results, &mut out)?;
            report::write_failures(&results, &mut io::stderr().lock())?;
        }
        ReportFormat::Json => report::write_json(&results, &spec, config.iterations, &mut out)?,
    }
    out.flush()?;

    if !results.failures().is_empty() {
        tracing::warn!(
            completed = results.len(),
            failed = results.failures().len(),
            "some backends failed"
        );
    }

    if results.all_failed() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
