use clap::Parser;
use consultas_load::cli::Cli;
use consultas_load::report;
use consultas_load::RunEvent;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let json = cli.json;
    let config = cli.into_config()?;
    let mut events = consultas_load::run_streaming(config);
    while let Some(event) = events.recv().await {
        match event {
            // already logged by the reporter
            RunEvent::Progress(_) => {}
            RunEvent::Finished(result) => {
                if json {
                    println!("{}", report::render_json(&result)?);
                } else {
                    println!("{}", report::render_summary(&result));
                }
                return Ok(());
            }
            RunEvent::Failed(msg) => anyhow::bail!(msg),
        }
    }
    anyhow::bail!("load test ended without a result")
}
