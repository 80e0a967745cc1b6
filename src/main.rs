//! cypher-mend - Runs Cypher statements and repairs failures with an LLM.

mod cli;

use cli::Cli;
use cypher_mend::config::Config;
use cypher_mend::error::Result;
use cypher_mend::graph::{self, MockExecutor, QueryExecutor};
use cypher_mend::llm;
use cypher_mend::logging;
use cypher_mend::output::{render_report, ConsoleReporter, OutputFormat};
use cypher_mend::repair::{LlmRepairOracle, RunReport, StatementRepairRunner};
use cypher_mend::statements;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Exit status when at least one statement gave up.
const EXIT_GAVE_UP: i32 = 2;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse_args();

    let logs_to_file = cli.log_file.is_some();
    match &cli.log_file {
        Some(path) => {
            if let Err(e) = logging::init_file_logging(path) {
                eprintln!("{}: {}", e.category(), e);
                std::process::exit(1);
            }
        }
        None => logging::init_stderr_logging(),
    }

    let code = match run(&cli).await {
        Ok(report) if report.all_executed() => 0,
        Ok(_) => EXIT_GAVE_UP,
        Err(e) => {
            // Statements that ran before the failure stay applied, so say which.
            if let Some(report) = e.partial_report() {
                match render_report(report, cli.output) {
                    Ok(rendered) => println!("{rendered}"),
                    Err(render_err) => warn!("Could not render partial report: {render_err}"),
                }
            }
            error!("{}: {}", e.category(), e);
            if logs_to_file {
                eprintln!("{}: {}", e.category(), e);
            }
            1
        }
    };

    std::process::exit(code);
}

async fn run(cli: &Cli) -> Result<RunReport> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;

    // Precedence: CLI arguments, then config file, then environment.
    cli.apply_overrides(&mut config)?;
    config.graph.apply_env_defaults()?;

    if !config.repair.covers_llm_retries(&config.llm) {
        warn!(
            "repair_timeout_secs = {} may cut off LLM retries (requests time out after {}s)",
            config.repair.repair_timeout_secs, config.llm.timeout_secs
        );
    }

    let statements = statements::load_all(&cli.statement_sources()?)?;
    info!("Loaded {} statement(s)", statements.len());

    let executor: Box<dyn QueryExecutor> = if cli.mock_db {
        info!("Using mock executor");
        Box::new(MockExecutor::new())
    } else {
        info!("Connecting to {}", config.graph.display_string());
        graph::connect(&config.graph).await?
    };

    let oracle = LlmRepairOracle::new(llm::create_client(&config.llm, None)?);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling run");
            on_interrupt.cancel();
        }
    });

    let reporter = ConsoleReporter::stdout();
    let mut runner = StatementRepairRunner::new(
        executor.as_ref(),
        &oracle,
        config.repair.to_runner_config(),
    );
    if cli.output == OutputFormat::Text {
        runner = runner.with_observer(&reporter);
    }

    let report = runner.run_with_cancel(&statements, &cancel).await?;
    println!("{}", render_report(&report, cli.output)?);

    Ok(report)
}
