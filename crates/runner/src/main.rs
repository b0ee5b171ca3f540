use hermes_clock::shutdown_channel;
use hermes_runner::{RunnerConfig, TradingSimulation};

fn print_help() {
    eprintln!(
        r#"Hermes - automated paper-trading simulator

USAGE:
    hermes [OPTIONS]

OPTIONS:
    --config <PATH>     Load configuration from JSON file
    --dev               Dev mode: short ticks, no trading-hours check
    --debug             Debug logging
    --help              Print this help message

ENVIRONMENT VARIABLES:
    RUST_LOG            Log level filter (overrides --debug)
    OPENROUTER_KEY      API key for model agents (see model.api_key_env)

EXAMPLES:
    # Run a random agent with defaults
    hermes

    # Run with config file in dev mode
    hermes --config hermes.json --dev
"#
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<String> = None;
    let mut dev = false;
    let mut debug = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--config" | "-c" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
                config_path = Some(args[i].clone());
            }
            "--dev" => dev = true,
            "--debug" => debug = true,
            arg => {
                eprintln!("Unknown argument: {}", arg);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let mut config = match &config_path {
        Some(path) => RunnerConfig::from_file(path)?,
        None => RunnerConfig::default(),
    };
    config.dev_mode |= dev;

    let level = if debug || config.dev_mode { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match &config_path {
        Some(path) => log::info!("Loaded configuration from: {}", path),
        None => log::info!("Using default configuration"),
    }
    if config.dev_mode {
        log::debug!("Dev mode enabled");
    }

    let simulation = TradingSimulation::from_config(config).await?;
    let (handle, shutdown) = shutdown_channel();
    let run = tokio::spawn(simulation.run(shutdown));

    tokio::signal::ctrl_c().await?;
    log::warn!("Shutting down program");
    handle.trigger();

    let results = run.await??;
    log::info!(
        "Broker: submitted={} placed={} failed={} persist_failures={}",
        results.broker.submitted,
        results.broker.placed,
        results.broker.failed,
        results.broker.persist_failures
    );
    for agent in &results.agents {
        log::info!(
            "[{}] cash={} portfolio={} holdings={} trades={} failed={} holds={}",
            agent.name,
            agent.account.cash,
            agent.account.portfolio_value,
            agent.holding_count(),
            agent.stats.total_trades,
            agent.stats.failed_trades,
            agent.stats.holds
        );
    }

    Ok(())
}
