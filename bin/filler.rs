use intent_filler::{config_from_env, env_var_info};
use tracing::debug;

fn should_print_help() -> bool {
    std::env::args().any(|arg| {
        let lowercase_arg = arg.to_ascii_lowercase();
        lowercase_arg == "-h" || lowercase_arg == "--help"
    })
}

fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    let env_vars = env_var_info();
    println!(
        r#"intent-filler v{version}

Run with no args. The process will run until it receives a SIGTERM or SIGINT
signal. The order pipeline, fill engine, and cancellation state machine are
assembled from the chain-specific collaborators an operator supplies
(ChainRegistry, BridgeChain, StatusStreamProvider, PersistentStore); this
binary only wires up the process-level ambient stack.

Configuration is via the following environment variables:
{env_vars}
"#
    )
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> eyre::Result<()> {
    if should_print_help() {
        print_help();
        return Ok(());
    }

    intent_filler::telemetry::init()?;
    intent_filler::metrics::install_recorder()?;

    let config = config_from_env()?;
    debug!(max_concurrent_orders = config.filler_config().max_concurrent_orders, "starting intent-filler");

    let cancellation_token = intent_filler::handle_signals()?;

    intent_filler::serve_healthcheck(config.healthcheck_port(), cancellation_token).await
}
