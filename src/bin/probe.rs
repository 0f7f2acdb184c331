//! linkwire-probe: connect to a peer, log what it says, reconnect on loss
//!
//! ```text
//! linkwire-probe 127.0.0.1:4000 --protocol 1:1 --protocol 2:1
//! ```
//!
//! Settings come from `LINKWIRE_CONFIG_PATH` (default `config/linkwire.yaml`)
//! plus `LINKWIRE_*` overrides; a `.env` file is honoured.

use anyhow::Result;
use linkwire::codec::JsonCodec;
use linkwire::{
    ClientConnection, ConnectionEvent, DisconnectReason, ExponentialBackoff, MessageTypes,
    RetryPolicy,
};
use linkwire_tools::bin_common::{
    init_logging, load_config_from_env, load_settings, parse_args, parse_probe_args, print_banner,
    print_shutdown, ConfigType, Shutdown,
};
use std::time::Duration;
use tracing::{debug, error, info, warn};

const NAME: &str = "linkwire-probe";
const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_logging("info");

    let args = parse_probe_args(&parse_args())?;
    let config_path = load_config_from_env(ConfigType::Connection);
    let settings = load_settings(&config_path)?;
    debug!("Settings from {}: {:?}", config_path.display(), settings);

    let connection = linkwire::builder()
        .codec(JsonCodec::new())
        .protocols(args.protocols.iter().copied())
        .settings(settings)
        .build()?;

    let shutdown = Shutdown::new();
    shutdown.spawn_signal_handler();
    print_banner(NAME, &args.endpoint);

    let retry = ExponentialBackoff::new(Duration::from_millis(500), Duration::from_secs(30), None);
    run(&connection, &args.endpoint, &retry, &shutdown).await;

    connection.disconnect(true, DisconnectReason::Requested);
    let metrics = connection.metrics();
    print_shutdown(
        NAME,
        Some(&format!(
            "sent {} / received {} messages, {} connect attempts, {} keep-alive timeouts",
            metrics.messages_sent,
            metrics.messages_received,
            metrics.connect_attempts,
            metrics.keep_alive_timeouts
        )),
    );
    Ok(())
}

async fn run(
    connection: &ClientConnection<JsonCodec>,
    endpoint: &str,
    retry: &dyn RetryPolicy,
    shutdown: &Shutdown,
) {
    let events = connection.subscribe();
    let mut attempt = 0usize;

    'session: while shutdown.is_running() {
        if let Err(e) = connection.connect(endpoint, MessageTypes::RELIABLE).await {
            error!("Cannot start connect: {}", e);
            return;
        }

        while shutdown.is_running() {
            let Some(event) = events.try_recv() else {
                tokio::time::sleep(POLL_INTERVAL).await;
                continue;
            };

            match event {
                ConnectionEvent::Connected { protocols, .. } => {
                    attempt = 0;
                    let ids: Vec<String> = protocols.iter().map(ToString::to_string).collect();
                    info!("Connected, protocols [{}]", ids.join(", "));
                }
                ConnectionEvent::MessageReceived { kind, message, .. } => {
                    info!("Message kind {}: {:?}", kind, message);
                }
                ConnectionEvent::ConnectionFailed { error, .. } => {
                    warn!("Connect failed: {}", error);
                    break;
                }
                ConnectionEvent::Disconnected { reason, .. } => {
                    warn!("Disconnected: {}", reason);
                    if reason == DisconnectReason::Requested {
                        return;
                    }
                    break;
                }
            }
        }

        if !shutdown.is_running() {
            break;
        }
        let Some(delay) = retry.next_delay(attempt) else {
            error!("Giving up after {} attempts", attempt);
            break 'session;
        };
        attempt += 1;
        info!("Reconnecting in {:?} (attempt {})", delay, attempt);
        shutdown.interruptible_sleep(delay).await;
    }
}
