use clap::Parser;
use log::info;
use server::network::Server;
use shared::{DEFAULT_PORT, PROTOCOL_VERSION, TICK_RATE};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Maximum number of simultaneous connections
    #[arg(short, long, default_value = "32")]
    max_clients: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    let address = format!("{}:{}", args.host, args.port);
    let tick_duration = Duration::from_secs_f64(1.0 / TICK_RATE as f64);

    let mut server = Server::new(&address, tick_duration, args.max_clients).await?;
    info!("Server v{} running at {}Hz", PROTOCOL_VERSION, TICK_RATE);

    server.spawn_admin_console().await;
    server.spawn_signal_handler().await;

    server.run().await
}
