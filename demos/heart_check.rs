//! Heartbeat-enabled client.
//!
//! Probes the server with `ping` every 8 seconds; if no `pong` comes back
//! within the server timeout the connection is forced closed and re-opened
//! by the retry timer.
//!
//! cargo run --example heart_check

use std::time::Duration;

use wsconn_rs::{ManagerConfig, SocketManager};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = ManagerConfig::new("http://127.0.0.1:5000")
        .with_namespace("/ws")
        .with_heart_check(true)
        .with_heart_check_timeout(Duration::from_secs(8))
        .with_server_timeout(Duration::from_secs(30))
        .with_reconnect_time(Duration::from_secs(5))
        .with_heart_check_cb(|| println!("liveness check failed, reconnecting"));

    let manager = SocketManager::new(config);
    manager
        .on_open(|_| println!("open"))
        .on_close(|_| println!("closed"));

    manager.connect()?;

    tokio::time::sleep(Duration::from_secs(120)).await;
    manager.disconnect();
    Ok(())
}
