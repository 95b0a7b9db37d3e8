//! Connect to a server and print every event.
//!
//! Run a WebSocket echo server on 127.0.0.1:5000, then:
//! cargo run --example listen

use std::time::Duration;

use wsconn_rs::{Event, ManagerConfig, SocketManager};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = ManagerConfig::new("http://127.0.0.1:5000").with_namespace("/ws");
    let manager = SocketManager::new(config);

    manager
        .on_open(|_| println!("open"))
        .on_message(|event| {
            if let Event::Message(payload) = event {
                println!("message: {payload:?}");
            }
        })
        .on_error(|event| {
            if let Event::Error(reason) = event {
                println!("error: {reason}");
            }
        })
        .on_close(|_| println!("closed"));

    manager.connect()?;
    manager.send("hello");

    tokio::time::sleep(Duration::from_secs(60)).await;
    manager.disconnect();
    Ok(())
}
