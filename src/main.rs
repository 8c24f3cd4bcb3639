//! labwm
//!
//! A small reparenting X11 window manager: windows get a title bar and a
//! border, start where they asked (or under the pointer), and survive the
//! manager exiting.

mod config;
mod shared;
mod wm;
mod x11_async;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::wm::WindowManager;
use crate::x11_async::X11EventStream;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "labwm=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting labwm");

    let config = Config::load().context("Failed to load configuration")?;

    let (conn, screen_num) = x11rb::connect(None).context("Failed to connect to X server")?;
    let conn = Arc::new(conn);
    info!("Connected to X server, screen {}", screen_num);

    let mut wm = WindowManager::new(conn.clone(), screen_num, &config)?;
    wm.scan_windows();

    let stream = X11EventStream::new(conn).context("Failed to set up X11 event stream")?;

    let result = run(&mut wm, &stream).await;
    if let Err(e) = &result {
        error!("Event loop ended: {:#}", e);
    }

    info!("Releasing all windows");
    wm.shutdown();
    result
}

/// Process X events until SIGINT/SIGTERM or the connection goes away
async fn run(wm: &mut WindowManager, stream: &X11EventStream) -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    loop {
        // Replies read during the last batch may have pulled events off the
        // socket already; handle those before sleeping on it
        while let Some(event) = stream.next_pending()? {
            wm.handle_event(&event);
        }
        stream.flush()?;

        tokio::select! {
            () = stream.wait_readable() => {
                debug!("X11 socket readable");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down gracefully");
                return Ok(());
            }
            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down gracefully");
                return Ok(());
            }
        }
    }
}
