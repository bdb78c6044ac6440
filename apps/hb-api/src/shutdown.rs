//! 退出信号：Ctrl+C、SIGTERM、SIGHUP 任一到达即开始优雅退出。

use tokio::signal;
use tracing::{error, info};

pub async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!(target: "hb.api", signal = "SIGINT", "shutdown_requested"),
            Err(err) => {
                error!(target: "hb.api", error = %err, "signal_handler_failed");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = unix_signal(signal::unix::SignalKind::terminate(), "SIGTERM");
    #[cfg(unix)]
    let hangup = unix_signal(signal::unix::SignalKind::hangup(), "SIGHUP");

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();
    #[cfg(not(unix))]
    let hangup = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
        () = hangup => {},
    }
}

#[cfg(unix)]
async fn unix_signal(kind: signal::unix::SignalKind, name: &'static str) {
    match signal::unix::signal(kind) {
        Ok(mut stream) => {
            stream.recv().await;
            info!(target: "hb.api", signal = name, "shutdown_requested");
        }
        Err(err) => {
            error!(target: "hb.api", signal = name, error = %err, "signal_handler_failed");
            std::future::pending::<()>().await;
        }
    }
}
