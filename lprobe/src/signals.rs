//! Process signal plumbing.
//!
//! SIGINT (and SIGTERM on unix) cancel the run's token. The token is never reset, so a second
//! signal has no further effect.
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
#[allow(unused)]
use tracing::{debug, error, info};

/// Spawn a task which cancels `token` on the first stop signal. The task exits on its own once
/// `token` is cancelled by anyone else.
pub fn cancel_on_shutdown(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => debug!("Run finished, no longer listening for signals"),
            signal = stop_signal() => {
                info!(signal, "Received stop signal, cancelling run");
                token.cancel();
            }
        }
    })
}

async fn stop_signal() -> &'static str {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            error!(%error, "Unable to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => tokio::select! {
                _ = ctrl_c => "SIGINT",
                _ = terminate.recv() => "SIGTERM",
            },
            Err(error) => {
                error!(%error, "Unable to listen for SIGTERM");
                ctrl_c.await;
                "SIGINT"
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await;
        "SIGINT"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ntest::timeout(1_000)]
    async fn exits_when_token_cancelled() {
        let token = CancellationToken::new();
        let handle = cancel_on_shutdown(token.clone());

        token.cancel();
        handle.await.unwrap();
        assert!(token.is_cancelled());
    }
}
