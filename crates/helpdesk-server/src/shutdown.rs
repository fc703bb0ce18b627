//! Graceful shutdown handling

use std::time::Duration;
use tokio::signal;
use tokio::sync::watch;

/// Wait for Ctrl-C or, on Unix, SIGTERM.
///
/// If a handler can not be installed the corresponding branch never
/// completes; the failure is logged.
pub async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(err) = signal::ctrl_c().await {
			tracing::error!(error = %err, "failed to install Ctrl+C handler");
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match signal::unix::signal(signal::unix::SignalKind::terminate()) {
			Ok(mut sigterm) => {
				sigterm.recv().await;
			}
			Err(err) => {
				tracing::error!(error = %err, "failed to install SIGTERM handler");
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {
			tracing::info!("received Ctrl+C, initiating shutdown");
		}
		_ = terminate => {
			tracing::info!("received SIGTERM, initiating shutdown");
		}
	}
}

/// Tells the accept loop and every open connection to stop.
///
/// The stop request is latched: a server or connection that subscribes after
/// [`shutdown`](Self::shutdown) was called still sees it. After the signal,
/// the server stops accepting, lets in-flight requests finish for up to
/// `timeout`, then aborts whatever is left.
#[derive(Debug, Clone)]
pub struct ShutdownCoordinator {
	notify: watch::Sender<bool>,
	timeout: Duration,
}

impl ShutdownCoordinator {
	pub fn new(timeout: Duration) -> Self {
		let (notify, _) = watch::channel(false);
		Self { notify, timeout }
	}

	pub fn subscribe(&self) -> ShutdownSignal {
		ShutdownSignal {
			receiver: self.notify.subscribe(),
		}
	}

	pub fn shutdown(&self) {
		// stored even with no receivers yet
		self.notify.send_replace(true);
	}

	pub fn is_shutdown(&self) -> bool {
		*self.notify.borrow()
	}

	pub fn timeout(&self) -> Duration {
		self.timeout
	}

	/// Wait for a process signal, then trigger shutdown
	pub async fn wait_for_signal(&self) {
		shutdown_signal().await;
		self.shutdown();
	}
}

impl Default for ShutdownCoordinator {
	fn default() -> Self {
		Self::new(Duration::from_secs(30))
	}
}

/// Receiving half of a [`ShutdownCoordinator`]
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
	receiver: watch::Receiver<bool>,
}

impl ShutdownSignal {
	/// Resolve once shutdown has been requested, immediately if it already was
	pub async fn recv(&mut self) {
		if self.receiver.wait_for(|stopped| *stopped).await.is_err() {
			// every coordinator is gone, so nothing can request a stop
			std::future::pending::<()>().await;
		}
	}
}
