// src/shutdown.rs
//! Shutdown notification. The signal task owns the trigger, the scheduler
//! owns the listener; nothing global is mutated.

use tokio::sync::watch;
use tokio::task::JoinHandle;

pub struct ShutdownTrigger(watch::Sender<bool>);

#[derive(Clone)]
pub struct ShutdownListener(watch::Receiver<bool>);

pub fn channel() -> (ShutdownTrigger, ShutdownListener) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger(tx), ShutdownListener(rx))
}

impl ShutdownTrigger {
    /// Idempotent; later calls are no-ops.
    pub fn trigger(&self) {
        self.0.send_replace(true);
    }
}

impl ShutdownListener {
    pub fn is_requested(&self) -> bool {
        *self.0.borrow()
    }
}

#[cfg(unix)]
type Terminate = Option<tokio::signal::unix::Signal>;
#[cfg(not(unix))]
type Terminate = ();

/// Register the SIGTERM stream on the caller's thread so no signal slips
/// past between spawn and first poll.
#[cfg(unix)]
fn register_terminate() -> Terminate {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(term) => Some(term),
        Err(e) => {
            tracing::warn!(error = %e, "cannot install SIGTERM handler, ctrl-c only");
            None
        }
    }
}

#[cfg(not(unix))]
fn register_terminate() -> Terminate {}

#[cfg(unix)]
async fn wait_for_signal(term: Terminate) -> &'static str {
    match term {
        Some(mut term) => tokio::select! {
            _ = tokio::signal::ctrl_c() => "SIGINT",
            _ = term.recv() => "SIGTERM",
        },
        None => {
            let _ = tokio::signal::ctrl_c().await;
            "SIGINT"
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal(_term: Terminate) -> &'static str {
    let _ = tokio::signal::ctrl_c().await;
    "ctrl-c"
}

/// Turn the first SIGINT/SIGTERM into a shutdown request. Must be called
/// from within a Tokio runtime.
pub fn spawn_signal_listener(trigger: ShutdownTrigger) -> JoinHandle<()> {
    let term = register_terminate();
    tokio::spawn(async move {
        let sig = wait_for_signal(term).await;
        tracing::info!(signal = sig, "received signal, initiating graceful shutdown");
        trigger.trigger();
    })
}
