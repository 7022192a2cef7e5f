// Signal handling module
//
// SIGINT (Ctrl+C) and SIGTERM both request a graceful stop: the accept
// loop exits and open connections finish their requests. A second stop
// signal during that window exits the process at once.

use std::sync::Arc;
use tokio::sync::Notify;

use crate::logger;

/// Exit status used when a repeated signal cuts the graceful stop short
const FORCED_EXIT_CODE: i32 = 130;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignalAction {
    Shutdown,
    ForceExit,
}

/// Tracks stop signals: the first one stops gracefully, any later one forces exit
#[derive(Debug, Default)]
struct StopSignals {
    received: bool,
}

impl StopSignals {
    fn on_signal(&mut self) -> SignalAction {
        if std::mem::replace(&mut self.received, true) {
            SignalAction::ForceExit
        } else {
            SignalAction::Shutdown
        }
    }
}

fn act_on(signals: &mut StopSignals, name: &str, shutdown: &Notify) {
    match signals.on_signal() {
        SignalAction::Shutdown => {
            logger::log_signal_received(name);
            // notify_one stores a permit, so a loop not yet waiting still sees it
            shutdown.notify_one();
        }
        SignalAction::ForceExit => {
            logger::log_forced_exit(name);
            std::process::exit(FORCED_EXIT_CODE);
        }
    }
}

/// Spawn a task that fires `shutdown` on the first stop signal and
/// exits the process on the next
#[cfg(unix)]
pub fn start_signal_handler(shutdown: Arc<Notify>) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::spawn(async move {
        let mut signals = StopSignals::default();
        loop {
            let name = tokio::select! {
                _ = sigterm.recv() => "SIGTERM",
                _ = sigint.recv() => "SIGINT",
            };
            act_on(&mut signals, name, &shutdown);
        }
    });

    Ok(())
}

/// Non-Unix fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub fn start_signal_handler(shutdown: Arc<Notify>) -> std::io::Result<()> {
    tokio::spawn(async move {
        let mut signals = StopSignals::default();
        while tokio::signal::ctrl_c().await.is_ok() {
            act_on(&mut signals, "Ctrl+C", &shutdown);
        }
    });

    Ok(())
}
