//! Operator control channel.
//!
//! Reads one command per line. `quit` cancels the daemon; anything else is
//! ignored. End of input stops reading without cancelling, so a daemon
//! started with a closed stdin keeps polling.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const QUIT_COMMAND: &str = "quit";

/// How the control loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlExit {
    /// Operator asked to quit; the token was cancelled
    Quit,
    /// Input closed (or failed) before a quit command
    InputClosed,
    /// Token was cancelled elsewhere
    Cancelled,
}

/// Read commands from `input` until `quit`, end of input, or cancellation.
pub async fn run_control_loop<I>(input: I, cancel: CancellationToken) -> ControlExit
where
    I: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();

    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => return ControlExit::Cancelled,
            line = lines.next_line() => line,
        };

        match line {
            Ok(Some(line)) if line.trim() == QUIT_COMMAND => {
                info!("Quit requested");
                cancel.cancel();
                return ControlExit::Quit;
            }
            Ok(Some(line)) => {
                debug!(input = %line.trim(), "Ignoring unknown command");
            }
            Ok(None) => {
                debug!("Control input closed");
                return ControlExit::InputClosed;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read control input");
                return ControlExit::InputClosed;
            }
        }
    }
}
