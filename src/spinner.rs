//! A terminal spinner shown while a symptom check is outstanding.

use std::io::Write;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;

/// Braille spinner frames.
const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

const INTERVAL: Duration = Duration::from_millis(80);

/// Message shown while waiting on the model.
pub const LISTENING: &str = "Njoki is listening...";

/// Spinner line with elapsed whole seconds once a second has passed.
fn frame_line(i: usize, message: &str, elapsed: Duration) -> String {
    let frame = FRAMES[i % FRAMES.len()];
    let secs = elapsed.as_secs();
    if secs == 0 {
        format!("{frame} {message}")
    } else {
        format!("{frame} {message} {secs}s")
    }
}

/// A terminal spinner that runs in a background task and writes to stderr.
pub struct Spinner {
    handle: JoinHandle<()>,
    cancel: tokio::sync::watch::Sender<bool>,
}

impl Spinner {
    pub fn start(message: &str) -> Self {
        let (cancel_tx, mut cancel_rx) = tokio::sync::watch::channel(false);
        let message = message.to_string();
        let started = Instant::now();

        let handle = tokio::spawn(async move {
            let mut i = 0;
            loop {
                // \r moves to start of line, \x1b[2K clears the line
                eprint!("\x1b[2K\r{}", frame_line(i, &message, started.elapsed()));
                let _ = std::io::stderr().flush();

                tokio::select! {
                    _ = tokio::time::sleep(INTERVAL) => {}
                    _ = cancel_rx.changed() => break,
                }
                i += 1;
            }
            eprint!("\x1b[2K\r");
            let _ = std::io::stderr().flush();
        });

        Self {
            handle,
            cancel: cancel_tx,
        }
    }

    /// Stop the spinner and clear its line.
    pub async fn stop(self) {
        let _ = self.cancel.send(true);
        let _ = self.handle.await;
    }
}
