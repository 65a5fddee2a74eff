use tokio::sync::mpsc;
use tracing::info;

/// Observer for the human-readable progress messages the pipeline emits
/// after each stage completes. Implementations must return promptly and may
/// not suspend the pipeline; messages are ephemeral and never persisted.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, message: &str);
}

/// Forwards progress messages over an unbounded tokio channel so a UI or
/// CLI task can consume them while the run is in flight.
pub struct ChannelReporter {
    sender: mpsc::UnboundedSender<String>,
}

impl ChannelReporter {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl ProgressReporter for ChannelReporter {
    fn report(&self, message: &str) {
        // A closed receiver just means nobody is listening anymore.
        let _ = self.sender.send(message.to_string());
    }
}

/// Emits progress messages straight to the tracing log.
pub struct LogReporter;

impl ProgressReporter for LogReporter {
    fn report(&self, message: &str) {
        info!("{}", message);
    }
}

/// Discards all progress messages.
pub struct NullReporter;

impl ProgressReporter for NullReporter {
    fn report(&self, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn channel_reporter_delivers_messages_in_order() {
        let (reporter, mut receiver) = ChannelReporter::new();
        reporter.report("first");
        reporter.report("second");
        assert_eq!(receiver.recv().await.as_deref(), Some("first"));
        assert_eq!(receiver.recv().await.as_deref(), Some("second"));
    }

    #[test]
    fn channel_reporter_survives_dropped_receiver() {
        let (reporter, receiver) = ChannelReporter::new();
        drop(receiver);
        reporter.report("nobody listening");
    }
}
