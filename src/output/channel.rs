//! Channel-backed result sink
//!
//! Forwards every scheduler event to an unbounded tokio channel so a front end
//! can render progress on its own task. Dropping the receiver is how a front end
//! goes away; the next send then fails with `SinkError::Closed`.

use crate::crawler::ProbeResult;
use crate::output::traits::{ResultSink, SinkError, SinkResult};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// An event pushed from the scheduler to its consumer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpiderEvent {
    /// A progress line and the number of pending frontier entries
    Status { message: String, queue_depth: usize },

    /// The probe result for one URL
    Page(ProbeResult),
}

/// Result sink that forwards events over a channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: UnboundedSender<SpiderEvent>,
}

impl ChannelSink {
    /// Wraps an existing sender
    pub fn new(tx: UnboundedSender<SpiderEvent>) -> Self {
        Self { tx }
    }

    /// Creates a sink together with the receiving half of its channel
    pub fn channel() -> (Self, UnboundedReceiver<SpiderEvent>) {
        let (tx, rx) = unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl ResultSink for ChannelSink {
    fn on_status(&self, message: &str, queue_depth: usize) -> SinkResult<()> {
        self.tx
            .send(SpiderEvent::Status {
                message: message.to_string(),
                queue_depth,
            })
            .map_err(|_| SinkError::Closed)
    }

    fn on_page_result(&self, result: &ProbeResult) -> SinkResult<()> {
        self.tx
            .send(SpiderEvent::Page(result.clone()))
            .map_err(|_| SinkError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> ProbeResult {
        ProbeResult {
            url: "http://example.com/a/".to_string(),
            status_code: Some(200),
            mime_type: "text/html".to_string(),
            referrer: "[root page]".to_string(),
        }
    }

    #[test]
    fn test_forwards_events_in_order() {
        let (sink, mut rx) = ChannelSink::channel();

        sink.on_status("Next page...", 1).unwrap();
        sink.on_page_result(&sample_result()).unwrap();

        assert_eq!(
            rx.try_recv().unwrap(),
            SpiderEvent::Status {
                message: "Next page...".to_string(),
                queue_depth: 1
            }
        );
        assert_eq!(rx.try_recv().unwrap(), SpiderEvent::Page(sample_result()));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_closed_receiver_reports_closed() {
        let (sink, rx) = ChannelSink::channel();
        drop(rx);

        assert!(matches!(sink.on_status("x", 0), Err(SinkError::Closed)));
        assert!(matches!(
            sink.on_page_result(&sample_result()),
            Err(SinkError::Closed)
        ));
    }
}
