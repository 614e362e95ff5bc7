use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use crate::sink::TextSink;

/// Terminal outcome reported by the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Outcome {
    Resolved { width: u32, height: u32 },
    Failed { reason: String },
}

/// Sending half of the one-shot resolution signal.
///
/// Consumed by [`complete`](Self::complete) or [`fail`](Self::fail), so at
/// most one outcome can ever be delivered. Dropping the handle without
/// reporting reads as a failure on the receiving side.
#[derive(Debug)]
pub struct ResolutionReport {
    tx: Sender<Outcome>,
}

impl ResolutionReport {
    /// Reports the source's intrinsic pixel dimensions.
    pub fn complete(self, width: u32, height: u32) {
        // The probe may already be gone during shutdown; nothing to do then.
        let _ = self.tx.send(Outcome::Resolved { width, height });
    }

    /// Reports that the source could not be loaded.
    pub fn fail(self, reason: impl Into<String>) {
        let _ = self.tx.send(Outcome::Failed {
            reason: reason.into(),
        });
    }
}

/// Receiving half of the one-shot resolution signal, polled once per frame on
/// the main thread.
///
/// On success the probe writes `"{width}x{height}"` to the sink exactly once.
/// On failure, or when the report handle is dropped unreported, the sink
/// keeps its placeholder and a warning is logged, also exactly once. After
/// either outcome the probe is settled and `poll` does nothing.
#[derive(Debug)]
pub struct ResolutionProbe {
    rx: Option<Receiver<Outcome>>,
}

impl ResolutionProbe {
    /// Creates a connected probe/report pair.
    pub fn new() -> (Self, ResolutionReport) {
        let (tx, rx) = mpsc::channel();
        (Self { rx: Some(rx) }, ResolutionReport { tx })
    }

    /// True once an outcome has been observed.
    pub fn is_settled(&self) -> bool {
        self.rx.is_none()
    }

    /// Checks for an outcome without blocking.
    pub fn poll(&mut self, sink: &mut dyn TextSink) {
        let Some(rx) = self.rx.as_ref() else { return };

        match rx.try_recv() {
            Ok(Outcome::Resolved { width, height }) => {
                sink.set_text(&format_resolution(width, height));
                self.rx = None;
            }
            Ok(Outcome::Failed { reason }) => {
                log::warn!("source resolution unavailable: {reason}");
                self.rx = None;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                log::warn!("source loader went away before reporting a resolution");
                self.rx = None;
            }
        }
    }
}

/// Formats intrinsic dimensions as `"{width}x{height}"`.
fn format_resolution(width: u32, height: u32) -> String {
    format!("{width}x{height}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::RecordingSink;

    #[test]
    fn pending_probe_writes_nothing() {
        let (mut probe, _report) = ResolutionProbe::new();
        let mut sink = RecordingSink::default();

        probe.poll(&mut sink);
        probe.poll(&mut sink);

        assert!(sink.writes.is_empty());
        assert!(!probe.is_settled());
    }

    #[test]
    fn completion_writes_dimensions_exactly_once() {
        let (mut probe, report) = ResolutionProbe::new();
        let mut sink = RecordingSink::default();

        report.complete(800, 600);

        probe.poll(&mut sink);
        probe.poll(&mut sink);
        probe.poll(&mut sink);

        assert_eq!(sink.writes, vec!["800x600".to_string()]);
        assert!(probe.is_settled());
    }

    #[test]
    fn failure_leaves_sink_untouched() {
        let (mut probe, report) = ResolutionProbe::new();
        let mut sink = RecordingSink::default();

        report.fail("decode error");
        probe.poll(&mut sink);

        assert!(sink.writes.is_empty());
        assert!(probe.is_settled());
    }

    #[test]
    fn dropped_report_settles_as_failure() {
        let (mut probe, report) = ResolutionProbe::new();
        let mut sink = RecordingSink::default();

        drop(report);
        probe.poll(&mut sink);

        assert!(sink.writes.is_empty());
        assert!(probe.is_settled());
    }

    #[test]
    fn completion_is_not_observed_before_poll() {
        let (probe, report) = ResolutionProbe::new();

        report.complete(1, 1);

        // The outcome sits in the channel until the owner polls.
        assert!(!probe.is_settled());
    }

    #[test]
    fn report_into_dropped_probe_is_harmless() {
        let (probe, report) = ResolutionProbe::new();
        drop(probe);
        report.complete(640, 480);
    }

    #[test]
    fn resolution_format_matches_width_x_height() {
        assert_eq!(format_resolution(1920, 1080), "1920x1080");
        assert_eq!(format_resolution(0, 0), "0x0");
    }
}
