use std::time::{Duration, Instant};

use crate::sink::TextSink;

/// Default measurement window. A report fires on the first tick that lands
/// strictly past this much elapsed time.
const REPORT_AFTER: Duration = Duration::from_millis(1000);

/// Frame-rate sampler.
///
/// Counts ticks and, once per measurement window, writes the
/// elapsed-normalized rate to a text sink with exactly one fractional digit.
///
/// Invariant: `frame_count` equals the number of ticks observed since
/// `window_start` was last set.
///
/// Timestamps are passed in rather than read internally, so the owner hands
/// over its frame-loop stamps and tests drive the sampler with synthetic
/// instants.
#[derive(Debug)]
pub struct FpsSampler {
    window_start: Instant,
    frame_count: u32,
    report_after: Duration,
}

impl FpsSampler {
    /// Creates a sampler whose first window starts at `start`.
    pub fn new(start: Instant) -> Self {
        Self::with_interval(start, REPORT_AFTER)
    }

    /// Creates a sampler that reports once a window exceeds `report_after`.
    pub fn with_interval(start: Instant, report_after: Duration) -> Self {
        Self {
            window_start: start,
            frame_count: 0,
            report_after,
        }
    }

    /// Ticks observed in the current window.
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Start of the current measurement window.
    pub fn window_start(&self) -> Instant {
        self.window_start
    }

    /// Records one tick.
    ///
    /// The window closes only here, and only when `now` lies strictly more
    /// than the report interval past the window start: the rate is written to
    /// `sink`, the counter resets, and a new window begins at `now`. A host
    /// that stops delivering ticks therefore never produces a report, no
    /// matter how much wall-clock time passes.
    pub fn tick(&mut self, now: Instant, sink: &mut dyn TextSink) {
        self.frame_count += 1;

        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed > self.report_after {
            let rate = f64::from(self.frame_count) / elapsed.as_secs_f64();
            sink.set_text(&format_rate(rate));

            self.frame_count = 0;
            self.window_start = now;
        }
    }
}

/// Formats a rate with exactly one fractional digit, e.g. `"59.9"`.
fn format_rate(rate: f64) -> String {
    format!("{rate:.1}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::RecordingSink;

    const MS: Duration = Duration::from_millis(1);

    fn is_rate_format(s: &str) -> bool {
        let Some((int_part, frac_part)) = s.split_once('.') else {
            return false;
        };
        !int_part.is_empty()
            && int_part.chars().all(|c| c.is_ascii_digit())
            && frac_part.len() == 1
            && frac_part.chars().all(|c| c.is_ascii_digit())
    }

    #[test]
    fn counts_ticks_without_reporting_inside_window() {
        let start = Instant::now();
        let mut sampler = FpsSampler::new(start);
        let mut sink = RecordingSink::default();

        for i in 1..=59 {
            sampler.tick(start + MS * (i * 16), &mut sink);
            assert_eq!(sampler.frame_count(), i);
        }

        assert!(sink.writes.is_empty());
        assert_eq!(sampler.window_start(), start);
    }

    #[test]
    fn no_report_at_exactly_the_interval() {
        let start = Instant::now();
        let mut sampler = FpsSampler::new(start);
        let mut sink = RecordingSink::default();

        sampler.tick(start + MS * 1000, &mut sink);

        assert!(sink.writes.is_empty());
        assert_eq!(sampler.frame_count(), 1);
    }

    #[test]
    fn report_resets_counter_and_window_start() {
        let start = Instant::now();
        let mut sampler = FpsSampler::new(start);
        let mut sink = RecordingSink::default();

        let closing = start + MS * 1001;
        sampler.tick(start + MS * 500, &mut sink);
        sampler.tick(closing, &mut sink);

        assert_eq!(sink.writes.len(), 1);
        assert_eq!(sampler.frame_count(), 0);
        assert_eq!(sampler.window_start(), closing);
    }

    #[test]
    fn uniform_sixty_ticks_reads_sixty() {
        let start = Instant::now();
        let mut sampler = FpsSampler::new(start);
        let mut sink = RecordingSink::default();

        // 59 ticks inside the window, the 60th just past it: 60 frames over
        // ~1.0005 s rounds to 60.0.
        for i in 1..=59 {
            sampler.tick(start + MS * (i * 16), &mut sink);
        }
        sampler.tick(start + Duration::from_micros(1_000_500), &mut sink);

        assert_eq!(sink.writes, vec!["60.0".to_string()]);
    }

    #[test]
    fn rate_normalizes_by_elapsed_time() {
        let start = Instant::now();
        let mut sampler = FpsSampler::new(start);
        let mut sink = RecordingSink::default();

        // 30 ticks total, but the window closes after ~2 s: the report reads
        // 15 per second, not 30.
        for i in 1..=29 {
            sampler.tick(start + MS * (i * 10), &mut sink);
        }
        sampler.tick(start + MS * 2001, &mut sink);

        assert_eq!(sink.writes.len(), 1);
        assert_eq!(sink.writes[0], "15.0");
    }

    #[test]
    fn consecutive_windows_report_independently() {
        let start = Instant::now();
        let mut sampler = FpsSampler::new(start);
        let mut sink = RecordingSink::default();

        // First window: 2 frames over ~1 s.
        sampler.tick(start + MS * 600, &mut sink);
        sampler.tick(start + MS * 1001, &mut sink);

        // Second window, measured from the first report: 3 frames, closing on
        // the tick at +1.2 s.
        let second_start = start + MS * 1001;
        sampler.tick(second_start + MS * 400, &mut sink);
        sampler.tick(second_start + MS * 800, &mut sink);
        sampler.tick(second_start + MS * 1200, &mut sink);

        assert_eq!(sink.writes.len(), 2);
        assert_eq!(sink.writes[0], "2.0");
        assert_eq!(sink.writes[1], "2.5");
    }

    #[test]
    fn every_report_has_one_fractional_digit() {
        let start = Instant::now();
        let mut sampler = FpsSampler::new(start);
        let mut sink = RecordingSink::default();

        let mut t = start;
        for step in [3u32, 7, 11, 16, 23, 40, 333, 1500] {
            for _ in 0..100 {
                t += MS * step;
                sampler.tick(t, &mut sink);
            }
        }

        assert!(!sink.writes.is_empty());
        for w in &sink.writes {
            assert!(is_rate_format(w), "unexpected rate format: {w:?}");
        }
    }

    #[test]
    fn idle_sampler_never_writes() {
        let start = Instant::now();
        let sampler = FpsSampler::new(start);
        let sink = RecordingSink::default();

        // No ticks are delivered; however much time passes, the window only
        // closes from inside a tick.
        assert_eq!(sampler.frame_count(), 0);
        assert!(sink.writes.is_empty());
    }

    #[test]
    fn custom_interval_is_honored() {
        let start = Instant::now();
        let mut sampler = FpsSampler::with_interval(start, Duration::from_millis(100));
        let mut sink = RecordingSink::default();

        sampler.tick(start + MS * 50, &mut sink);
        assert!(sink.writes.is_empty());

        sampler.tick(start + MS * 101, &mut sink);
        assert_eq!(sink.writes.len(), 1);
    }
}
