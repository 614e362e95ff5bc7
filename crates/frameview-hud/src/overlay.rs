use std::time::Instant;

use frameview_engine::coords::{Rect, Vec2, Viewport};
use frameview_engine::paint::Color;
use frameview_engine::scene::{DrawList, ZIndex};
use frameview_engine::text::{FontId, FontSystem};

use crate::probe::{ResolutionProbe, ResolutionReport};
use crate::sampler::FpsSampler;
use crate::sink::TextField;

const MARGIN: f32 = 12.0;
const PADDING: f32 = 8.0;
const LINE_SIZE: f32 = 15.0;
const LINE_ADVANCE: f32 = LINE_SIZE * 1.3;

/// Z-layers for the overlay; the image sits below these.
const Z_BACKDROP: ZIndex = ZIndex::new(10);
const Z_TEXT: ZIndex = ZIndex::new(11);

/// The heads-up overlay: rate readout, resolution readout, and their
/// backdrop.
///
/// Owns the sampler, the probe, and the two text fields the readouts live
/// in. The host calls [`on_frame`](Self::on_frame) once per frame with its
/// frame stamp and [`paint`](Self::paint) when recording the scene.
pub struct Hud {
    sampler: FpsSampler,
    probe: ResolutionProbe,
    rate_field: TextField,
    resolution_field: TextField,
}

impl Hud {
    /// Creates the overlay; `start` anchors the sampler's first measurement
    /// window. The returned [`ResolutionReport`] is handed to whatever loads
    /// the image.
    pub fn new(start: Instant) -> (Self, ResolutionReport) {
        let (probe, report) = ResolutionProbe::new();
        (
            Self {
                sampler: FpsSampler::new(start),
                probe,
                rate_field: TextField::new(),
                resolution_field: TextField::new(),
            },
            report,
        )
    }

    /// Per-frame update: one sampler tick plus one probe poll.
    pub fn on_frame(&mut self, now: Instant) {
        self.sampler.tick(now, &mut self.rate_field);
        self.probe.poll(&mut self.resolution_field);
    }

    /// Current rate readout text.
    pub fn rate_text(&self) -> &str {
        self.rate_field.text()
    }

    /// Current resolution readout text.
    pub fn resolution_text(&self) -> &str {
        self.resolution_field.text()
    }

    /// Records the overlay into `draw_list`: a translucent backdrop and the
    /// two readout lines, anchored top-left.
    pub fn paint(&self, draw_list: &mut DrawList, fonts: &FontSystem, font: FontId) {
        let lines = [
            format!("FPS {}", self.rate_field.text()),
            format!("RES {}", self.resolution_field.text()),
        ];

        let text_width = lines
            .iter()
            .map(|line| fonts.measure_text(line, font, LINE_SIZE).x)
            .fold(0.0f32, f32::max);

        let backdrop = Rect::new(
            MARGIN,
            MARGIN,
            text_width + PADDING * 2.0,
            LINE_ADVANCE * lines.len() as f32 + PADDING * 2.0,
        );
        draw_list.push_rect(Z_BACKDROP, backdrop, Color::from_straight(0.0, 0.0, 0.0, 0.55));

        for (i, line) in lines.iter().enumerate() {
            draw_list.push_text(
                Z_TEXT,
                line,
                font,
                LINE_SIZE,
                Color::from_straight(1.0, 1.0, 1.0, 1.0),
                Vec2::new(
                    MARGIN + PADDING,
                    MARGIN + PADDING + LINE_ADVANCE * i as f32,
                ),
            );
        }
    }
}

/// Largest rect with the source's aspect ratio that fits in `viewport`,
/// centered (letterboxed).
///
/// Degenerate inputs (zero-sized source or viewport) produce an empty rect at
/// the origin, which renderers skip.
pub fn fit_contain(src_width: u32, src_height: u32, viewport: Viewport) -> Rect {
    if src_width == 0 || src_height == 0 || !viewport.is_valid() {
        return Rect::new(0.0, 0.0, 0.0, 0.0);
    }

    let sw = src_width as f32;
    let sh = src_height as f32;
    let scale = (viewport.width / sw).min(viewport.height / sh);

    let w = sw * scale;
    let h = sh * scale;
    Rect::new(
        (viewport.width - w) * 0.5,
        (viewport.height - h) * 0.5,
        w,
        h,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::PLACEHOLDER;
    use std::time::Duration;

    #[test]
    fn readouts_start_at_placeholder() {
        let (hud, _report) = Hud::new(Instant::now());
        assert_eq!(hud.rate_text(), PLACEHOLDER);
        assert_eq!(hud.resolution_text(), PLACEHOLDER);
    }

    #[test]
    fn rate_updates_after_a_full_window() {
        let start = Instant::now();
        let (mut hud, _report) = Hud::new(start);

        for i in 1..=30 {
            hud.on_frame(start + Duration::from_millis(i * 33));
        }

        // 31 frames land past the 1 s mark; the readout is numeric now.
        hud.on_frame(start + Duration::from_millis(1023));
        assert_ne!(hud.rate_text(), PLACEHOLDER);
        assert!(hud.rate_text().contains('.'));
    }

    #[test]
    fn resolution_updates_once_loaded() {
        let start = Instant::now();
        let (mut hud, report) = Hud::new(start);

        hud.on_frame(start + Duration::from_millis(16));
        assert_eq!(hud.resolution_text(), PLACEHOLDER);

        report.complete(800, 600);
        hud.on_frame(start + Duration::from_millis(32));
        assert_eq!(hud.resolution_text(), "800x600");
    }

    #[test]
    fn resolution_stays_at_placeholder_when_load_fails() {
        let start = Instant::now();
        let (mut hud, report) = Hud::new(start);

        report.fail("no such file");
        hud.on_frame(start + Duration::from_millis(16));
        hud.on_frame(start + Duration::from_millis(32));

        assert_eq!(hud.resolution_text(), PLACEHOLDER);
    }

    #[test]
    fn fit_contain_letterboxes_wide_source() {
        let r = fit_contain(200, 100, Viewport::new(100.0, 100.0));
        assert_eq!(r, Rect::new(0.0, 25.0, 100.0, 50.0));
    }

    #[test]
    fn fit_contain_pillarboxes_tall_source() {
        let r = fit_contain(100, 200, Viewport::new(100.0, 100.0));
        assert_eq!(r, Rect::new(25.0, 0.0, 50.0, 100.0));
    }

    #[test]
    fn fit_contain_exact_fit_fills_viewport() {
        let r = fit_contain(800, 600, Viewport::new(800.0, 600.0));
        assert_eq!(r, Rect::new(0.0, 0.0, 800.0, 600.0));
    }

    #[test]
    fn fit_contain_degenerate_source_is_empty() {
        assert!(fit_contain(0, 100, Viewport::new(100.0, 100.0)).is_empty());
        assert!(fit_contain(100, 0, Viewport::new(100.0, 100.0)).is_empty());
        assert!(fit_contain(100, 100, Viewport::new(0.0, 100.0)).is_empty());
    }
}
