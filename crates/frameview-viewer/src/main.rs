//! Native image viewer with a live FPS counter and resolution readout.
//!
//! Displays `sample_output.png` aspect-fit in a window. The overlay shows the
//! measured display rate (updated roughly once per second) and the image's
//! intrinsic resolution (written once, when the background load finishes).
//! Escape or closing the window tears the loop down.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Instant;

use anyhow::{Context, Result};
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowId;

use frameview_engine::coords::Viewport;
use frameview_engine::core::{App, AppControl, FrameCtx};
use frameview_engine::device::GpuInit;
use frameview_engine::logging::{LoggingConfig, init_logging};
use frameview_engine::paint::Color;
use frameview_engine::render::{ImageRenderer, RectRenderer, SourceImage, TextRenderer};
use frameview_engine::scene::{DrawList, ZIndex};
use frameview_engine::text::{FontId, FontSystem};
use frameview_engine::window::{Runtime, RuntimeConfig};

use frameview_hud::cancel::StopToken;
use frameview_hud::overlay::{Hud, fit_contain};
use frameview_hud::probe::ResolutionReport;

/// The displayed resource. Fixed path, resolved against the working directory.
const SOURCE_PATH: &str = "sample_output.png";

const WINDOW_TITLE: &str = "frameview";

const Z_IMAGE: ZIndex = ZIndex::new(0);

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let mut fonts = FontSystem::new();
    let font_bytes =
        find_ui_font().context("no usable UI font found; the overlay cannot render")?;
    let font = fonts
        .load_font(&font_bytes)
        .context("failed to parse UI font")?;

    let (hud, report) = Hud::new(Instant::now());
    let source_rx = spawn_loader(SOURCE_PATH, report);

    let viewer = Viewer {
        stop: StopToken::new(),
        hud,
        fonts,
        font,
        source_rx,
        source_size: None,
        draw_list: DrawList::new(),
        rects: RectRenderer::new(),
        images: ImageRenderer::new(),
        texts: TextRenderer::new(),
    };

    Runtime::run(
        RuntimeConfig {
            title: WINDOW_TITLE.to_string(),
            initial_size: LogicalSize::new(960.0, 640.0),
        },
        GpuInit::default(),
        viewer,
    )
}

/// Decodes the source image off the main thread.
///
/// The intrinsic resolution goes through the one-shot report; the pixels
/// follow on their own channel and are picked up by the frame loop whenever
/// decoding finishes.
fn spawn_loader(path: &'static str, report: ResolutionReport) -> Receiver<SourceImage> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || match image::open(path) {
        Ok(decoded) => {
            let rgba = decoded.to_rgba8();
            let (width, height) = rgba.dimensions();
            log::info!("loaded {path} ({width}x{height})");

            report.complete(width, height);
            let _ = tx.send(SourceImage {
                width,
                height,
                rgba: rgba.into_raw(),
            });
        }
        Err(err) => {
            log::warn!("failed to load {path}: {err}");
            report.fail(err.to_string());
        }
    });

    rx
}

/// Well-known system font locations, probed in order.
fn find_ui_font() -> Option<Vec<u8>> {
    [
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/noto/NotoSans-Regular.ttf",
        "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
        "/System/Library/Fonts/Helvetica.ttc",
        "C:\\Windows\\Fonts\\segoeui.ttf",
    ]
    .iter()
    .find_map(|p| std::fs::read(p).ok())
}

struct Viewer {
    stop: StopToken,
    hud: Hud,
    fonts: FontSystem,
    font: FontId,

    source_rx: Receiver<SourceImage>,
    source_size: Option<(u32, u32)>,

    draw_list: DrawList,
    rects: RectRenderer,
    images: ImageRenderer,
    texts: TextRenderer,
}

impl App for Viewer {
    fn on_window_event(&mut self, _window_id: WindowId, event: &WindowEvent) -> AppControl {
        if let WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    physical_key: PhysicalKey::Code(KeyCode::Escape),
                    state: ElementState::Pressed,
                    ..
                },
            ..
        } = event
        {
            self.stop.stop();
        }

        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if self.stop.is_stopped() {
            return AppControl::Exit;
        }

        // Pick up the decoded image whenever the loader delivers it.
        match self.source_rx.try_recv() {
            Ok(source) => {
                self.source_size = Some((source.width, source.height));
                self.images.set_source(source);
            }
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => {}
        }

        self.hud.on_frame(ctx.stamp.now);

        let (w, h) = ctx.window.logical_size();
        let viewport = Viewport::new(w, h);

        self.draw_list.clear();
        if let Some((sw, sh)) = self.source_size {
            self.draw_list
                .push_image(Z_IMAGE, fit_contain(sw, sh, viewport));
        }
        self.hud.paint(&mut self.draw_list, &self.fonts, self.font);

        let dl = &mut self.draw_list;
        let fonts = &self.fonts;
        let rects = &mut self.rects;
        let images = &mut self.images;
        let texts = &mut self.texts;

        ctx.render(Color::from_straight(0.09, 0.09, 0.11, 1.0), |rctx, target| {
            images.render(rctx, target, dl);
            rects.render(rctx, target, dl);
            texts.render(rctx, target, dl, fonts);
        })
    }
}
