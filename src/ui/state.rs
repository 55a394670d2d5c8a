use image::RgbaImage;
use winit::window::{Fullscreen, Window};

use crate::navigator::{DecodedImage, Navigator};
use crate::ui::render::{self, BG_COLOR};

const OVERLAY_TEXT_SCALE: u32 = 2;

/// Viewer actions, decoupled from whatever input produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Next,
    Previous,
    ToggleFullscreen,
    ToggleOverlay,
    ToggleDelete,
    Close,
}

/// The scaled canvas for one (image, viewport) pairing. Rebuilt when either
/// side changes; resize events therefore re-fit without touching the disk.
struct ScaledFrame {
    view_w: u32,
    view_h: u32,
    pixels: RgbaImage,
    offset_x: u32,
    offset_y: u32,
}

pub struct ViewerState {
    pub navigator: Navigator,
    current: Option<DecodedImage>,
    scaled: Option<ScaledFrame>,
    pub show_overlay: bool,
    pub fullscreen: bool,
}

impl ViewerState {
    pub fn new(navigator: Navigator) -> Self {
        Self {
            navigator,
            current: None,
            scaled: None,
            show_overlay: true,
            fullscreen: true,
        }
    }

    /// Decode the launch file itself (a zero step reuses the skip-invalid
    /// loop without moving the cursor).
    pub fn load_initial(&mut self) {
        self.navigate(0);
    }

    fn navigate(&mut self, delta: isize) {
        match self.navigator.step(delta) {
            Ok(image) => {
                // old decoded image dropped here
                self.current = Some(image);
                self.scaled = None;
                log::debug!(
                    "[nav] {}/{} {}",
                    self.navigator.current_index() + 1,
                    self.navigator.catalog().len(),
                    self.navigator.current_label()
                );
            }
            Err(err) => {
                log::warn!("{err}");
                self.current = None;
                self.scaled = None;
            }
        }
    }

    /// Apply one command. Returns true when the viewer should close.
    pub fn apply(&mut self, command: Command, window: &Window) -> bool {
        match command {
            Command::Close => return true,
            Command::Next => self.navigate(1),
            Command::Previous => self.navigate(-1),
            Command::ToggleFullscreen => {
                self.fullscreen = !self.fullscreen;
                window.set_fullscreen(self.fullscreen.then(|| Fullscreen::Borderless(None)));
            }
            Command::ToggleOverlay => self.show_overlay = !self.show_overlay,
            Command::ToggleDelete => {
                self.navigator.toggle_delete();
            }
        }
        false
    }

    fn ensure_scaled(&mut self, view_w: u32, view_h: u32) {
        if let Some(ref scaled) = self.scaled {
            if scaled.view_w == view_w && scaled.view_h == view_h {
                return;
            }
        }
        self.scaled = None;
        let Some(ref image) = self.current else { return };
        let Some(fit) = render::fit(image.width(), image.height(), view_w, view_h) else {
            return;
        };
        log::debug!(
            "fit {}x{} -> {}x{} zoom {:.2}",
            image.width(),
            image.height(),
            fit.scaled_w,
            fit.scaled_h,
            fit.zoom
        );
        self.scaled = Some(ScaledFrame {
            view_w,
            view_h,
            pixels: render::scale(&image.pixels, &fit),
            offset_x: fit.offset_x,
            offset_y: fit.offset_y,
        });
    }

    /// Paint one frame: background, fitted image (or a placeholder when
    /// nothing decodable was found), then the filename overlay.
    pub fn render(&mut self, frame: &mut [u32], view_w: u32, view_h: u32) {
        frame.fill(render::rgb(BG_COLOR[0], BG_COLOR[1], BG_COLOR[2]));

        self.ensure_scaled(view_w, view_h);
        if let Some(ref scaled) = self.scaled {
            render::blit(frame, view_w, view_h, &scaled.pixels, scaled.offset_x, scaled.offset_y);
        } else if self.current.is_none() {
            let text = "No viewable image";
            let x = view_w.saturating_sub(render::text_width(text, OVERLAY_TEXT_SCALE)) / 2;
            render::draw_text(
                frame,
                view_w,
                view_h,
                text,
                x as i32,
                (view_h / 2) as i32,
                OVERLAY_TEXT_SCALE,
                (255, 80, 80, 255),
            );
        }

        if self.show_overlay {
            let label = self.navigator.current_label();
            let bar_w = render::text_width(&label, OVERLAY_TEXT_SCALE) + 16;
            let bar_h = render::text_height(OVERLAY_TEXT_SCALE) + 8;
            render::fill_rect(frame, view_w, view_h, 0, 0, bar_w, bar_h, (0, 0, 0, 178));
            render::draw_text(
                frame,
                view_w,
                view_h,
                &label,
                8,
                4,
                OVERLAY_TEXT_SCALE,
                (255, 255, 255, 255),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use image::Rgba;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn temp_dir() -> PathBuf {
        static SEQ: AtomicUsize = AtomicUsize::new(0);
        let dir = std::env::temp_dir().join(format!(
            "fsv-state-{}-{}",
            std::process::id(),
            SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn render_fills_viewport_with_fitted_image() {
        let dir = temp_dir();
        image::RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]))
            .save(dir.join("red.png"))
            .unwrap();

        let mut state = ViewerState::new(Navigator::new(
            Catalog::scan(&dir.join("red.png")).unwrap(),
        ));
        state.show_overlay = false;
        state.load_initial();

        // square image in a square viewport covers the whole frame
        let mut frame = vec![0u32; 64 * 64];
        state.render(&mut frame, 64, 64);
        assert_eq!(frame[0], render::rgb(255, 0, 0));
        assert_eq!(frame[64 * 32 + 32], render::rgb(255, 0, 0));

        // shrinking the viewport rebuilds the cached canvas
        let mut frame = vec![0u32; 32 * 32];
        state.render(&mut frame, 32, 32);
        assert_eq!(frame[32 * 16 + 16], render::rgb(255, 0, 0));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn render_without_an_image_leaves_the_background() {
        let dir = temp_dir();
        fs::write(dir.join("broken.png"), b"not an image").unwrap();

        let mut state = ViewerState::new(Navigator::new(
            Catalog::scan(&dir.join("broken.png")).unwrap(),
        ));
        state.show_overlay = false;
        state.load_initial();

        let mut frame = vec![0u32; 64 * 64];
        state.render(&mut frame, 64, 64);
        let bg = render::rgb(BG_COLOR[0], BG_COLOR[1], BG_COLOR[2]);
        assert_eq!(frame[0], bg);
        fs::remove_dir_all(&dir).unwrap();
    }
}
