use image::RgbaImage;
use image::imageops::{self, FilterType};

use super::font;

// ---------------------------------------------------------------------------
// Fit computation
// ---------------------------------------------------------------------------

pub const BG_COLOR: [u8; 3] = [31, 31, 31];

/// Zoom factor above which an image is treated as pixel art: the zoom is
/// truncated to a whole number and scaled without smoothing.
const PIXEL_ART_ZOOM: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resample {
    Nearest,
    Bicubic,
}

/// Placement of one image within one viewport: aspect-preserving zoom,
/// scaled size, centering offsets and the resampling filter to use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fit {
    pub zoom: f64,
    pub scaled_w: u32,
    pub scaled_h: u32,
    pub offset_x: u32,
    pub offset_y: u32,
    pub resample: Resample,
}

/// Compute how to fit an image into a viewport. The relatively larger image
/// dimension exactly fills its viewport dimension; the other is letterboxed.
/// Returns `None` while any dimension is zero.
pub fn fit(image_w: u32, image_h: u32, view_w: u32, view_h: u32) -> Option<Fit> {
    if image_w == 0 || image_h == 0 || view_w == 0 || view_h == 0 {
        return None;
    }

    let window_ratio = view_w as f64 / view_h as f64;
    let image_ratio = image_w as f64 / image_h as f64;
    let mut zoom = if window_ratio > image_ratio {
        view_h as f64 / image_h as f64
    } else {
        view_w as f64 / image_w as f64
    };

    let resample = if zoom > PIXEL_ART_ZOOM {
        zoom = zoom.trunc();
        Resample::Nearest
    } else {
        Resample::Bicubic
    };

    let scaled_w = ((image_w as f64 * zoom) as u32).min(view_w);
    let scaled_h = ((image_h as f64 * zoom) as u32).min(view_h);
    Some(Fit {
        zoom,
        scaled_w,
        scaled_h,
        offset_x: (view_w - scaled_w) / 2,
        offset_y: (view_h - scaled_h) / 2,
        resample,
    })
}

/// Resample an image to the fitted size.
pub fn scale(image: &RgbaImage, fit: &Fit) -> RgbaImage {
    if (fit.scaled_w, fit.scaled_h) == image.dimensions() {
        return image.clone();
    }
    let filter = match fit.resample {
        Resample::Nearest => FilterType::Nearest,
        Resample::Bicubic => FilterType::CatmullRom,
    };
    imageops::resize(image, fit.scaled_w, fit.scaled_h, filter)
}

// ---------------------------------------------------------------------------
// Framebuffer primitives (u32 pixels, 0x00RRGGBB)
// ---------------------------------------------------------------------------

pub fn rgb(r: u8, g: u8, b: u8) -> u32 {
    (r as u32) << 16 | (g as u32) << 8 | b as u32
}

fn blend(dst: u32, r: u8, g: u8, b: u8, a: u32) -> u32 {
    if a == 255 {
        return rgb(r, g, b);
    }
    let (dr, dg, db) = ((dst >> 16) as u8, (dst >> 8) as u8, dst as u8);
    let inv = 255 - a;
    rgb(
        ((r as u32 * a + dr as u32 * inv) / 255) as u8,
        ((g as u32 * a + dg as u32 * inv) / 255) as u8,
        ((b as u32 * a + db as u32 * inv) / 255) as u8,
    )
}

/// Copy an RGBA image into the framebuffer at the given offset, blending
/// partially transparent pixels over whatever is already there. Rows and
/// columns falling outside the framebuffer are clipped.
pub fn blit(frame: &mut [u32], fb_w: u32, fb_h: u32, src: &RgbaImage, x0: u32, y0: u32) {
    let (src_w, src_h) = src.dimensions();
    let data = src.as_raw();
    let rows = src_h.min(fb_h.saturating_sub(y0));
    let cols = src_w.min(fb_w.saturating_sub(x0));
    for sy in 0..rows {
        for sx in 0..cols {
            let si = ((sy * src_w + sx) * 4) as usize;
            let di = ((y0 + sy) * fb_w + x0 + sx) as usize;
            let a = data[si + 3] as u32;
            if a > 0 {
                frame[di] = blend(frame[di], data[si], data[si + 1], data[si + 2], a);
            }
        }
    }
}

pub fn fill_rect(
    frame: &mut [u32],
    fb_w: u32,
    fb_h: u32,
    rx: i32,
    ry: i32,
    rw: u32,
    rh: u32,
    color: (u8, u8, u8, u8),
) {
    for row in 0..rh {
        let y = ry + row as i32;
        if y < 0 || y as u32 >= fb_h {
            continue;
        }
        for col in 0..rw {
            let x = rx + col as i32;
            if x < 0 || x as u32 >= fb_w {
                continue;
            }
            let off = (y as u32 * fb_w + x as u32) as usize;
            frame[off] = blend(frame[off], color.0, color.1, color.2, color.3 as u32);
        }
    }
}

fn draw_char(
    frame: &mut [u32],
    fb_w: u32,
    fb_h: u32,
    ch: char,
    px: i32,
    py: i32,
    scale: u32,
    color: (u8, u8, u8, u8),
) {
    let idx = (ch as u32).wrapping_sub(font::FIRST_CHAR) as usize;
    let Some(glyph) = font::GLYPHS.get(idx) else {
        return;
    };
    for col in 0..font::GLYPH_W {
        let bits = glyph[col as usize];
        for row in 0..font::GLYPH_H {
            if bits & (1 << row) == 0 {
                continue;
            }
            for sy in 0..scale {
                for sx in 0..scale {
                    let x = px + (col * scale + sx) as i32;
                    let y = py + (row * scale + sy) as i32;
                    if x >= 0 && y >= 0 && (x as u32) < fb_w && (y as u32) < fb_h {
                        let off = (y as u32 * fb_w + x as u32) as usize;
                        frame[off] = blend(frame[off], color.0, color.1, color.2, color.3 as u32);
                    }
                }
            }
        }
    }
}

pub fn draw_text(
    frame: &mut [u32],
    fb_w: u32,
    fb_h: u32,
    text: &str,
    px: i32,
    py: i32,
    scale: u32,
    color: (u8, u8, u8, u8),
) {
    let mut x = px;
    for ch in text.chars() {
        draw_char(frame, fb_w, fb_h, ch, x, py, scale, color);
        x += ((font::GLYPH_W + 1) * scale) as i32;
    }
}

pub fn text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * (font::GLYPH_W + 1) * scale
}

pub fn text_height(scale: u32) -> u32 {
    font::GLYPH_H * scale
}
