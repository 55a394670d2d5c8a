use std::path::Path;

use image::RgbaImage;
use thiserror::Error;

use crate::catalog::Catalog;

#[derive(Debug, Error)]
#[error("no entry in the catalog could be decoded as an image")]
pub struct NoDecodableImage;

/// The currently displayed bitmap. Owned by the viewer state; replacing it
/// drops the previous one.
#[derive(Debug)]
pub struct DecodedImage {
    pub pixels: RgbaImage,
}

impl DecodedImage {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

fn decode(path: &Path) -> image::ImageResult<DecodedImage> {
    let pixels = image::open(path)?.to_rgba8();
    Ok(DecodedImage { pixels })
}

/// Wrap `index + delta` around both ends of `0..len`. Only steps of at most
/// one entry are ever taken, so a single bounds correction suffices.
pub fn wrap(index: usize, delta: isize, len: usize) -> usize {
    let shifted = index as isize + delta;
    if shifted < 0 {
        len - 1
    } else if shifted >= len as isize {
        0
    } else {
        shifted as usize
    }
}

/// Cursor over the catalog. Stepping decodes the entry it lands on and keeps
/// moving in the same direction past files that are not images.
#[derive(Debug)]
pub struct Navigator {
    catalog: Catalog,
    current: usize,
}

impl Navigator {
    pub fn new(catalog: Catalog) -> Self {
        let current = catalog.start_index();
        Self { catalog, current }
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_label(&self) -> String {
        self.catalog.entry(self.current).label()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Move the cursor by `delta` (-1, 0 or +1, wrapping) and decode the
    /// entry it lands on. Entries that fail to decode are skipped in the same
    /// direction; once the cursor has come back to where it started without a
    /// single success, the catalog holds nothing viewable.
    pub fn step(&mut self, delta: isize) -> Result<DecodedImage, NoDecodableImage> {
        debug_assert!(delta.abs() <= 1);
        let start = self.current;
        loop {
            self.current = wrap(self.current, delta, self.catalog.len());
            let path = &self.catalog.entry(self.current).path;
            match decode(path) {
                Ok(image) => return Ok(image),
                Err(err) => log::debug!("skipping {}: {err}", path.display()),
            }
            if self.current == start {
                return Err(NoDecodableImage);
            }
        }
    }

    /// Flip the deletion flag on the current entry and return its new label.
    pub fn toggle_delete(&mut self) -> String {
        self.catalog.toggle_flag(self.current);
        self.current_label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn temp_dir() -> PathBuf {
        static SEQ: AtomicUsize = AtomicUsize::new(0);
        let dir = std::env::temp_dir().join(format!(
            "fsv-navigator-{}-{}",
            std::process::id(),
            SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_png(path: &Path) {
        image::RgbaImage::from_pixel(2, 2, image::Rgba([200, 40, 40, 255]))
            .save(path)
            .unwrap();
    }

    fn navigator_for(dir: &Path, start: &str) -> Navigator {
        Navigator::new(Catalog::scan(&dir.join(start)).unwrap())
    }

    #[test]
    fn wrap_steps_around_both_ends() {
        assert_eq!(wrap(4, 1, 5), 0);
        assert_eq!(wrap(0, -1, 5), 4);
        assert_eq!(wrap(2, 1, 5), 3);
        assert_eq!(wrap(2, -1, 5), 1);
        assert_eq!(wrap(2, 0, 5), 2);
    }

    #[test]
    fn step_skips_undecodable_entries() {
        let dir = temp_dir();
        write_png(&dir.join("a.png"));
        fs::write(dir.join("b.png"), b"not an image").unwrap();
        fs::write(dir.join("c.png"), b"also not an image").unwrap();
        write_png(&dir.join("d.png"));
        write_png(&dir.join("e.png"));

        let mut nav = navigator_for(&dir, "a.png");
        assert_eq!(nav.current_index(), 0);
        nav.step(1).unwrap();
        assert_eq!(nav.current_index(), 3);
        // skipped entries stay in the catalog untouched
        assert_eq!(nav.catalog().len(), 5);
        assert_eq!(nav.catalog().entry(1).label(), "b.png");
        assert_eq!(nav.catalog().entry(2).label(), "c.png");
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn step_wraps_backwards_from_the_first_entry() {
        let dir = temp_dir();
        for name in ["a.png", "b.png", "c.png"] {
            write_png(&dir.join(name));
        }
        let mut nav = navigator_for(&dir, "a.png");
        nav.step(-1).unwrap();
        assert_eq!(nav.current_index(), 2);
        nav.step(1).unwrap();
        assert_eq!(nav.current_index(), 0);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn initial_load_attempts_only_the_start_entry() {
        let dir = temp_dir();
        fs::write(dir.join("a.png"), b"broken").unwrap();
        write_png(&dir.join("b.png"));

        let mut nav = navigator_for(&dir, "a.png");
        // delta 0 tries the start entry once and stops, even though a
        // decodable sibling exists
        nav.step(0).unwrap_err();
        assert_eq!(nav.current_index(), 0);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn initial_load_of_a_valid_start_keeps_the_index() {
        let dir = temp_dir();
        write_png(&dir.join("a.png"));
        write_png(&dir.join("b.png"));
        let mut nav = navigator_for(&dir, "b.png");
        let image = nav.step(0).unwrap();
        assert_eq!(nav.current_index(), 1);
        assert_eq!((image.width(), image.height()), (2, 2));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn exhausted_catalog_reports_no_decodable_image() {
        let dir = temp_dir();
        for name in ["a.png", "b.png", "c.png"] {
            fs::write(dir.join(name), b"broken").unwrap();
        }
        let mut nav = navigator_for(&dir, "b.png");
        nav.step(1).unwrap_err();
        assert_eq!(nav.current_index(), 1);
        nav.step(-1).unwrap_err();
        assert_eq!(nav.current_index(), 1);
        fs::remove_dir_all(&dir).unwrap();
    }
}
