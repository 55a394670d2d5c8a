use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Subdirectory that flagged files are moved into on exit.
pub const DELETE_DIR: &str = "__delete";

const DELETE_MARKER: &str = "[x] ";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("cannot list directory of {}: {source}", .path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} is not among the files of its directory", .0.display())]
    EntryNotFound(PathBuf),
}

#[derive(Debug)]
pub struct CatalogEntry {
    pub path: PathBuf,
    pub flagged: bool,
}

impl CatalogEntry {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            flagged: false,
        }
    }

    /// Filename, prefixed with the pending-deletion marker while flagged.
    pub fn label(&self) -> String {
        let name = self
            .path
            .file_name()
            .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
        if self.flagged {
            format!("{DELETE_MARKER}{name}")
        } else {
            name
        }
    }
}

/// The ordered list of sibling files navigable from the launch file.
#[derive(Debug)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    start: usize,
}

impl Catalog {
    /// List the files beside `start_path` (flat, non-recursive), ordered by a
    /// natural case-insensitive comparison of the full paths, and locate
    /// `start_path` within that list. Pure read, no side effects.
    pub fn scan(start_path: &Path) -> Result<Self, CatalogError> {
        let target = fs::canonicalize(start_path).map_err(|source| CatalogError::Unavailable {
            path: start_path.to_path_buf(),
            source,
        })?;
        let dir = target
            .parent()
            .ok_or_else(|| CatalogError::EntryNotFound(target.clone()))?;

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(|source| CatalogError::Unavailable {
            path: start_path.to_path_buf(),
            source,
        })? {
            let Ok(entry) = entry else { continue };
            let path = entry.path();
            if path.is_file() {
                paths.push(path);
            }
        }
        paths.sort_by(|a, b| {
            natord::compare_ignore_case(&a.to_string_lossy(), &b.to_string_lossy())
        });

        let start = paths
            .iter()
            .position(|p| *p == target)
            .ok_or_else(|| CatalogError::EntryNotFound(target.clone()))?;

        Ok(Self {
            entries: paths.into_iter().map(CatalogEntry::new).collect(),
            start,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn start_index(&self) -> usize {
        self.start
    }

    pub fn entry(&self, index: usize) -> &CatalogEntry {
        &self.entries[index]
    }

    /// Flip the deletion flag on one entry, returning the new flag state.
    pub fn toggle_flag(&mut self, index: usize) -> bool {
        let entry = &mut self.entries[index];
        entry.flagged = !entry.flagged;
        entry.flagged
    }

    /// Move every flagged file into the `__delete` subdirectory of its own
    /// directory, keeping its filename. Failures are collected per file and
    /// never stop the remaining moves.
    pub fn move_flagged(&self) -> Vec<(PathBuf, io::Error)> {
        let mut failures = Vec::new();
        for entry in self.entries.iter().filter(|e| e.flagged) {
            if let Err(err) = move_to_delete_dir(&entry.path) {
                failures.push((entry.path.clone(), err));
            }
        }
        failures
    }
}

fn move_to_delete_dir(path: &Path) -> io::Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "no parent directory"))?;
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "no file name"))?;
    let dest_dir = dir.join(DELETE_DIR);
    fs::create_dir_all(&dest_dir)?;
    let dest = dest_dir.join(name);
    // A file already sitting at the destination is an error for this entry,
    // never an overwrite.
    if dest.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", dest.display()),
        ));
    }
    fs::rename(path, dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn temp_fixture(files: &[&str]) -> PathBuf {
        static SEQ: AtomicUsize = AtomicUsize::new(0);
        let dir = std::env::temp_dir().join(format!(
            "fsv-catalog-{}-{}",
            std::process::id(),
            SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        fs::create_dir_all(&dir).unwrap();
        for name in files {
            fs::write(dir.join(name), b"data").unwrap();
        }
        dir
    }

    #[test]
    fn scan_orders_numeric_runs_naturally() {
        let dir = temp_fixture(&["img2.png", "img10.png", "img1.png"]);
        let catalog = Catalog::scan(&dir.join("img2.png")).unwrap();
        let labels: Vec<String> = (0..catalog.len()).map(|i| catalog.entry(i).label()).collect();
        assert_eq!(labels, ["img1.png", "img2.png", "img10.png"]);
        assert_eq!(catalog.start_index(), 1);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn scan_ignores_case_when_ordering() {
        let dir = temp_fixture(&["B.png", "a.png", "C.png"]);
        let catalog = Catalog::scan(&dir.join("a.png")).unwrap();
        let labels: Vec<String> = (0..catalog.len()).map(|i| catalog.entry(i).label()).collect();
        assert_eq!(labels, ["a.png", "B.png", "C.png"]);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn scan_missing_path_is_unavailable() {
        let err = Catalog::scan(Path::new("/nonexistent/fsv/pic.png")).unwrap_err();
        assert!(matches!(err, CatalogError::Unavailable { .. }));
    }

    #[test]
    fn scan_directory_target_is_not_found() {
        let dir = temp_fixture(&["pic.png"]);
        let err = Catalog::scan(&dir).unwrap_err();
        assert!(matches!(err, CatalogError::EntryNotFound(_)));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn delete_flag_round_trips_label() {
        let dir = temp_fixture(&["pic.png"]);
        let mut catalog = Catalog::scan(&dir.join("pic.png")).unwrap();
        assert_eq!(catalog.entry(0).label(), "pic.png");
        assert!(catalog.toggle_flag(0));
        assert_eq!(catalog.entry(0).label(), "[x] pic.png");
        assert!(!catalog.toggle_flag(0));
        assert_eq!(catalog.entry(0).label(), "pic.png");
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn move_flagged_moves_only_flagged_files() {
        let dir = temp_fixture(&["a.png", "b.png", "c.png", "d.png", "e.png"]);
        let mut catalog = Catalog::scan(&dir.join("a.png")).unwrap();
        catalog.toggle_flag(1);
        catalog.toggle_flag(3);

        let failures = catalog.move_flagged();
        assert!(failures.is_empty());

        let trash = dir.join(DELETE_DIR);
        assert!(trash.join("b.png").is_file());
        assert!(trash.join("d.png").is_file());
        assert!(!dir.join("b.png").exists());
        assert!(!dir.join("d.png").exists());
        assert!(dir.join("a.png").is_file());
        assert!(dir.join("c.png").is_file());
        assert!(dir.join("e.png").is_file());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn move_flagged_reports_collisions_and_continues() {
        let dir = temp_fixture(&["a.png", "b.png"]);
        fs::create_dir_all(dir.join(DELETE_DIR)).unwrap();
        fs::write(dir.join(DELETE_DIR).join("a.png"), b"occupied").unwrap();

        let mut catalog = Catalog::scan(&dir.join("a.png")).unwrap();
        catalog.toggle_flag(0);
        catalog.toggle_flag(1);

        let failures = catalog.move_flagged();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].0.ends_with("a.png"));
        assert_eq!(failures[0].1.kind(), io::ErrorKind::AlreadyExists);
        // the collision did not stop the other move
        assert!(dir.join(DELETE_DIR).join("b.png").is_file());
        assert!(dir.join("a.png").is_file());
        fs::remove_dir_all(&dir).unwrap();
    }
}
