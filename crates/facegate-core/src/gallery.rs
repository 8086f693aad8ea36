//! Authorized-user gallery built from a directory of per-person folders.
//!
//! Layout: `<root>/<person>/<image>.{jpg,jpeg,png}`. The first matching
//! image in each person folder becomes that person's reference photo.

use crate::types::{Gallery, ImagePayload, ReferenceEntry, MIME_JPEG, MIME_PNG};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("failed to list gallery directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Enumeration order for person folders and the files inside them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GalleryOrder {
    /// Sort by name so the gallery is identical across platforms.
    #[default]
    Sorted,
    /// Whatever order the filesystem returns.
    Listing,
}

impl std::str::FromStr for GalleryOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sorted" => Ok(Self::Sorted),
            "listing" => Ok(Self::Listing),
            other => Err(format!("unknown gallery order: {other}")),
        }
    }
}

/// MIME type for a reference image, or `None` if the extension is not accepted.
pub fn image_mime_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some(MIME_JPEG),
        "png" => Some(MIME_PNG),
        _ => None,
    }
}

/// Scan `root` and load one reference image per person.
///
/// A missing root yields an empty gallery. Person folders without a usable
/// image are skipped, as are folders or files that cannot be read.
pub fn build_gallery(root: &Path, order: GalleryOrder) -> Result<Gallery, GalleryError> {
    if !root.is_dir() {
        tracing::debug!(root = %root.display(), "gallery root missing; using empty gallery");
        return Ok(Gallery::default());
    }

    let person_dirs: Vec<PathBuf> = list_dir(root, order)
        .map_err(|source| GalleryError::Io {
            path: root.to_path_buf(),
            source,
        })?
        .into_iter()
        .filter(|p| p.is_dir())
        .collect();

    let mut entries = Vec::with_capacity(person_dirs.len());
    for dir in person_dirs {
        let Some(person) = dir.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        match load_reference(&dir, order) {
            Ok(Some(image)) => entries.push(ReferenceEntry { person, image }),
            Ok(None) => {
                tracing::debug!(person = %person, "no reference image; skipping");
            }
            Err(err) => {
                tracing::warn!(
                    person = %person,
                    error = %err,
                    "unreadable reference folder; skipping"
                );
            }
        }
    }

    tracing::debug!(root = %root.display(), people = entries.len(), "gallery built");
    Ok(Gallery { entries })
}

/// Read the first accepted image in `dir`.
fn load_reference(dir: &Path, order: GalleryOrder) -> std::io::Result<Option<ImagePayload>> {
    let first = list_dir(dir, order)?
        .into_iter()
        .filter(|p| p.is_file())
        .find_map(|p| image_mime_type(&p).map(|mime| (p, mime)));

    match first {
        Some((path, mime)) => {
            let data = fs::read(&path)?;
            Ok(Some(ImagePayload::new(data, mime)))
        }
        None => Ok(None),
    }
}

fn list_dir(dir: &Path, order: GalleryOrder) -> std::io::Result<Vec<PathBuf>> {
    let mut paths = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    if order == GalleryOrder::Sorted {
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path, contents: &[u8]) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_missing_root_is_empty() {
        let tmp = TempDir::new().unwrap();
        let gallery = build_gallery(&tmp.path().join("nope"), GalleryOrder::Sorted).unwrap();
        assert!(gallery.is_empty());
    }

    #[test]
    fn test_no_valid_images_is_empty() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("alice/notes.txt"), b"hi");
        touch(&tmp.path().join("bob/photo.gif"), b"gif");
        fs::create_dir_all(tmp.path().join("carol")).unwrap();
        touch(&tmp.path().join("stray.jpg"), b"jpg");

        let gallery = build_gallery(tmp.path(), GalleryOrder::Sorted).unwrap();
        assert!(gallery.is_empty());
    }

    #[test]
    fn test_one_entry_per_person() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("alice/a.jpg"), b"first");
        touch(&tmp.path().join("alice/b.png"), b"second");
        touch(&tmp.path().join("alice/c.jpeg"), b"third");

        let gallery = build_gallery(tmp.path(), GalleryOrder::Sorted).unwrap();
        assert_eq!(gallery.len(), 1);
        assert_eq!(gallery.entries[0].person, "alice");
        assert_eq!(gallery.entries[0].image.data, b"first");
        assert_eq!(gallery.entries[0].image.mime_type, MIME_JPEG);
    }

    #[test]
    fn test_sorted_order_and_skip() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("zoe/z.png"), b"z");
        touch(&tmp.path().join("adam/readme.md"), b"x");
        touch(&tmp.path().join("adam/face.JPG"), b"a");
        touch(&tmp.path().join("mia/empty.txt"), b"");

        let gallery = build_gallery(tmp.path(), GalleryOrder::Sorted).unwrap();
        let people: Vec<&str> = gallery.people().collect();
        assert_eq!(people, vec!["adam", "zoe"]);
        assert_eq!(gallery.entries[1].image.mime_type, MIME_PNG);
    }

    #[test]
    fn test_extension_case_insensitive() {
        assert_eq!(image_mime_type(Path::new("x.JPEG")), Some(MIME_JPEG));
        assert_eq!(image_mime_type(Path::new("x.Png")), Some(MIME_PNG));
        assert_eq!(image_mime_type(Path::new("x.webp")), None);
        assert_eq!(image_mime_type(Path::new("jpg")), None);
    }

    #[test]
    fn test_directory_named_like_image_is_ignored() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("alice/decoy.jpg")).unwrap();
        touch(&tmp.path().join("alice/real.png"), b"png");

        let gallery = build_gallery(tmp.path(), GalleryOrder::Sorted).unwrap();
        assert_eq!(gallery.len(), 1);
        assert_eq!(gallery.entries[0].image.data, b"png");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_unreadable_reference_skips_person() {
        // A regular file whose read fails even as root.
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("alice")).unwrap();
        std::os::unix::fs::symlink("/proc/self/mem", tmp.path().join("alice/a.jpg")).unwrap();
        touch(&tmp.path().join("bob/b.jpg"), b"bob");

        let gallery = build_gallery(tmp.path(), GalleryOrder::Sorted).unwrap();
        let people: Vec<&str> = gallery.people().collect();
        assert_eq!(people, vec!["bob"]);
    }

    #[test]
    fn test_parse_order() {
        assert_eq!("Sorted".parse::<GalleryOrder>().unwrap(), GalleryOrder::Sorted);
        assert_eq!("listing".parse::<GalleryOrder>().unwrap(), GalleryOrder::Listing);
        assert!("random".parse::<GalleryOrder>().is_err());
    }
}
