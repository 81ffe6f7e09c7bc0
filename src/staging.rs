use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use glob::Pattern;
use walkdir::WalkDir;

use crate::constants::STAGING_SUFFIX;

/// A scoped working copy of an input folder, placed next to it as
/// `<name>_temp`. Re-encoding mutates the copy, never the original, and the
/// copy is deleted when the guard drops — on every exit path of an attempt.
#[derive(Debug)]
pub struct StagedCopy {
    path: PathBuf,
}

impl StagedCopy {
    /// Copies `folder` into a fresh sibling staging directory, skipping
    /// hidden entries, other staging directories, and anything matching an
    /// exclusion pattern. An existing staging directory from an aborted run
    /// is replaced.
    pub fn create(folder: &Path, exclusions: &[String]) -> io::Result<Self> {
        let name = folder.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("cannot stage path without a folder name: {}", folder.display()),
            )
        })?;
        let parent = folder.parent().unwrap_or_else(|| Path::new("."));
        let staged = parent.join(format!("{}{}", name.to_string_lossy(), STAGING_SUFFIX));

        if staged.exists() {
            fs::remove_dir_all(&staged)?;
        }

        let patterns: Vec<Pattern> = exclusions
            .iter()
            .filter_map(|p| Pattern::new(p).ok())
            .collect();

        copy_filtered(folder, &staged, &patterns)?;
        Ok(Self { path: staged })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedCopy {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn is_excluded(name: &std::ffi::OsStr, patterns: &[Pattern]) -> bool {
    let name = name.to_string_lossy();
    name.starts_with('.')
        || name.ends_with(STAGING_SUFFIX)
        || patterns.iter().any(|p| p.matches(&name))
}

fn copy_filtered(src: &Path, dst: &Path, patterns: &[Pattern]) -> io::Result<()> {
    fs::create_dir_all(dst)?;
    let walker = WalkDir::new(src)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| !is_excluded(e.file_name(), patterns));
    for entry in walker {
        let entry = entry?;
        let rel = entry.path().strip_prefix(src).map_err(|_| {
            io::Error::other(format!(
                "entry escaped staging root: {}",
                entry.path().display()
            ))
        })?;
        let target = dst.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
        }
        // Symlinks are dropped; archives of staged banners should be
        // self-contained.
    }
    Ok(())
}

/// Removes leftover staging directories from aborted runs. Returns how many
/// were deleted.
pub fn cleanup_stale(base_dir: &Path) -> io::Result<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(base_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if name.to_string_lossy().ends_with(STAGING_SUFFIX) && entry.path().is_dir() {
            fs::remove_dir_all(entry.path())?;
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write(path: &Path, contents: &[u8]) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        File::create(path).unwrap().write_all(contents).unwrap();
    }

    #[test]
    fn copies_nested_tree() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("banner");
        write(&src.join("index.html"), b"<html></html>");
        write(&src.join("img/logo.png"), b"fake");

        let staged = StagedCopy::create(&src, &[]).unwrap();
        assert!(staged.path().join("index.html").exists());
        assert!(staged.path().join("img/logo.png").exists());
    }

    #[test]
    fn skips_hidden_and_excluded_entries() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("banner");
        write(&src.join("index.html"), b"x");
        write(&src.join(".DS_Store"), b"x");
        write(&src.join("source.psd"), b"x");
        write(&src.join(".git/config"), b"x");

        let exclusions = vec!["*.psd".to_string()];
        let staged = StagedCopy::create(&src, &exclusions).unwrap();
        assert!(staged.path().join("index.html").exists());
        assert!(!staged.path().join(".DS_Store").exists());
        assert!(!staged.path().join("source.psd").exists());
        assert!(!staged.path().join(".git").exists());
    }

    #[test]
    fn drop_removes_staging_dir() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("banner");
        write(&src.join("index.html"), b"x");

        let staged_path;
        {
            let staged = StagedCopy::create(&src, &[]).unwrap();
            staged_path = staged.path().to_path_buf();
            assert!(staged_path.exists());
        }
        assert!(!staged_path.exists());
    }

    #[test]
    fn replaces_leftover_staging_dir() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("banner");
        write(&src.join("index.html"), b"x");
        let stale = dir.path().join("banner_temp");
        write(&stale.join("leftover.txt"), b"x");

        let staged = StagedCopy::create(&src, &[]).unwrap();
        assert!(!staged.path().join("leftover.txt").exists());
        assert!(staged.path().join("index.html").exists());
    }

    #[test]
    fn nested_staging_dirs_are_not_copied() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("banner");
        write(&src.join("index.html"), b"x");
        write(&src.join("other_temp/junk.txt"), b"x");

        let staged = StagedCopy::create(&src, &[]).unwrap();
        assert!(!staged.path().join("other_temp").exists());
    }

    #[test]
    fn cleanup_stale_removes_only_staging_dirs() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("banner")).unwrap();
        fs::create_dir(dir.path().join("banner_temp")).unwrap();
        fs::create_dir(dir.path().join("other_temp")).unwrap();

        let removed = cleanup_stale(dir.path()).unwrap();
        assert_eq!(removed, 2);
        assert!(dir.path().join("banner").exists());
        assert!(!dir.path().join("banner_temp").exists());
    }
}
