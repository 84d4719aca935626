use crate::errors::{AppError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;
use walkdir::WalkDir;

/// A regular file found directly inside the backup directory.
#[derive(Debug, Clone)]
pub struct LocalFile {
    pub name: String,
    pub path: PathBuf,
    /// Modification time in unix seconds.
    pub modified: f64,
}

/// Lists the regular files directly inside `dir`, sorted by file name.
///
/// Links are classified by what they point at, so a dangling link is skipped
/// like any other non-regular entry. File names must be valid UTF-8 since they
/// become part of an object key.
pub fn list_regular_files(dir: &Path) -> Result<Vec<LocalFile>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(std::io::Error::from)?;
        let path = entry.path();
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if entry.path_is_symlink() => {
                debug!("Skipping unresolvable link {}: {}", path.display(), e);
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        if !metadata.is_file() {
            debug!("Skipping non-regular entry {}", path.display());
            continue;
        }

        let name = entry.file_name().to_str().ok_or_else(|| {
            AppError::InvalidInput(format!("file name is not valid UTF-8: {}", path.display()))
        })?;

        files.push(LocalFile {
            name: name.to_string(),
            path: path.to_path_buf(),
            modified: unix_seconds(metadata.modified()?),
        });
    }

    Ok(files)
}

/// Converts a `SystemTime` to float unix seconds; times before the epoch are negative.
pub fn unix_seconds(time: SystemTime) -> f64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => after.as_secs_f64(),
        Err(before) => -before.duration().as_secs_f64(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;

    #[test]
    fn test_lists_only_regular_files_in_name_order() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("b.sql"), b"b")?;
        fs::write(dir.path().join("a.sql"), b"a")?;
        fs::write(dir.path().join("C.tar.gz"), b"c")?;
        fs::create_dir(dir.path().join("nested"))?;
        fs::write(dir.path().join("nested").join("inner.sql"), b"x")?;

        let names: Vec<String> = list_regular_files(dir.path())?
            .into_iter()
            .map(|f| f.name)
            .collect();

        assert_eq!(names, vec!["C.tar.gz", "a.sql", "b.sql"]);
        Ok(())
    }

    #[test]
    fn test_reports_modification_time() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("dump.sql");
        let file = File::create(&path)?;
        file.set_modified(UNIX_EPOCH + Duration::from_secs(1_700_000_000))?;
        drop(file);

        let files = list_regular_files(dir.path())?;
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].modified, 1_700_000_000.0);
        assert_eq!(files[0].path, path);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_links_are_classified_by_target() -> anyhow::Result<()> {
        use std::os::unix::fs::symlink;

        let dir = tempfile::tempdir()?;
        let outside = tempfile::tempdir()?;
        let target = outside.path().join("real.sql");
        fs::write(&target, b"dump")?;
        symlink(&target, dir.path().join("linked.sql"))?;
        symlink(dir.path().join("gone.sql"), dir.path().join("dangling.sql"))?;
        symlink(outside.path(), dir.path().join("linked_dir"))?;
        fs::write(dir.path().join("plain.sql"), b"plain")?;

        let names: Vec<String> = list_regular_files(dir.path())?
            .into_iter()
            .map(|f| f.name)
            .collect();

        assert_eq!(names, vec!["linked.sql", "plain.sql"]);
        Ok(())
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_file_name_is_rejected() -> anyhow::Result<()> {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join(OsStr::from_bytes(b"\xff.sql")), b"first")?;
        fs::write(dir.path().join(OsStr::from_bytes(b"\xfe.sql")), b"second")?;

        let result = list_regular_files(dir.path());

        assert!(matches!(result, Err(AppError::InvalidInput(_))));
        Ok(())
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        assert!(list_regular_files(Path::new("/nonexistent/backups")).is_err());
    }

    #[test]
    fn test_unix_seconds_before_epoch_is_negative() {
        let before = UNIX_EPOCH - Duration::from_millis(1500);
        assert_eq!(unix_seconds(before), -1.5);
    }
}
