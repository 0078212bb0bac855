//! Output file naming and staging
//!
//! Artifacts are named `<prefix>_<YYYYMMDDHHMMSS>.<ext>`. Images are first
//! written to a hidden temp file next to the destination and only renamed
//! into place once rendering has succeeded.

use chrono::{DateTime, Local, TimeZone};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::constants::render::TIMESTAMP_FORMAT;
use crate::types::{Result, SchemaGenError};

pub fn timestamped_filename<Tz>(prefix: &str, ext: &str, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("{}_{}.{}", prefix, now.format(TIMESTAMP_FORMAT), ext)
}

/// `dir/<prefix>_<local timestamp>.<ext>`
pub fn timestamped_path(dir: &Path, prefix: &str, ext: &str) -> PathBuf {
    dir.join(timestamped_filename(prefix, ext, &Local::now()))
}

/// Create a temp file in the destination's directory so the final rename
/// stays on one filesystem.
pub(crate) fn staging_file(output: &Path) -> Result<NamedTempFile> {
    let dir = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let suffix = output
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    Ok(tempfile::Builder::new()
        .prefix(".schemagen-")
        .suffix(&suffix)
        .tempfile_in(dir)?)
}

/// Write `bytes` to `output` through a staging file
pub(crate) fn write_staged(output: &Path, bytes: &[u8]) -> Result<()> {
    let mut staged = staging_file(output)?;
    staged.write_all(bytes)?;
    staged.flush()?;
    persist(staged, output)
}

/// Move a finished staging file to its final path
pub(crate) fn persist(staged: NamedTempFile, output: &Path) -> Result<()> {
    staged.persist(output).map_err(|e| {
        SchemaGenError::Render(format!(
            "Failed to move rendered image to {}: {}",
            output.display(),
            e.error
        ))
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use regex::Regex;

    #[test]
    fn test_filename_embeds_timestamp() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(
            timestamped_filename("schema", "png", &now),
            "schema_20240309070501.png"
        );
    }

    #[test]
    fn test_local_path_pattern() {
        let path = timestamped_path(Path::new("out"), "schema", "png");
        assert_eq!(path.parent(), Some(Path::new("out")));

        let name = path.file_name().unwrap().to_string_lossy();
        let pattern = Regex::new(r"^schema_\d{14}\.png$").unwrap();
        assert!(pattern.is_match(&name), "unexpected name: {}", name);
    }

    #[test]
    fn test_staged_file_persists_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("schema_20240101000000.png");

        let mut staged = staging_file(&output).unwrap();
        assert_eq!(staged.path().parent(), Some(dir.path()));
        staged.write_all(b"image").unwrap();
        assert!(!output.exists());

        persist(staged, &output).unwrap();
        assert_eq!(std::fs::read(&output).unwrap(), b"image");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_staged() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("schema.puml");
        write_staged(&output, b"@startuml\n@enduml").unwrap();
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "@startuml\n@enduml");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_dropped_staging_file_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("schema.svg");
        drop(staging_file(&output).unwrap());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
