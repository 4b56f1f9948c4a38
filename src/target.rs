// src/target.rs
use std::path::Path;

use tracing::debug;

use crate::error::{ScanError, ScanResult};

/// Load the target list from a plain-text file.
///
/// One address per line; lines are trimmed, blank lines and lines starting
/// with `#` are skipped. Addresses are treated as opaque literal strings,
/// no well-formedness validation happens here. Duplicates are kept and
/// scanned redundantly.
pub fn load_targets(path: &Path) -> ScanResult<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| ScanError::TargetList {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let targets: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect();

    debug!("Loaded {} targets from {}", targets.len(), path.display());
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_skips_comments_and_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# onion services to scan").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  http://example1.onion  ").unwrap();
        writeln!(file, "#http://commented.onion").unwrap();
        writeln!(file, "http://example2.onion").unwrap();

        let targets = load_targets(file.path()).unwrap();
        assert_eq!(
            targets,
            vec!["http://example1.onion", "http://example2.onion"]
        );
    }

    #[test]
    fn test_keeps_duplicates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "http://dup.onion").unwrap();
        writeln!(file, "http://dup.onion").unwrap();

        let targets = load_targets(file.path()).unwrap();
        assert_eq!(targets.len(), 2);
    }

    #[test]
    fn test_missing_file_is_target_list_error() {
        let err = load_targets(Path::new("/nonexistent/targets.txt")).unwrap_err();
        assert!(matches!(err, ScanError::TargetList { .. }));
    }

    #[test]
    fn test_empty_file_yields_empty_list() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let targets = load_targets(file.path()).unwrap();
        assert!(targets.is_empty());
    }
}
