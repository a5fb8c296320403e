//! Episode directory loading.

use super::document::parse_document;
use super::models::EpisodeTranscript;
use crate::error::{ClipcastError, Result};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use walkdir::WalkDir;

/// Files that live next to episodes but are not episodes.
const SKIP_FILES: &[&str] = &["_template.md"];

/// Find every episode markdown file under `dir`, sorted by path.
pub fn discover_episode_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ClipcastError::InvalidInput(format!(
            "Episodes directory not found: {}",
            dir.display()
        )));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| !SKIP_FILES.contains(&n))
        })
        .collect();

    files.sort();
    Ok(files)
}

/// Read and parse one episode file.
pub fn load_transcript(path: &Path) -> Result<EpisodeTranscript> {
    let content = std::fs::read_to_string(path)?;
    let fallback_id = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("episode")
        .to_string();

    Ok(parse_document(
        &content,
        &path.display().to_string(),
        &fallback_id,
    )?)
}

/// Load every episode transcript in a directory.
///
/// Fails on the first unreadable or malformed file, naming it.
#[instrument]
pub fn load_transcripts(dir: &Path) -> Result<Vec<(PathBuf, EpisodeTranscript)>> {
    let files = discover_episode_files(dir)?;

    if files.is_empty() {
        return Err(ClipcastError::InvalidInput(format!(
            "No .md files found in {}",
            dir.display()
        )));
    }

    info!("Found {} episode file(s) in {}", files.len(), dir.display());

    files
        .into_iter()
        .map(|path| match load_transcript(&path) {
            Ok(transcript) => Ok((path, transcript)),
            Err(e) => Err(ClipcastError::EpisodeLoad {
                path,
                source: Box::new(e),
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SAMPLE_EPISODE;

    #[test]
    fn test_discover_skips_template_and_other_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("season8")).unwrap();
        std::fs::write(dir.path().join("b.md"), SAMPLE_EPISODE).unwrap();
        std::fs::write(dir.path().join("season8").join("a.md"), SAMPLE_EPISODE).unwrap();
        std::fs::write(dir.path().join("_template.md"), "---\n---\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not an episode").unwrap();

        let files = discover_episode_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            names,
            vec![PathBuf::from("b.md"), PathBuf::from("season8").join("a.md")]
        );
    }

    #[test]
    fn test_missing_directory() {
        let err = discover_episode_files(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, ClipcastError::InvalidInput(_)));
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_transcripts(dir.path()).is_err());
    }

    #[test]
    fn test_load_fails_fast_with_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("good.md"), SAMPLE_EPISODE).unwrap();
        std::fs::write(dir.path().join("broken.md"), "no frontmatter here").unwrap();

        let err = load_transcripts(dir.path()).unwrap_err();
        match err {
            ClipcastError::EpisodeLoad { path, .. } => {
                assert!(path.ends_with("broken.md"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_uses_file_stem_as_fallback_id() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("ep1.md"),
            "---\ntitle: First\ntranscript:\n  - line: hello\n    sec: 0\n---\n",
        )
        .unwrap();

        let loaded = load_transcripts(dir.path()).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].1.id, "ep1");
    }
}
