//! Candidate enumeration: `<prefix>-*` entries in each search directory.

use std::io::ErrorKind;
use std::path::Path;

use futures::future::try_join_all;
use tracing::warn;

use crate::error::{DiscoveryError, Result};
use crate::paths::SearchPathSet;

/// Entry names in `dir` starting with `<prefix>-`, sorted. Missing directories match nothing.
pub fn match_dir(dir: &Path, prefix: &str) -> Result<Vec<String>> {
    let pattern = format!("{}-", prefix);
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => return Err(enumerate_error(dir, source)),
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| enumerate_error(dir, source))?;
        if let Some(name) = matching_name(dir, &entry.file_name(), &pattern) {
            names.push(name);
        }
    }

    names.sort();
    Ok(names)
}

/// Async form of [`match_dir`].
pub async fn match_dir_async(dir: &Path, prefix: &str) -> Result<Vec<String>> {
    let pattern = format!("{}-", prefix);
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => return Err(enumerate_error(dir, source)),
    };

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|source| enumerate_error(dir, source))?
    {
        if let Some(name) = matching_name(dir, &entry.file_name(), &pattern) {
            names.push(name);
        }
    }

    names.sort();
    Ok(names)
}

/// Candidates across all directories, deduplicated by name in directory order.
pub fn enumerate_candidates(paths: &SearchPathSet, prefix: &str) -> Result<Vec<String>> {
    let matches = paths
        .iter()
        .map(|dir| match_dir(dir, prefix))
        .collect::<Result<Vec<_>>>()?;
    Ok(compose(matches))
}

/// Lists every directory concurrently, then merges in directory order.
pub async fn enumerate_candidates_async(
    paths: &SearchPathSet,
    prefix: &str,
) -> Result<Vec<String>> {
    let matches = try_join_all(paths.iter().map(|dir| match_dir_async(dir, prefix))).await?;
    Ok(compose(matches))
}

fn compose(matches: Vec<Vec<String>>) -> Vec<String> {
    let mut composed: Vec<String> = Vec::new();
    for name in matches.into_iter().flatten() {
        if !composed.contains(&name) {
            composed.push(name);
        }
    }
    composed
}

fn matching_name(dir: &Path, file_name: &std::ffi::OsStr, pattern: &str) -> Option<String> {
    let Some(name) = file_name.to_str() else {
        warn!(dir = ?dir, entry = ?file_name, "Skipping non UTF-8 directory entry");
        return None;
    };
    name.starts_with(pattern).then(|| name.to_string())
}

fn enumerate_error(dir: &Path, source: std::io::Error) -> DiscoveryError {
    DiscoveryError::Enumerate {
        dir: dir.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch_plugin(dir: &Path, name: &str) {
        std::fs::create_dir_all(dir.join(name)).unwrap();
    }

    #[test]
    fn test_match_dir_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        touch_plugin(dir.path(), "sx-zebra");
        touch_plugin(dir.path(), "sx-apple");
        touch_plugin(dir.path(), "sxother");
        touch_plugin(dir.path(), "other-sx-thing");
        std::fs::write(dir.path().join("sx-file.js"), b"").unwrap();

        let names = match_dir(dir.path(), "sx").unwrap();
        assert_eq!(names, vec!["sx-apple", "sx-file.js", "sx-zebra"]);
    }

    #[test]
    fn test_missing_dir_matches_nothing() {
        let names = match_dir(Path::new("/nonexistent/plugscout"), "sx").unwrap();
        assert!(names.is_empty());
    }

    #[test]
    fn test_dedup_across_directories() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        touch_plugin(first.path(), "test-prefix-bacon-maker");
        touch_plugin(second.path(), "test-prefix-bacon-maker");
        touch_plugin(second.path(), "test-prefix-cake-maker");
        touch_plugin(first.path(), "test-prefix-waffle-maker");

        let paths = SearchPathSet::new([second.path(), first.path()]);
        let names = enumerate_candidates(&paths, "test-prefix").unwrap();
        assert_eq!(
            names,
            vec![
                "test-prefix-bacon-maker",
                "test-prefix-cake-maker",
                "test-prefix-waffle-maker"
            ]
        );
    }

    #[tokio::test]
    async fn test_async_matches_sync_order() {
        let dirs: Vec<_> = (0..4).map(|_| tempfile::tempdir().unwrap()).collect();
        for (i, dir) in dirs.iter().enumerate() {
            for j in 0..5 {
                touch_plugin(dir.path(), &format!("sx-plugin-{}", (i * 3 + j) % 9));
            }
        }

        let paths = SearchPathSet::new(dirs.iter().map(|d| d.path().to_path_buf()));
        let sync = enumerate_candidates(&paths, "sx").unwrap();
        let async_names = enumerate_candidates_async(&paths, "sx").await.unwrap();
        assert_eq!(sync, async_names);
        assert_eq!(sync.len(), 9);
    }
}
