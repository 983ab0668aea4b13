use std::path::{Path, PathBuf};

use super::{Mirror, MirrorError, MirrorSource};
use crate::platform::RepoRecord;

/// What happened to a repository's wiki.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WikiOutcome {
    /// The repository has no wiki enabled.
    Disabled,
    /// The wiki was mirrored into its own directory.
    Mirrored(PathBuf),
    /// The wiki is enabled but has no content.
    Empty,
}

/// Result of mirroring one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    /// Directory holding the code mirror (`<target>/<repo>`).
    pub code_dir: PathBuf,
    /// Wiki outcome; a mirrored wiki lives in `<target>/<repo>.wiki`.
    pub wiki: WikiOutcome,
}

/// Mirror a repository's code and, if enabled, its wiki into `target_dir`.
///
/// The code mirror is mandatory: any failure is returned. The wiki is
/// mirrored into a sibling directory distinct from the code mirror. A wiki
/// that the platform reports as not found (enabled but never written to) is
/// benign and yields [`WikiOutcome::Empty`]; every other wiki failure is
/// returned like a code failure.
pub async fn fetch_repository<M: Mirror + ?Sized>(
    mirror: &M,
    org: &str,
    repo: &RepoRecord,
    target_dir: &Path,
) -> Result<FetchResult, MirrorError> {
    let code_dir = target_dir.join(&repo.name);
    mirror
        .mirror(&MirrorSource::code(org, &repo.name), &code_dir)
        .await?;

    if !repo.has_wiki {
        return Ok(FetchResult {
            code_dir,
            wiki: WikiOutcome::Disabled,
        });
    }

    let wiki_dir = target_dir.join(format!("{}.wiki", repo.name));
    let wiki = match mirror
        .mirror(&MirrorSource::wiki(org, &repo.name), &wiki_dir)
        .await
    {
        Ok(()) => WikiOutcome::Mirrored(wiki_dir),
        Err(e) if e.is_not_found() => {
            tracing::debug!(repo = %repo.name, "Wiki enabled but empty");
            WikiOutcome::Empty
        }
        Err(e) => return Err(e),
    };

    Ok(FetchResult { code_dir, wiki })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::mirror::RepoPart;

    /// Records every call and fails the wiki with a configurable error.
    struct RecordingMirror {
        calls: Mutex<Vec<(RepoPart, PathBuf)>>,
        wiki_error: fn(&str) -> Option<MirrorError>,
    }

    impl RecordingMirror {
        fn new(wiki_error: fn(&str) -> Option<MirrorError>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                wiki_error,
            }
        }
    }

    #[async_trait]
    impl Mirror for RecordingMirror {
        async fn mirror(
            &self,
            source: &MirrorSource<'_>,
            target: &Path,
        ) -> Result<(), MirrorError> {
            self.calls
                .lock()
                .unwrap()
                .push((source.part, target.to_path_buf()));
            if source.part == RepoPart::Wiki
                && let Some(err) = (self.wiki_error)(&source.to_string())
            {
                return Err(err);
            }
            std::fs::create_dir_all(target).map_err(|source| MirrorError::Spawn { source })?;
            Ok(())
        }
    }

    fn repo(has_wiki: bool) -> RepoRecord {
        let record = json!({ "name": "widgets", "id": 7, "has_wiki": has_wiki });
        RepoRecord::from_record(record.as_object().unwrap().clone()).unwrap()
    }

    #[tokio::test]
    async fn test_mirrors_code_only_without_wiki() {
        let dir = tempfile::TempDir::new().unwrap();
        let mirror = RecordingMirror::new(|_| None);

        let result = fetch_repository(&mirror, "acme", &repo(false), dir.path())
            .await
            .unwrap();

        assert_eq!(result.code_dir, dir.path().join("widgets"));
        assert_eq!(result.wiki, WikiOutcome::Disabled);
        assert_eq!(mirror.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_wiki_is_mirrored_into_separate_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let mirror = RecordingMirror::new(|_| None);

        let result = fetch_repository(&mirror, "acme", &repo(true), dir.path())
            .await
            .unwrap();

        let wiki_dir = dir.path().join("widgets.wiki");
        assert_eq!(result.wiki, WikiOutcome::Mirrored(wiki_dir.clone()));
        assert_ne!(result.code_dir, wiki_dir);
        assert!(!wiki_dir.starts_with(&result.code_dir));

        let calls = mirror.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![
                (RepoPart::Code, dir.path().join("widgets")),
                (RepoPart::Wiki, wiki_dir.clone()),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_wiki_is_benign() {
        let dir = tempfile::TempDir::new().unwrap();
        let mirror = RecordingMirror::new(|remote| {
            Some(MirrorError::NotFound {
                remote: remote.to_string(),
            })
        });

        let result = fetch_repository(&mirror, "acme", &repo(true), dir.path())
            .await
            .unwrap();

        assert_eq!(result.wiki, WikiOutcome::Empty);
    }

    #[tokio::test]
    async fn test_other_wiki_failures_propagate() {
        let dir = tempfile::TempDir::new().unwrap();
        let mirror = RecordingMirror::new(|remote| {
            Some(MirrorError::Failed {
                remote: remote.to_string(),
                status: "exit status: 128".to_string(),
                stderr: "fatal: early EOF".to_string(),
            })
        });

        let err = fetch_repository(&mirror, "acme", &repo(true), dir.path())
            .await
            .unwrap_err();

        assert!(matches!(err, MirrorError::Failed { .. }));
    }
}
