//! In-memory platform and mirror fakes shared by the integration tests.

#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs::File;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bzip2::read::BzDecoder;
use orgbackup::mirror::{MirrorSource, RepoPart};
use orgbackup::platform::{self, PlatformError, PlatformSource, Record, Visibility};
use orgbackup::{BackupEvent, EventCallback, Mirror, MirrorError};
use serde_json::{Value, json};

pub const ORG: &str = "acme";

pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

pub fn repo_record(name: &str, id: u64, has_wiki: bool, has_issues: bool) -> Record {
    record(json!({
        "name": name,
        "id": id,
        "has_wiki": has_wiki,
        "has_issues": has_issues,
        "full_name": format!("{ORG}/{name}"),
    }))
}

/// A fake organization. Every API call is counted.
#[derive(Default)]
pub struct FakeSource {
    pub members: Vec<Record>,
    pub teams: Vec<Record>,
    pub team_members: HashMap<String, Vec<Record>>,
    pub public_repos: Vec<Record>,
    pub private_repos: Vec<Record>,
    pub issues: HashMap<String, Vec<Record>>,
    pub issue_comments: HashMap<(String, u64), Vec<Record>>,
    pub pulls: HashMap<String, Vec<Record>>,
    pub fail_members: bool,
    pub fail_listing: HashSet<Visibility>,
    pub calls: AtomicUsize,
    pub repo_listings: AtomicUsize,
}

impl FakeSource {
    /// Two members, one team, and no repositories.
    pub fn with_roster() -> Self {
        let mut team_members = HashMap::new();
        team_members.insert(
            "core".to_string(),
            vec![record(json!({ "login": "alice", "id": 1 }))],
        );
        Self {
            members: vec![
                record(json!({ "login": "alice", "id": 1 })),
                record(json!({ "login": "bob", "id": 2 })),
            ],
            teams: vec![record(json!({ "name": "Core Team", "slug": "core", "id": 10 }))],
            team_members,
            ..Self::default()
        }
    }

    /// API calls made, excluding repository listings.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl PlatformSource for FakeSource {
    async fn list_members(&self, _org: &str) -> platform::Result<Vec<Record>> {
        self.hit();
        if self.fail_members {
            return Err(PlatformError::api("502 Bad Gateway"));
        }
        Ok(self.members.clone())
    }

    async fn get_user(&self, login: &str) -> platform::Result<Record> {
        self.hit();
        Ok(record(json!({ "login": login, "name": login.to_uppercase() })))
    }

    async fn list_teams(&self, _org: &str) -> platform::Result<Vec<Record>> {
        self.hit();
        Ok(self.teams.clone())
    }

    async fn list_team_members(
        &self,
        _org: &str,
        team_slug: &str,
    ) -> platform::Result<Vec<Record>> {
        self.hit();
        Ok(self.team_members.get(team_slug).cloned().unwrap_or_default())
    }

    async fn list_repos(
        &self,
        _org: &str,
        visibility: Visibility,
    ) -> platform::Result<Vec<Record>> {
        self.repo_listings.fetch_add(1, Ordering::SeqCst);
        if self.fail_listing.contains(&visibility) {
            return Err(PlatformError::api("500 Internal Server Error"));
        }
        Ok(match visibility {
            Visibility::Public => self.public_repos.clone(),
            Visibility::Private => self.private_repos.clone(),
        })
    }

    async fn list_repo_teams(&self, _org: &str, _repo: &str) -> platform::Result<Vec<Record>> {
        self.hit();
        Ok(vec![record(json!({ "name": "Core Team", "permission": "push" }))])
    }

    async fn list_issues(&self, _org: &str, repo: &str) -> platform::Result<Vec<Record>> {
        self.hit();
        Ok(self.issues.get(repo).cloned().unwrap_or_default())
    }

    async fn list_issue_comments(
        &self,
        _org: &str,
        repo: &str,
        number: u64,
    ) -> platform::Result<Vec<Record>> {
        self.hit();
        Ok(self
            .issue_comments
            .get(&(repo.to_string(), number))
            .cloned()
            .unwrap_or_default())
    }

    async fn list_pulls(&self, _org: &str, repo: &str) -> platform::Result<Vec<Record>> {
        self.hit();
        Ok(self.pulls.get(repo).cloned().unwrap_or_default())
    }

    async fn list_pull_comments(
        &self,
        _org: &str,
        _repo: &str,
        _number: u64,
    ) -> platform::Result<Vec<Record>> {
        self.hit();
        Ok(Vec::new())
    }
}

/// A mirror that writes a minimal bare repository, optionally failing.
#[derive(Default)]
pub struct FakeMirror {
    /// Code mirrors that fail before one succeeds (`usize::MAX` never succeeds).
    pub code_failures: AtomicUsize,
    /// Repositories whose wiki is enabled but empty.
    pub empty_wikis: HashSet<String>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeMirror {
    pub fn failing(times: usize) -> Self {
        Self {
            code_failures: AtomicUsize::new(times),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Mirror for FakeMirror {
    async fn mirror(&self, source: &MirrorSource<'_>, target: &Path) -> Result<(), MirrorError> {
        self.calls.lock().unwrap().push(source.to_string());

        match source.part {
            RepoPart::Code => {
                let remaining = self.code_failures.load(Ordering::SeqCst);
                if remaining > 0 {
                    if remaining != usize::MAX {
                        self.code_failures.fetch_sub(1, Ordering::SeqCst);
                    }
                    // Leave a partial clone behind, as an interrupted git would.
                    std::fs::create_dir_all(target)
                        .map_err(|source| MirrorError::Spawn { source })?;
                    return Err(MirrorError::Failed {
                        remote: source.to_string(),
                        status: "exit status: 128".to_string(),
                        stderr: "fatal: early EOF".to_string(),
                    });
                }
            }
            RepoPart::Wiki if self.empty_wikis.contains(source.repo) => {
                return Err(MirrorError::NotFound {
                    remote: source.to_string(),
                });
            }
            RepoPart::Wiki => {}
        }

        std::fs::create_dir_all(target.join("refs"))
            .map_err(|source| MirrorError::Spawn { source })?;
        std::fs::write(target.join("HEAD"), b"ref: refs/heads/main\n")
            .map_err(|source| MirrorError::Spawn { source })?;
        Ok(())
    }
}

/// Collects every event of a session.
pub fn recorder() -> (EventCallback, Arc<Mutex<Vec<BackupEvent>>>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let capture = Arc::clone(&events);
    let callback: EventCallback = Box::new(move |event| capture.lock().unwrap().push(event));
    (callback, events)
}

/// Entry paths inside a `.tar.bz2` archive, without trailing slashes.
pub fn archive_entries(path: &Path) -> BTreeSet<String> {
    let mut archive = tar::Archive::new(BzDecoder::new(File::open(path).unwrap()));
    archive
        .entries()
        .unwrap()
        .map(|entry| {
            let entry = entry.unwrap();
            entry
                .path()
                .unwrap()
                .to_string_lossy()
                .trim_end_matches('/')
                .to_string()
        })
        .collect()
}

/// Contents of one file inside a `.tar.bz2` archive.
pub fn archive_file(path: &Path, name: &str) -> Option<Vec<u8>> {
    use std::io::Read;

    let mut archive = tar::Archive::new(BzDecoder::new(File::open(path).unwrap()));
    for entry in archive.entries().unwrap() {
        let mut entry = entry.unwrap();
        if entry.path().unwrap().to_string_lossy() == name {
            let mut buf = Vec::new();
            entry.read_to_end(&mut buf).unwrap();
            return Some(buf);
        }
    }
    None
}

/// Staging directories left behind in `destdir`.
pub fn leftover_staging(destdir: &Path) -> Vec<String> {
    std::fs::read_dir(destdir)
        .map(|entries| {
            entries
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .filter(|name| name.starts_with(orgbackup::staging::STAGING_PREFIX))
                .collect()
        })
        .unwrap_or_default()
}
