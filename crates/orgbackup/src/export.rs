//! Metadata export: platform records serialized as deterministic JSON.
//!
//! Each exporter pulls one category of records from a [`PlatformSource`] and
//! writes JSON documents into a staging directory. Documents use sorted keys
//! and four-space indentation, so unchanged upstream data always produces
//! byte-identical files.

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::platform::{PlatformError, PlatformSource, Record, RepoRecord};

/// Indentation of exported documents.
const INDENT: &[u8] = b"    ";

/// Errors that can occur while exporting metadata.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error("failed to serialize {}: {source}", .path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Recursively rebuild objects with their keys in sorted order.
///
/// `serde_json::Map` is only sorted when the `preserve_order` feature is off
/// everywhere in the dependency graph; this makes the ordering explicit.
pub fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, canonicalize(v)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Serialize a value as sorted, four-space indented JSON.
pub fn to_json_bytes(value: Value) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    canonicalize(value).serialize(&mut ser)?;
    Ok(buf)
}

/// Write a JSON document into `dir` as `<stem>.json`.
pub async fn write_json(dir: &Path, stem: &str, value: Value) -> Result<PathBuf, ExportError> {
    let path = dir.join(format!("{}.json", file_stem(stem)));
    let bytes = to_json_bytes(value).map_err(|source| ExportError::Serialize {
        path: path.clone(),
        source,
    })?;
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|source| ExportError::Write {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}

/// Make a platform-provided name safe to use as a single file name.
pub fn file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
        .collect();
    match stem.as_str() {
        "" | "." | ".." => format!("_{stem}"),
        _ => stem,
    }
}

fn records(items: Vec<Record>) -> Value {
    Value::Array(items.into_iter().map(Value::Object).collect())
}

fn required_str<'a>(
    record: &'a Record,
    kind: &'static str,
    field: &'static str,
) -> Result<&'a str, PlatformError> {
    record
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| PlatformError::invalid_record(kind, field))
}

fn required_u64(
    record: &Record,
    kind: &'static str,
    field: &'static str,
) -> Result<u64, PlatformError> {
    record
        .get(field)
        .and_then(Value::as_u64)
        .ok_or_else(|| PlatformError::invalid_record(kind, field))
}

/// One `<login>.json` per member, containing the member's full profile.
///
/// Returns the number of members exported.
pub async fn export_members<S: PlatformSource + ?Sized>(
    source: &S,
    org: &str,
    dir: &Path,
) -> Result<usize, ExportError> {
    let members = source.list_members(org).await?;
    for member in &members {
        let login = required_str(member, "member", "login")?;
        let profile = source.get_user(login).await?;
        write_json(dir, login, Value::Object(profile)).await?;
    }
    Ok(members.len())
}

/// One `<team name>.json` per team, containing the team's member records.
///
/// Returns the number of teams exported.
pub async fn export_teams<S: PlatformSource + ?Sized>(
    source: &S,
    org: &str,
    dir: &Path,
) -> Result<usize, ExportError> {
    let teams = source.list_teams(org).await?;
    for team in &teams {
        let name = required_str(team, "team", "name")?;
        let slug = team.get("slug").and_then(Value::as_str).unwrap_or(name);
        let members = source.list_team_members(org, slug).await?;
        write_json(dir, name, records(members)).await?;
    }
    Ok(teams.len())
}

/// `<repo>.json` with the full repository record.
pub async fn export_repo_details(repo: &RepoRecord, dir: &Path) -> Result<(), ExportError> {
    write_json(dir, &repo.name, Value::Object(repo.record.clone())).await?;
    Ok(())
}

/// `<repo>-collaborators.json` with the teams that have access to the repository.
pub async fn export_collaborators<S: PlatformSource + ?Sized>(
    source: &S,
    org: &str,
    repo: &str,
    dir: &Path,
) -> Result<(), ExportError> {
    let teams = source.list_repo_teams(org, repo).await?;
    write_json(dir, &format!("{repo}-collaborators"), records(teams)).await?;
    Ok(())
}

/// `<repo>-issues.json` and `<repo>-issues-comments.json`.
///
/// Both files are always written, as empty arrays when there are no issues.
/// Comments are flattened in issue order, then comment order.
pub async fn export_issues<S: PlatformSource + ?Sized>(
    source: &S,
    org: &str,
    repo: &str,
    dir: &Path,
) -> Result<(), ExportError> {
    let issues = source.list_issues(org, repo).await?;
    let mut comments = Vec::new();
    for issue in &issues {
        let number = required_u64(issue, "issue", "number")?;
        comments.extend(source.list_issue_comments(org, repo, number).await?);
    }

    write_json(dir, &format!("{repo}-issues"), records(issues)).await?;
    write_json(dir, &format!("{repo}-issues-comments"), records(comments)).await?;
    Ok(())
}

/// `<repo>-pulls.json` and `<repo>-pulls-comments.json`, symmetric to issues.
pub async fn export_pulls<S: PlatformSource + ?Sized>(
    source: &S,
    org: &str,
    repo: &str,
    dir: &Path,
) -> Result<(), ExportError> {
    let pulls = source.list_pulls(org, repo).await?;
    let mut comments = Vec::new();
    for pull in &pulls {
        let number = required_u64(pull, "pull request", "number")?;
        comments.extend(source.list_pull_comments(org, repo, number).await?);
    }

    write_json(dir, &format!("{repo}-pulls"), records(pulls)).await?;
    write_json(dir, &format!("{repo}-pulls-comments"), records(comments)).await?;
    Ok(())
}
