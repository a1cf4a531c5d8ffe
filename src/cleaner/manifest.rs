//! Manifest classification and workspace member discovery.

use crate::error::{Result, SweeperError};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the project manifest file.
pub const MANIFEST_FILE: &str = "Cargo.toml";

/// Name of the build artifact directory next to a manifest.
pub const ARTIFACT_DIR: &str = "target";

const PACKAGE_MARKER: &str = "[package]";
const WORKSPACE_MARKER: &str = "[workspace]";

/// A valid manifest found in a project directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectManifest {
    /// Directory containing the manifest.
    pub dir: PathBuf,
    pub has_package_section: bool,
    pub has_workspace_section: bool,
    /// `workspace.members` entries, in declaration order.
    pub member_paths: Vec<String>,
    /// `workspace.exclude` entries.
    pub excluded_paths: Vec<String>,
}

/// Outcome of classifying a directory's manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Manifest(ProjectManifest),
    /// Neither a package nor a workspace; nothing to clean.
    Invalid,
}

impl Classification {
    pub fn manifest(&self) -> Option<&ProjectManifest> {
        match self {
            Classification::Manifest(m) => Some(m),
            Classification::Invalid => None,
        }
    }

    pub fn is_workspace(&self) -> bool {
        self.manifest().is_some_and(|m| m.has_workspace_section)
    }
}

/// Result of checking a workspace's declared members against the filesystem.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberValidation {
    /// Member directories holding a manifest.
    pub present: Vec<PathBuf>,
    /// Declared member entries whose manifest is absent.
    pub missing: Vec<String>,
}

impl MemberValidation {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Path of the manifest file inside `dir`.
pub fn manifest_path(dir: &Path) -> PathBuf {
    dir.join(MANIFEST_FILE)
}

/// Path of the artifact directory inside `dir`.
pub fn artifact_dir(dir: &Path) -> PathBuf {
    dir.join(ARTIFACT_DIR)
}

/// Classify the manifest in `dir`.
///
/// Fails with a `NotFound` I/O error when the directory has no manifest.
pub fn classify(dir: &Path) -> Result<Classification> {
    let path = manifest_path(dir);
    let text = fs::read_to_string(&path).map_err(|e| SweeperError::io(&path, e))?;
    Ok(classify_text(dir, &text))
}

/// Classify manifest text that belongs to `dir`.
pub fn classify_text(dir: &Path, text: &str) -> Classification {
    let parsed = text.parse::<toml::Table>().ok();

    let has_package_section = has_marker(text, PACKAGE_MARKER)
        || parsed.as_ref().is_some_and(|t| t.contains_key("package"));
    let has_workspace_section = has_marker(text, WORKSPACE_MARKER)
        || parsed.as_ref().is_some_and(|t| t.contains_key("workspace"));

    if !has_package_section && !has_workspace_section {
        return Classification::Invalid;
    }

    let (member_paths, excluded_paths) = if !has_workspace_section {
        (Vec::new(), Vec::new())
    } else if let Some(workspace) = parsed
        .as_ref()
        .and_then(|t| t.get("workspace"))
        .and_then(|w| w.as_table())
    {
        (
            string_array(workspace, "members"),
            string_array(workspace, "exclude"),
        )
    } else {
        tracing::debug!(dir = %dir.display(), "Manifest is not valid TOML, scanning text");
        (
            scan_workspace_array(text, "members"),
            scan_workspace_array(text, "exclude"),
        )
    };

    Classification::Manifest(ProjectManifest {
        dir: dir.to_path_buf(),
        has_package_section,
        has_workspace_section,
        member_paths,
        excluded_paths,
    })
}

fn has_marker(text: &str, marker: &str) -> bool {
    text.lines().any(|l| l.trim_start().starts_with(marker))
}

fn string_array(table: &toml::Table, key: &str) -> Vec<String> {
    table
        .get(key)
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Textual fallback for broken manifests: collect the quoted strings of
/// `key = [ ... ]` inside the `[workspace]` block.
fn scan_workspace_array(text: &str, key: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut in_workspace = false;
    let mut in_array = false;

    for raw in text.lines() {
        let line = strip_comment(raw).trim();

        if !in_array && line.starts_with('[') {
            in_workspace = line.starts_with(WORKSPACE_MARKER);
            continue;
        }
        if !in_workspace {
            continue;
        }

        let rest = if in_array {
            line
        } else {
            match line.split_once('=') {
                Some((k, v)) if k.trim() == key => {
                    let v = v.trim_start();
                    match v.strip_prefix('[') {
                        Some(v) => {
                            in_array = true;
                            v
                        }
                        None => continue,
                    }
                }
                _ => continue,
            }
        };

        let (body, closed) = match rest.find(']') {
            Some(end) => (&rest[..end], true),
            None => (rest, false),
        };
        values.extend(quoted_strings(body));

        if closed {
            in_array = false;
            in_workspace = false;
        }
    }

    values
}

fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

fn quoted_strings(s: &str) -> Vec<String> {
    s.split('"')
        .skip(1)
        .step_by(2)
        .map(str::to_string)
        .collect()
}

fn is_glob(member: &str) -> bool {
    member.contains(['*', '?', '['])
}

impl ProjectManifest {
    /// Resolve declared members against the workspace root.
    ///
    /// All members are checked; missing ones are collected, not fatal.
    pub fn validate_members(&self) -> MemberValidation {
        let excluded: Vec<PathBuf> = self.excluded_paths.iter().map(|e| self.dir.join(e)).collect();
        let is_excluded = |p: &Path| excluded.iter().any(|e| p.starts_with(e));

        let mut result = MemberValidation::default();

        for member in &self.member_paths {
            let candidate = self.dir.join(member);

            if is_glob(member) {
                let pattern = candidate.to_string_lossy().into_owned();
                let matches = match glob::glob(&pattern) {
                    Ok(paths) => paths,
                    Err(e) => {
                        tracing::warn!(member = %member, error = %e, "Invalid member pattern");
                        result.missing.push(member.clone());
                        continue;
                    }
                };
                for path in matches.flatten() {
                    if path.is_dir()
                        && manifest_path(&path).is_file()
                        && !is_excluded(&path)
                        && !result.present.contains(&path)
                    {
                        result.present.push(path);
                    }
                }
                continue;
            }

            if is_excluded(&candidate) {
                continue;
            }
            if manifest_path(&candidate).is_file() {
                if !result.present.contains(&candidate) {
                    result.present.push(candidate);
                }
            } else {
                result.missing.push(member.clone());
            }
        }

        result
    }
}

/// Check the declared members of the workspace rooted at `dir`.
///
/// A directory that is not a workspace has no members.
pub fn validate_members(dir: &Path) -> Result<MemberValidation> {
    Ok(match classify(dir)? {
        Classification::Manifest(m) => m.validate_members(),
        Classification::Invalid => MemberValidation::default(),
    })
}

/// Nearest strict ancestor of `dir` whose manifest declares a workspace.
pub fn workspace_ancestor(dir: &Path) -> Option<PathBuf> {
    dir.ancestors()
        .skip(1)
        .filter(|a| manifest_path(a).is_file())
        .find(|a| classify(a).is_ok_and(|c| c.is_workspace()))
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_manifest(dir: &Path, content: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(manifest_path(dir), content).unwrap();
    }

    #[test]
    fn test_package_manifest() {
        let tmp = TempDir::new().unwrap();
        write_manifest(tmp.path(), "[package]\nname = \"app\"\nversion = \"0.1.0\"\n");

        let c = classify(tmp.path()).unwrap();
        let m = c.manifest().unwrap();
        assert!(m.has_package_section);
        assert!(!m.has_workspace_section);
        assert!(m.member_paths.is_empty());
        assert!(!c.is_workspace());
    }

    #[test]
    fn test_missing_manifest_is_not_found() {
        let tmp = TempDir::new().unwrap();

        match classify(tmp.path()) {
            Err(SweeperError::Io { source, .. }) => {
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound)
            }
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_manifest() {
        let c = classify_text(Path::new("/p"), "[dependencies]\nserde = \"1\"\n");
        assert_eq!(c, Classification::Invalid);

        let c = classify_text(Path::new("/p"), "");
        assert_eq!(c, Classification::Invalid);
    }

    #[test]
    fn test_workspace_members_structured() {
        let text = r#"
[workspace]
members = [
    "crates/a", # first
    "crates/b",
]
exclude = ["crates/old"]
resolver = "2"
"#;
        let c = classify_text(Path::new("/ws"), text);
        let m = c.manifest().unwrap();
        assert!(m.has_workspace_section);
        assert_eq!(m.member_paths, vec!["crates/a", "crates/b"]);
        assert_eq!(m.excluded_paths, vec!["crates/old"]);
    }

    #[test]
    fn test_workspace_members_are_not_truncated() {
        let members: Vec<String> = (0..60).map(|i| format!("    \"m{}\",", i)).collect();
        let text = format!("[workspace]\nmembers = [\n{}\n]\n", members.join("\n"));

        let c = classify_text(Path::new("/ws"), &text);
        assert_eq!(c.manifest().unwrap().member_paths.len(), 60);
    }

    #[test]
    fn test_malformed_workspace_falls_back_to_text_scan() {
        // Duplicate key makes this invalid TOML
        let text = r#"
[workspace]
members = ["a", "b",
  "c"]

[workspace]
resolver = "2"

[dependencies
"#;
        let c = classify_text(Path::new("/ws"), text);
        let m = c.manifest().unwrap();
        assert!(m.has_workspace_section);
        assert_eq!(m.member_paths, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_dotted_package_key_counts_as_package() {
        let c = classify_text(Path::new("/p"), "package.name = \"x\"\npackage.version = \"0.1.0\"\n");
        assert!(c.manifest().unwrap().has_package_section);
    }

    #[test]
    fn test_text_scan_ignores_other_sections() {
        let text = "[package]\nname = \"x\"\nmembers = [\"nope\"]\n[workspace]\nmembers = [\"yes\"] # c\n[broken";
        let c = classify_text(Path::new("/ws"), text);
        assert_eq!(c.manifest().unwrap().member_paths, vec!["yes"]);
    }

    #[test]
    fn test_validate_members_collects_all_missing() {
        let tmp = TempDir::new().unwrap();
        write_manifest(
            tmp.path(),
            "[workspace]\nmembers = [\"a\", \"b\", \"c\", \"d\"]\n",
        );
        write_manifest(&tmp.path().join("a"), "[package]\nname = \"a\"\n");
        write_manifest(&tmp.path().join("c"), "[package]\nname = \"c\"\n");
        // b exists as a directory but has no manifest
        fs::create_dir(tmp.path().join("b")).unwrap();

        let v = validate_members(tmp.path()).unwrap();
        assert!(!v.is_complete());
        assert_eq!(v.missing, vec!["b", "d"]);
        assert_eq!(v.present, vec![tmp.path().join("a"), tmp.path().join("c")]);
    }

    #[test]
    fn test_validate_members_expands_globs_and_excludes() {
        let tmp = TempDir::new().unwrap();
        write_manifest(
            tmp.path(),
            "[workspace]\nmembers = [\"crates/*\", \"tools/*\"]\nexclude = [\"crates/old\"]\n",
        );
        write_manifest(&tmp.path().join("crates/one"), "[package]\nname = \"one\"\n");
        write_manifest(&tmp.path().join("crates/two"), "[package]\nname = \"two\"\n");
        write_manifest(&tmp.path().join("crates/old"), "[package]\nname = \"old\"\n");
        fs::create_dir_all(tmp.path().join("crates/docs")).unwrap();

        let v = validate_members(tmp.path()).unwrap();
        assert!(v.is_complete());
        assert_eq!(v.present.len(), 2);
        assert!(v.present.contains(&tmp.path().join("crates/one")));
        assert!(v.present.contains(&tmp.path().join("crates/two")));
    }

    #[test]
    fn test_workspace_ancestor() {
        let tmp = TempDir::new().unwrap();
        let ws = tmp.path().join("ws");
        write_manifest(&ws, "[workspace]\nmembers = [\"member\"]\n");
        write_manifest(&ws.join("member"), "[package]\nname = \"member\"\n");
        write_manifest(&tmp.path().join("solo"), "[package]\nname = \"solo\"\n");

        assert_eq!(workspace_ancestor(&ws.join("member")), Some(ws.clone()));
        assert_eq!(workspace_ancestor(&tmp.path().join("solo")), None);
        // The workspace root is not its own ancestor
        assert_eq!(workspace_ancestor(&ws), None);
    }
}
