use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GitHubRelease {
    pub tag_name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assets: Vec<GitHubAsset>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GitHubAsset {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
    /// API endpoint serving the raw asset bytes
    pub url: String,
    #[serde(default)]
    pub browser_download_url: Option<String>,
}

/// The selected release/asset pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub release: GitHubRelease,
    pub asset: GitHubAsset,
    /// `release.tag_name` with the tag prefix stripped from its start
    pub resolved_version: String,
}

/// An `owner/name` repository slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

impl FromStr for Repository {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (owner, name) = s
            .split_once('/')
            .ok_or_else(|| format!("repository '{}' is not of the form 'owner/name'", s))?;

        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(format!(
                "repository '{}' is not of the form 'owner/name'",
                s
            ));
        }

        Ok(Repository {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSelector {
    Latest,
    Exact(String),
}

impl VersionSelector {
    pub fn parse(version: &str) -> Self {
        match version {
            "" | "latest" => VersionSelector::Latest,
            v => VersionSelector::Exact(v.to_string()),
        }
    }

    /// Whether a release tag qualifies under this selector and tag prefix.
    pub fn accepts(&self, tag_name: &str, prefix: &str) -> bool {
        match self {
            VersionSelector::Latest => tag_name.starts_with(prefix),
            VersionSelector::Exact(version) => tag_name
                .strip_prefix(prefix)
                .is_some_and(|rest| rest == version),
        }
    }
}

/// Permission bits for the written file, parsed from an octal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMode(u32);

impl FileMode {
    pub fn bits(self) -> u32 {
        self.0
    }
}

impl Default for FileMode {
    fn default() -> Self {
        FileMode(0o644)
    }
}

impl FromStr for FileMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix("0o").unwrap_or(trimmed);

        let bits = u32::from_str_radix(digits, 8)
            .map_err(|_| format!("mode '{}' is not a valid octal number", s))?;

        if bits > 0o7777 {
            return Err(format!("mode '{}' is out of range", s));
        }

        Ok(FileMode(bits))
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:o}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_parse() {
        let repo: Repository = "octo/tool".parse().unwrap();
        assert_eq!(repo.owner, "octo");
        assert_eq!(repo.name, "tool");
        assert_eq!(repo.to_string(), "octo/tool");

        assert!("octo".parse::<Repository>().is_err());
        assert!("/tool".parse::<Repository>().is_err());
        assert!("octo/".parse::<Repository>().is_err());
        assert!("octo/tool/extra".parse::<Repository>().is_err());
    }

    #[test]
    fn test_version_selector_accepts() {
        let latest = VersionSelector::parse("latest");
        assert!(latest.accepts("v1.0.0", "v"));
        assert!(!latest.accepts("1.0.0", "v"));
        assert!(latest.accepts("anything", ""));

        let exact = VersionSelector::parse("1.2.3");
        assert!(exact.accepts("v1.2.3", "v"));
        assert!(!exact.accepts("v1.2.30", "v"));
        assert!(!exact.accepts("v1.2", "v"));
        assert!(!exact.accepts("1.2.3", "v"));

        assert_eq!(VersionSelector::parse(""), VersionSelector::Latest);
    }

    #[test]
    fn test_file_mode_parse() {
        assert_eq!("644".parse::<FileMode>().unwrap().bits(), 0o644);
        assert_eq!("0755".parse::<FileMode>().unwrap().bits(), 0o755);
        assert_eq!("0o600".parse::<FileMode>().unwrap().bits(), 0o600);
        assert_eq!(FileMode::default().to_string(), "644");

        assert!("abc".parse::<FileMode>().is_err());
        assert!("999".parse::<FileMode>().is_err());
        assert!("17777".parse::<FileMode>().is_err());
    }

    #[test]
    fn test_release_deserialize() {
        let json = r#"{
            "tag_name": "v1.0.0",
            "created_at": "2024-01-01T00:00:00Z",
            "published_at": null,
            "assets": [
                {
                    "id": 7,
                    "name": "tool.zip",
                    "url": "https://api.github.com/repos/octo/tool/releases/assets/7",
                    "browser_download_url": "https://github.com/octo/tool/releases/download/v1.0.0/tool.zip"
                }
            ]
        }"#;

        let release: GitHubRelease = serde_json::from_str(json).unwrap();
        assert_eq!(release.tag_name, "v1.0.0");
        assert!(release.published_at.is_none());
        assert_eq!(release.assets[0].id, Some(7));
    }
}
