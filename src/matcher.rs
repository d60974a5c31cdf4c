//! Release and asset selection
//!
//! Pure functions over the fetched release list; no I/O happens here.

use crate::config::Config;
use crate::error::FetchError;
use crate::types::{GitHubAsset, GitHubRelease, MatchResult, VersionSelector};

/// Releases whose tag qualifies under the configured prefix and version,
/// oldest first by `created_at`, ties broken by `published_at`.
pub fn candidate_releases<'a>(
    releases: &'a [GitHubRelease],
    version: &VersionSelector,
    prefix: &str,
) -> Vec<&'a GitHubRelease> {
    let mut candidates: Vec<&GitHubRelease> = releases
        .iter()
        .filter(|release| version.accepts(&release.tag_name, prefix))
        .collect();

    candidates.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.published_at.cmp(&b.published_at))
    });

    candidates
}

/// Pick the release and asset to download.
///
/// Every candidate is scanned in order and the last one carrying a matching
/// asset wins, so the most recently created qualifying release is chosen even
/// when an older one also matches.
pub fn select_asset(releases: &[GitHubRelease], config: &Config) -> Result<MatchResult, FetchError> {
    let prefix = config.tag_prefix.as_str();
    let repo = config.repository.to_string();

    let candidates = candidate_releases(releases, &config.version, prefix);
    tracing::debug!(
        "{} of {} release(s) qualify for {}",
        candidates.len(),
        releases.len(),
        describe_selector(&config.version, prefix)
    );

    if candidates.is_empty() {
        return Err(FetchError::NoMatchingRelease {
            repo,
            selector: describe_selector(&config.version, prefix),
            file: None,
        });
    }

    let re = config
        .pattern
        .compile()
        .map_err(|e| FetchError::Config(format!("invalid file pattern '{}': {}", config.pattern, e)))?;

    let mut selected: Option<(&GitHubRelease, &GitHubAsset)> = None;
    for release in candidates {
        if let Some(asset) = release.assets.iter().find(|asset| re.is_match(&asset.name)) {
            tracing::trace!("{} carries matching asset {}", release.tag_name, asset.name);
            selected = Some((release, asset));
        }
    }

    let (release, asset) = selected.ok_or_else(|| FetchError::NoMatchingRelease {
        repo: repo.clone(),
        selector: describe_selector(&config.version, prefix),
        file: Some(config.pattern.to_string()),
    })?;

    if asset.id.is_none() {
        return Err(FetchError::NoMatchingAsset {
            repo,
            file: config.pattern.to_string(),
        });
    }

    let resolved_version = strip_tag_prefix(&release.tag_name, prefix).to_string();
    tracing::debug!(
        "Selected asset {} from release {} (version {})",
        asset.name,
        release.tag_name,
        resolved_version
    );

    Ok(MatchResult {
        release: release.clone(),
        asset: asset.clone(),
        resolved_version,
    })
}

/// Tags that do not start with the prefix are returned unchanged.
pub fn strip_tag_prefix<'a>(tag_name: &'a str, prefix: &str) -> &'a str {
    tag_name.strip_prefix(prefix).unwrap_or(tag_name)
}

fn describe_selector(version: &VersionSelector, prefix: &str) -> String {
    match version {
        VersionSelector::Latest => prefix.to_string(),
        VersionSelector::Exact(v) => format!("{}{}", prefix, v),
    }
}
