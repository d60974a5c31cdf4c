use crate::config::Config;
use crate::download::download_asset;
use crate::error::FetchError;
use crate::github::GitHubClient;
use crate::matcher::select_asset;
use crate::outcome::Outcome;
use crate::paths::resolve_destination;
use crate::unpack::{unpack, ArchiveKind};

/// Fetch, match, download and optionally unpack one release asset.
///
/// Nothing is reported until every step has succeeded.
pub async fn run(config: &Config, show_progress: bool) -> Result<Outcome, FetchError> {
    let client = GitHubClient::new(&config.api_url, &config.token)?;

    let releases = client.list_releases(&config.repository).await?;
    let matched = select_asset(&releases, config)?;
    tracing::debug!(
        "Release {} created {}",
        matched.release.tag_name,
        matched.release.created_at.to_rfc3339()
    );

    let out = resolve_destination(&config.workspace, config.out.as_deref(), &matched.asset.name)?;

    download_asset(&client, &matched.asset, &out, config.mode, show_progress).await?;
    tracing::info!(
        "downloaded {}@v{} from {} to {}",
        matched.asset.name,
        matched.resolved_version,
        config.repository,
        out.display()
    );

    if config.unpack {
        match ArchiveKind::from_path(&out) {
            Some(kind) => {
                let archive = out.clone();
                let dir = tokio::task::spawn_blocking(move || unpack(&archive, kind))
                    .await
                    .map_err(|e| FetchError::Unpack {
                        path: out.clone(),
                        reason: format!("unpack task failed: {}", e),
                    })??;
                tracing::info!(
                    "unpacked {}@v{} into {}",
                    matched.asset.name,
                    matched.resolved_version,
                    dir.display()
                );
            }
            None => tracing::debug!("{} is not a recognised archive, leaving it packed", out.display()),
        }
    }

    Ok(Outcome {
        out,
        version: matched.resolved_version,
        browser_download_url: matched.asset.browser_download_url,
    })
}
