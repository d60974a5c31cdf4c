use crate::error::FetchError;
use crate::github::GitHubClient;
use crate::types::{FileMode, GitHubAsset};
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Stream `asset` into `dest`, replacing whatever file was there.
///
/// Returns once the file is flushed, synced and carries `mode`.
pub async fn download_asset(
    client: &GitHubClient,
    asset: &GitHubAsset,
    dest: &Path,
    mode: FileMode,
    show_progress: bool,
) -> Result<u64, FetchError> {
    let response = client.asset_response(asset).await?;
    let total_size = response.content_length().unwrap_or(0);

    let transfer_error = |reason: String| FetchError::Transfer {
        path: dest.to_path_buf(),
        reason,
    };

    // Never append to or merge with a previous download
    match fs::remove_file(dest).await {
        Ok(()) => tracing::debug!("Removed existing file {}", dest.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(transfer_error(format!("could not remove existing file: {}", e))),
    }

    let mut file = open_with_mode(dest, mode)
        .await
        .map_err(|e| transfer_error(e.to_string()))?;

    let pb = progress_bar(total_size, &asset.name, show_progress);
    let mut downloaded = 0u64;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| transfer_error(format!("download interrupted: {}", e)))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| transfer_error(e.to_string()))?;
        downloaded += chunk.len() as u64;
        pb.set_position(downloaded);
    }

    file.flush().await.map_err(|e| transfer_error(e.to_string()))?;
    file.sync_all().await.map_err(|e| transfer_error(e.to_string()))?;
    drop(file);

    set_mode(dest, mode)
        .await
        .map_err(|e| transfer_error(format!("could not set mode {}: {}", mode, e)))?;

    pb.finish_and_clear();
    tracing::debug!("Wrote {} bytes to {}", downloaded, dest.display());
    Ok(downloaded)
}

async fn open_with_mode(dest: &Path, mode: FileMode) -> io::Result<fs::File> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);

    #[cfg(unix)]
    options.mode(mode.bits());
    #[cfg(not(unix))]
    let _ = mode;

    options.open(dest).await
}

// The open mode is filtered by the umask; this pins the exact bits
async fn set_mode(dest: &Path, mode: FileMode) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dest, std::fs::Permissions::from_mode(mode.bits())).await?;
    }
    #[cfg(not(unix))]
    let _ = (dest, mode);

    Ok(())
}

fn progress_bar(total_size: u64, name: &str, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(total_size);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{msg} {spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_message(format!("Downloading {}", name));
    pb
}
