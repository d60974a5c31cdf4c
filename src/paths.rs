use crate::error::FetchError;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Compute the absolute destination for `file_name` and make sure its parent
/// directory exists.
///
/// * no requested path: `workspace/file_name`
/// * relative requested path: resolved against `workspace`
/// * requested path that is an existing directory: a sanitised `file_name`
///   is appended
pub fn resolve_destination(
    workspace: &Path,
    requested: Option<&Path>,
    file_name: &str,
) -> Result<PathBuf, FetchError> {
    let workspace = absolutize(workspace)?;

    let requested = requested.filter(|out| !out.as_os_str().is_empty());

    let destination = match requested {
        Some(out) => {
            let candidate = normalize_lexical(&workspace.join(out));
            if candidate.is_dir() {
                candidate.join(sanitize_file_name(file_name))
            } else {
                candidate
            }
        }
        None => normalize_lexical(&workspace.join(file_name)),
    };

    tracing::debug!("Resolved destination: {}", destination.display());

    if let Some(parent) = destination.parent() {
        create_parent_dirs(parent).map_err(|source| FetchError::Filesystem {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    Ok(destination)
}

/// Used when nothing of an asset name survives sanitising
const FALLBACK_FILE_NAME: &str = "asset";

/// Lower-cased file name reduced to ASCII alphanumerics, `-`, `_` and `.`.
pub fn sanitize_file_name(file_name: &str) -> String {
    let sanitized = file_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect::<String>()
        .to_lowercase();

    // `.` and `..` would name a directory, not a file
    if sanitized.chars().all(|c| c == '.') {
        FALLBACK_FILE_NAME.to_string()
    } else {
        sanitized
    }
}

fn absolutize(path: &Path) -> Result<PathBuf, FetchError> {
    std::path::absolute(path).map_err(|source| FetchError::Filesystem {
        path: path.to_path_buf(),
        source,
    })
}

fn create_parent_dirs(dir: &Path) -> io::Result<()> {
    if dir.is_dir() {
        return Ok(());
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }

    builder.create(dir)
}

fn normalize_lexical(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Prefix(p) => {
                out.clear();
                out.push(p.as_os_str());
            }
            Component::RootDir => out.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root
                out.pop();
            }
            Component::Normal(segment) => out.push(segment),
        }
    }

    out
}
