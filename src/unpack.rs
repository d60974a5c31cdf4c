//! Archive expansion
//!
//! The archive type is chosen from the file extension alone (exact,
//! case-sensitive); contents are never sniffed to pick the format.

use crate::error::FetchError;
use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{self, BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use tar::Archive;

/// Offset and value of the magic in a POSIX tar header
const TAR_MAGIC_OFFSET: usize = 257;
const TAR_MAGIC: &[u8] = b"ustar";
const TAR_BLOCK: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    TarGz,
    TarBz2,
    /// `.gz`: a gzip stream holding either a tarball or a single file
    Gz,
    /// `.bz`: a bzip2 stream holding either a tarball or a single file
    Bz,
}

impl ArchiveKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "zip" => Some(ArchiveKind::Zip),
            "tgz" => Some(ArchiveKind::TarGz),
            "tbz" => Some(ArchiveKind::TarBz2),
            "gz" => Some(ArchiveKind::Gz),
            "bz" => Some(ArchiveKind::Bz),
            _ => None,
        }
    }
}

/// Expand `archive` into its parent directory.
///
/// Returns the directory the archive was expanded into. The archive itself
/// is left in place, also on failure.
pub fn unpack(archive: &Path, kind: ArchiveKind) -> Result<PathBuf, FetchError> {
    let dest = archive
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| FetchError::Unpack {
            path: archive.to_path_buf(),
            reason: "archive has no parent directory".to_string(),
        })?;

    tracing::debug!(
        "Unpacking {} ({:?}) into {}",
        archive.display(),
        kind,
        dest.display()
    );

    let result = match kind {
        ArchiveKind::Zip => extract_zip(archive, &dest),
        ArchiveKind::TarGz => open(archive).and_then(|f| extract_tar(GzDecoder::new(f), &dest)),
        ArchiveKind::TarBz2 => open(archive).and_then(|f| extract_tar(BzDecoder::new(f), &dest)),
        ArchiveKind::Gz => open(archive)
            .and_then(|f| extract_stream(GzDecoder::new(f), &single_file_target(archive, &dest), &dest)),
        ArchiveKind::Bz => open(archive)
            .and_then(|f| extract_stream(BzDecoder::new(f), &single_file_target(archive, &dest), &dest)),
    };

    result.map_err(|e| FetchError::Unpack {
        path: archive.to_path_buf(),
        reason: e.to_string(),
    })?;

    Ok(dest)
}

fn open(archive: &Path) -> io::Result<BufReader<File>> {
    File::open(archive).map(BufReader::new)
}

fn extract_zip(archive_path: &Path, dest: &Path) -> io::Result<()> {
    let file = File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file).map_err(zip_error)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(zip_error)?;

        let outpath = match entry.enclosed_name() {
            Some(path) => dest.join(path),
            None => {
                tracing::warn!("Skipping unsafe path in zip: {}", entry.name());
                continue;
            }
        };

        if entry.is_dir() {
            fs::create_dir_all(&outpath)?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut outfile = File::create(&outpath)?;
        io::copy(&mut entry, &mut outfile)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&outpath, fs::Permissions::from_mode(mode))?;
            }
        }
    }

    Ok(())
}

fn zip_error(e: zip::result::ZipError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e)
}

fn extract_tar<R: Read>(reader: R, dest: &Path) -> io::Result<()> {
    // `unpack` refuses entries that would land outside `dest`
    Archive::new(reader).unpack(dest)
}

/// Unpack a decompressed stream as a tarball when it carries the tar magic,
/// otherwise write it out as one file.
fn extract_stream<R: Read>(mut reader: R, single_file: &Path, dest: &Path) -> io::Result<()> {
    let mut header = Vec::with_capacity(TAR_BLOCK);
    (&mut reader).take(TAR_BLOCK as u64).read_to_end(&mut header)?;

    let is_tar = header.len() == TAR_BLOCK
        && &header[TAR_MAGIC_OFFSET..TAR_MAGIC_OFFSET + TAR_MAGIC.len()] == TAR_MAGIC;
    let mut stream = Cursor::new(header).chain(reader);

    if is_tar {
        extract_tar(stream, dest)
    } else {
        tracing::debug!("Not a tarball, writing {}", single_file.display());
        let mut outfile = File::create(single_file)?;
        io::copy(&mut stream, &mut outfile)?;
        Ok(())
    }
}

fn single_file_target(archive: &Path, dest: &Path) -> PathBuf {
    let stem = archive
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| "unpacked".into());
    dest.join(stem)
}
