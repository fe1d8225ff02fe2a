//! File transfer
//!
//! Chunked stream copies and the safe file move used to bring existing files
//! into storage.

use log::{debug, error, info, warn};
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Read, Write};
use std::path::Path;

use crate::storage::operations::FsOps;

/// Chunk size for stream copies
pub const BUFFER_SIZE: usize = 64 * 1024;

/// Copy `reader` into `writer` one chunk at a time. Returns bytes copied.
pub fn copy_chunked<R, W>(reader: &mut R, writer: &mut W) -> io::Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buffer = vec![0u8; BUFFER_SIZE];
    let mut total = 0u64;
    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buffer[..n])?;
        total += n as u64;
    }
    writer.flush()?;
    Ok(total)
}

fn same_file(src: &Path, dst: &Path) -> bool {
    match (fs::canonicalize(src), fs::canonicalize(dst)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Move `src` to `dst` as safely as the platform allows.
///
/// A plain rename is tried first. When that fails (typically across
/// filesystems) the bytes are streamed into `dst`, permissions and mtime are
/// copied over, and `src` is removed. Unless `allow_overwrite` is set an
/// existing `dst` is an `AlreadyExists` error.
pub fn move_file(
    ops: &dyn FsOps,
    src: &Path,
    dst: &Path,
    allow_overwrite: bool,
) -> io::Result<()> {
    if same_file(src, dst) {
        return Ok(());
    }

    if !allow_overwrite && fs::symlink_metadata(dst).is_ok() {
        return Err(io::Error::new(
            ErrorKind::AlreadyExists,
            format!("destination {} already exists", dst.display()),
        ));
    }

    match ops.rename(src, dst) {
        Ok(()) => {
            debug!("Renamed {} -> {}", src.display(), dst.display());
            return Ok(());
        }
        Err(e) => {
            warn!(
                "Rename {} -> {} failed ({}), copying instead",
                src.display(),
                dst.display(),
                e
            );
        }
    }

    let copied = copy_file(ops, src, dst, allow_overwrite)?;

    match ops.remove_file(src) {
        Ok(()) => {}
        // Some platforms refuse to delete files that are still open elsewhere.
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            warn!("Could not remove {} after copy: {}", src.display(), e);
        }
        Err(e) => return Err(e),
    }

    info!(
        "Moved {} -> {} ({} bytes)",
        src.display(),
        dst.display(),
        copied
    );
    Ok(())
}

/// Stream `src` into `dst` and carry over permissions and mtime. A failed
/// copy removes the partial destination.
pub fn copy_file(
    ops: &dyn FsOps,
    src: &Path,
    dst: &Path,
    allow_overwrite: bool,
) -> io::Result<u64> {
    let mut source = File::open(src)?;
    let mut target = if allow_overwrite {
        OpenOptions::new().write(true).create(true).truncate(true).open(dst)?
    } else {
        ops.create_new(dst)?
    };

    let copied = match copy_chunked(&mut source, &mut target) {
        Ok(n) => n,
        Err(e) => {
            error!("Copy {} -> {} failed: {}", src.display(), dst.display(), e);
            drop(target);
            discard_partial(dst);
            return Err(e);
        }
    };

    let meta = source.metadata()?;
    fs::set_permissions(dst, meta.permissions())?;
    if let Ok(modified) = meta.modified() {
        target.set_modified(modified)?;
    }
    Ok(copied)
}

/// Best-effort removal of a half-written file.
pub fn discard_partial(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!("Failed to remove partial file {}: {}", path.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::operations::OsFs;
    use std::io::Cursor;
    use std::time::{Duration, SystemTime};

    /// Renames always fail, as they do across filesystems. Source removal
    /// can be made to fail as well.
    struct CrossDevice {
        deny_remove: bool,
    }

    impl FsOps for CrossDevice {
        fn create_dir_all(&self, path: &Path) -> io::Result<()> {
            fs::create_dir_all(path)
        }

        fn remove_file(&self, path: &Path) -> io::Result<()> {
            if self.deny_remove {
                return Err(io::Error::new(ErrorKind::PermissionDenied, "file is busy"));
            }
            fs::remove_file(path)
        }

        fn remove_dir(&self, path: &Path) -> io::Result<()> {
            fs::remove_dir(path)
        }

        fn rename(&self, _from: &Path, _to: &Path) -> io::Result<()> {
            Err(io::Error::other("cross-device link"))
        }
    }

    #[test]
    fn copy_chunked_handles_multi_chunk_payloads() {
        let data: Vec<u8> = (0..(BUFFER_SIZE * 2 + 17)).map(|i| (i % 251) as u8).collect();
        let mut out = Vec::new();
        let n = copy_chunked(&mut Cursor::new(&data), &mut out).unwrap();
        assert_eq!(n as usize, data.len());
        assert_eq!(out, data);
    }

    #[test]
    fn move_file_renames_and_removes_source() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.bin");
        let dst = dir.path().join("dst.bin");
        fs::write(&src, b"payload").unwrap();

        move_file(&OsFs, &src, &dst, false).unwrap();

        assert!(!src.exists());
        assert_eq!(fs::read(&dst).unwrap(), b"payload");
    }

    #[test]
    fn move_file_refuses_to_overwrite_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.bin");
        let dst = dir.path().join("dst.bin");
        fs::write(&src, b"new").unwrap();
        fs::write(&dst, b"old").unwrap();

        let err = move_file(&OsFs, &src, &dst, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(fs::read(&dst).unwrap(), b"old");
        assert!(src.exists());

        move_file(&OsFs, &src, &dst, true).unwrap();
        assert_eq!(fs::read(&dst).unwrap(), b"new");
    }

    #[test]
    fn moving_onto_itself_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("same.bin");
        fs::write(&src, b"x").unwrap();
        move_file(&OsFs, &src, &src, false).unwrap();
        assert_eq!(fs::read(&src).unwrap(), b"x");
    }

    #[test]
    fn failed_rename_falls_back_to_copy() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.bin");
        let dst = dir.path().join("dst.bin");
        let data: Vec<u8> = (0..(BUFFER_SIZE * 3 + 5)).map(|i| (i % 241) as u8).collect();
        fs::write(&src, &data).unwrap();

        let past = SystemTime::now() - Duration::from_secs(3600);
        File::options()
            .write(true)
            .open(&src)
            .unwrap()
            .set_modified(past)
            .unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&src, fs::Permissions::from_mode(0o640)).unwrap();
        }

        move_file(&CrossDevice { deny_remove: false }, &src, &dst, false).unwrap();

        assert!(!src.exists());
        assert_eq!(fs::read(&dst).unwrap(), data);
        let copied = fs::metadata(&dst).unwrap();
        let drift = match copied.modified().unwrap().duration_since(past) {
            Ok(d) => d,
            Err(e) => e.duration(),
        };
        assert!(drift < Duration::from_secs(2), "mtime not carried over: {:?}", drift);
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            assert_eq!(copied.permissions().mode() & 0o777, 0o640);
        }
    }

    #[test]
    fn copy_fallback_refuses_existing_destination() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.bin");
        let dst = dir.path().join("dst.bin");
        fs::write(&src, b"new").unwrap();
        fs::write(&dst, b"old").unwrap();

        let err = copy_file(&CrossDevice { deny_remove: false }, &src, &dst, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(fs::read(&dst).unwrap(), b"old");
    }

    #[test]
    fn busy_source_is_left_behind_after_copy() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.bin");
        let dst = dir.path().join("dst.bin");
        fs::write(&src, b"payload").unwrap();

        move_file(&CrossDevice { deny_remove: true }, &src, &dst, false).unwrap();

        assert!(src.exists());
        assert_eq!(fs::read(&dst).unwrap(), b"payload");
    }

    #[test]
    fn discard_partial_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        discard_partial(&dir.path().join("never-written.bin"));
    }
}
