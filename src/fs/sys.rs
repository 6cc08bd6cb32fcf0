//! Platform directory access
//!
//! Two operations back the enumerator: opening a directory handle and
//! reading one batch of raw records into a [`DirentBuf`]. Both retry on
//! `EINTR`. On Linux they map to `open(O_DIRECTORY)` and `getdents64`;
//! elsewhere they are built on `std::fs::read_dir`.

use super::dirent::DirentBuf;
use super::types::FileInfo;
use std::io;
use std::path::Path;

pub use imp::RawDir;

/// Stat `path` without following symlinks
///
/// A vanished entry is reported as `io::ErrorKind::NotFound`.
pub fn stat_no_follow(path: &Path) -> io::Result<FileInfo> {
    let meta = loop {
        match std::fs::symlink_metadata(path) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            other => break other?,
        }
    };

    let name = path.file_name().unwrap_or(path.as_os_str());
    Ok(FileInfo::from_metadata(name, &meta))
}

#[cfg(target_os = "linux")]
mod imp {
    use super::DirentBuf;
    use std::ffi::CString;
    use std::io;
    use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
    use std::os::unix::ffi::OsStrExt;
    use std::path::Path;

    /// Open directory handle; the descriptor is closed on drop
    #[derive(Debug)]
    pub struct RawDir {
        fd: OwnedFd,
    }

    impl RawDir {
        /// Open `path` for reading raw entries
        pub fn open(path: &Path) -> io::Result<Self> {
            let c_path = CString::new(path.as_os_str().as_bytes())
                .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "path contains NUL"))?;

            loop {
                let fd = unsafe {
                    libc::open(
                        c_path.as_ptr(),
                        libc::O_RDONLY | libc::O_DIRECTORY | libc::O_CLOEXEC,
                    )
                };
                if fd < 0 {
                    let err = io::Error::last_os_error();
                    if err.kind() == io::ErrorKind::Interrupted {
                        continue;
                    }
                    return Err(err);
                }
                // SAFETY: `fd` was just returned by open(2) and is owned by nobody else.
                return Ok(Self {
                    fd: unsafe { OwnedFd::from_raw_fd(fd) },
                });
            }
        }

        /// Read the next batch of records; returns 0 at end of directory
        pub fn read_batch(&mut self, buf: &mut DirentBuf) -> io::Result<usize> {
            let (ptr, len) = {
                let spare = buf.reset_for_read();
                (spare.as_mut_ptr(), spare.len())
            };

            loop {
                let n = unsafe {
                    libc::syscall(
                        libc::SYS_getdents64,
                        self.fd.as_raw_fd(),
                        ptr.cast::<libc::c_void>(),
                        len as libc::c_uint,
                    )
                };
                if n < 0 {
                    let err = io::Error::last_os_error();
                    if err.kind() == io::ErrorKind::Interrupted {
                        continue;
                    }
                    return Err(err);
                }

                let n = n as usize;
                buf.set_filled(n);
                return Ok(n);
            }
        }
    }
}

#[cfg(not(target_os = "linux"))]
mod imp {
    use super::DirentBuf;
    use crate::fs::dirent::DT_UNKNOWN;
    use std::ffi::OsString;
    use std::fs::ReadDir;
    use std::io;
    use std::path::Path;

    /// `read_dir` already drops deleted entries, so every record gets a
    /// nonzero placeholder inode.
    const PLACEHOLDER_INO: u64 = 1;

    /// Open directory handle backed by `std::fs::ReadDir`
    #[derive(Debug)]
    pub struct RawDir {
        entries: ReadDir,
        carry: Option<io::Result<OsString>>,
    }

    impl RawDir {
        /// Open `path` for reading raw entries
        pub fn open(path: &Path) -> io::Result<Self> {
            loop {
                match std::fs::read_dir(path) {
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    other => {
                        return Ok(Self {
                            entries: other?,
                            carry: None,
                        })
                    }
                }
            }
        }

        /// Read the next batch of records; returns 0 at end of directory
        pub fn read_batch(&mut self, buf: &mut DirentBuf) -> io::Result<usize> {
            buf.clear();

            loop {
                let next = match self.carry.take() {
                    Some(carried) => Some(carried),
                    None => self.next_name(),
                };

                match next {
                    None => break,
                    Some(Err(e)) => {
                        if buf.filled() == 0 {
                            return Err(e);
                        }
                        // deliver what we have, fail on the next call
                        self.carry = Some(Err(e));
                        break;
                    }
                    Some(Ok(name)) => {
                        if !buf.push_record(PLACEHOLDER_INO, DT_UNKNOWN, name.as_encoded_bytes()) {
                            if buf.filled() == 0 {
                                return Err(io::Error::new(
                                    io::ErrorKind::InvalidInput,
                                    "directory entry name larger than read buffer",
                                ));
                            }
                            self.carry = Some(Ok(name));
                            break;
                        }
                    }
                }
            }

            Ok(buf.filled())
        }

        fn next_name(&mut self) -> Option<io::Result<OsString>> {
            loop {
                match self.entries.next()? {
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    other => return Some(other.map(|entry| entry.file_name())),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::ffi::OsString;

    fn read_all(dir: &Path, buffer_size: usize) -> BTreeSet<OsString> {
        let mut raw = RawDir::open(dir).unwrap();
        let mut buf = DirentBuf::new(buffer_size);
        let mut names = Vec::new();

        while raw.read_batch(&mut buf).unwrap() > 0 {
            while !buf.is_drained() {
                buf.decode(100, &mut names).unwrap();
            }
        }
        names.into_iter().collect()
    }

    #[test]
    fn test_read_all_names() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"a").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let names = read_all(dir.path(), 8 << 10);
        let expected: BTreeSet<OsString> = ["a.txt", "sub"].iter().map(OsString::from).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_many_batches() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..300 {
            std::fs::write(dir.path().join(format!("file-with-a-long-name-{:04}", i)), b"").unwrap();
        }

        // 1 KiB holds only a couple dozen records, forcing many reads
        let names = read_all(dir.path(), 1 << 10);
        assert_eq!(names.len(), 300);
    }

    #[test]
    fn test_open_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = RawDir::open(&dir.path().join("nope")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_open_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain");
        std::fs::write(&file, b"x").unwrap();
        assert!(RawDir::open(&file).is_err());
    }

    #[test]
    fn test_stat_no_follow() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f");
        std::fs::write(&file, b"1234").unwrap();

        let info = stat_no_follow(&file).unwrap();
        assert_eq!(info.name, "f");
        assert_eq!(info.size, 4);

        let err = stat_no_follow(&dir.path().join("missing")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[cfg(unix)]
    #[test]
    fn test_stat_does_not_follow_symlink() {
        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(dir.path(), dir.path().join("loop")).unwrap();

        let info = stat_no_follow(&dir.path().join("loop")).unwrap();
        assert!(info.is_symlink());
        assert!(!info.is_dir());
    }
}
