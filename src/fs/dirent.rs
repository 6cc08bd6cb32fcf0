//! Raw directory record buffer and batch decoder
//!
//! Records use the Linux `linux_dirent64` layout in native byte order:
//!
//! ```text
//! offset  size  field
//!      0     8  d_ino
//!      8     8  d_off
//!     16     2  d_reclen   (total record length, including padding)
//!     18     1  d_type
//!     19     *  d_name     (NUL terminated, padded to 8 bytes)
//! ```
//!
//! On Linux the kernel fills the buffer directly via `getdents64`; other
//! platforms synthesize the same records with [`DirentBuf::push_record`], so
//! decoding is identical everywhere.

use std::ffi::OsString;
use std::io;

const INO_OFFSET: usize = 0;
const OFF_OFFSET: usize = 8;
const RECLEN_OFFSET: usize = 16;
const TYPE_OFFSET: usize = 18;
const NAME_OFFSET: usize = 19;

/// `DT_UNKNOWN`
pub const DT_UNKNOWN: u8 = 0;

/// Reusable buffer holding one batch of raw directory records
///
/// Each worker owns one; it is reset before every read and decoded
/// incrementally, tracking how many bytes have been consumed.
#[derive(Debug)]
pub struct DirentBuf {
    bytes: Vec<u8>,
    filled: usize,
    offset: usize,
}

impl DirentBuf {
    /// Create a buffer of `capacity` bytes
    pub fn new(capacity: usize) -> Self {
        Self {
            bytes: vec![0; capacity],
            filled: 0,
            offset: 0,
        }
    }

    /// Buffer capacity in bytes
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Bytes filled by the last read
    pub fn filled(&self) -> usize {
        self.filled
    }

    /// Bytes already decoded from the current batch
    pub fn consumed(&self) -> usize {
        self.offset
    }

    /// Check if every record of the current batch has been decoded
    pub fn is_drained(&self) -> bool {
        self.offset >= self.filled
    }

    /// Discard the current batch
    pub fn clear(&mut self) {
        self.filled = 0;
        self.offset = 0;
    }

    /// Reset and expose the whole buffer for a raw read
    #[cfg_attr(not(target_os = "linux"), allow(dead_code))]
    pub(crate) fn reset_for_read(&mut self) -> &mut [u8] {
        self.clear();
        &mut self.bytes
    }

    /// Record how many bytes the raw read produced
    #[cfg_attr(not(target_os = "linux"), allow(dead_code))]
    pub(crate) fn set_filled(&mut self, len: usize) {
        self.filled = len.min(self.bytes.len());
        self.offset = 0;
    }

    /// Append a synthesized record
    ///
    /// Returns `false` (leaving the buffer untouched) if the record does not
    /// fit in the remaining space.
    #[cfg_attr(target_os = "linux", allow(dead_code))]
    pub(crate) fn push_record(&mut self, ino: u64, d_type: u8, name: &[u8]) -> bool {
        let reclen = align8(NAME_OFFSET + name.len() + 1);
        let start = self.filled;
        if reclen > u16::MAX as usize || start + reclen > self.bytes.len() {
            return false;
        }

        let record = &mut self.bytes[start..start + reclen];
        record.fill(0);
        record[INO_OFFSET..INO_OFFSET + 8].copy_from_slice(&ino.to_ne_bytes());
        record[OFF_OFFSET..OFF_OFFSET + 8].copy_from_slice(&((start + reclen) as i64).to_ne_bytes());
        record[RECLEN_OFFSET..RECLEN_OFFSET + 2].copy_from_slice(&(reclen as u16).to_ne_bytes());
        record[TYPE_OFFSET] = d_type;
        record[NAME_OFFSET..NAME_OFFSET + name.len()].copy_from_slice(name);

        self.filled += reclen;
        true
    }

    /// Decode up to `max` names from the current batch into `names`
    ///
    /// Consumed bytes are tracked so that repeated calls continue where the
    /// previous one stopped. `.`, `..` and records with inode 0 are consumed
    /// but not reported. Returns the number of names appended.
    pub fn decode(&mut self, max: usize, names: &mut Vec<OsString>) -> io::Result<usize> {
        let mut count = 0;

        while count < max && self.offset < self.filled {
            let rest = &self.bytes[self.offset..self.filled];
            if rest.len() < NAME_OFFSET {
                return Err(malformed(self.offset, "truncated record header"));
            }

            let reclen = u16::from_ne_bytes([rest[RECLEN_OFFSET], rest[RECLEN_OFFSET + 1]]) as usize;
            if reclen <= NAME_OFFSET || reclen > rest.len() {
                return Err(malformed(self.offset, "invalid record length"));
            }

            let mut ino = [0u8; 8];
            ino.copy_from_slice(&rest[INO_OFFSET..INO_OFFSET + 8]);
            let ino = u64::from_ne_bytes(ino);

            let raw_name = &rest[NAME_OFFSET..reclen];
            let name = match raw_name.iter().position(|&b| b == 0) {
                Some(end) => &raw_name[..end],
                None => raw_name,
            };

            self.offset += reclen;

            if ino == 0 || name.is_empty() || name == b"." || name == b".." {
                continue;
            }

            names.push(os_string_from_bytes(name));
            count += 1;
        }

        Ok(count)
    }
}

fn align8(n: usize) -> usize {
    (n + 7) & !7
}

fn malformed(offset: usize, reason: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("malformed directory record at offset {}: {}", offset, reason),
    )
}

#[cfg(unix)]
fn os_string_from_bytes(bytes: &[u8]) -> OsString {
    use std::os::unix::ffi::OsStrExt;
    std::ffi::OsStr::from_bytes(bytes).to_os_string()
}

#[cfg(not(unix))]
fn os_string_from_bytes(bytes: &[u8]) -> OsString {
    // SAFETY: off Unix, records are only written by `push_record` with bytes
    // taken from `OsStr::as_encoded_bytes` in this process.
    unsafe { OsString::from_encoded_bytes_unchecked(bytes.to_vec()) }
}
