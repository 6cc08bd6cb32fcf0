//! Entry types and the file-info record delivered to callbacks

use std::ffi::{OsStr, OsString};
use std::fs::Metadata;
use std::time::SystemTime;

/// Type of filesystem entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EntryType {
    /// Regular file
    File = 0,
    /// Directory
    Directory = 1,
    /// Symbolic link
    Symlink = 2,
    /// Block device
    BlockDevice = 3,
    /// Character device
    CharDevice = 4,
    /// Named pipe (FIFO)
    Fifo = 5,
    /// Unix socket
    Socket = 6,
    /// Unknown type
    Unknown = 255,
}

impl EntryType {
    /// Convert from Unix mode bits
    pub fn from_mode(mode: u32) -> Self {
        match mode & 0o170000 {
            0o100000 => EntryType::File,        // S_IFREG
            0o040000 => EntryType::Directory,   // S_IFDIR
            0o120000 => EntryType::Symlink,     // S_IFLNK
            0o060000 => EntryType::BlockDevice, // S_IFBLK
            0o020000 => EntryType::CharDevice,  // S_IFCHR
            0o010000 => EntryType::Fifo,        // S_IFIFO
            0o140000 => EntryType::Socket,      // S_IFSOCK
            _ => EntryType::Unknown,
        }
    }

    /// Mode type bits for this entry type (0 for unknown)
    pub fn mode_bits(&self) -> u32 {
        match self {
            EntryType::File => 0o100000,
            EntryType::Directory => 0o040000,
            EntryType::Symlink => 0o120000,
            EntryType::BlockDevice => 0o060000,
            EntryType::CharDevice => 0o020000,
            EntryType::Fifo => 0o010000,
            EntryType::Socket => 0o140000,
            EntryType::Unknown => 0,
        }
    }

    /// Check if this is a regular file
    pub fn is_file(&self) -> bool {
        *self == EntryType::File
    }

    /// Check if this is a directory
    pub fn is_dir(&self) -> bool {
        *self == EntryType::Directory
    }

    /// Check if this is a symbolic link
    pub fn is_symlink(&self) -> bool {
        *self == EntryType::Symlink
    }
}

/// File permissions (Unix mode bits without type)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permissions(pub u32);

impl Permissions {
    /// Create from full mode (strips type bits)
    pub fn from_mode(mode: u32) -> Self {
        Self(mode & 0o7777)
    }

    /// Get the raw permission bits
    pub fn bits(&self) -> u32 {
        self.0
    }

    /// Check if owner can read
    pub fn owner_read(&self) -> bool {
        self.0 & 0o400 != 0
    }

    /// Check if owner can write
    pub fn owner_write(&self) -> bool {
        self.0 & 0o200 != 0
    }

    /// Check if owner can execute
    pub fn owner_exec(&self) -> bool {
        self.0 & 0o100 != 0
    }
}

/// Metadata of a visited entry, resolved without following symlinks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Entry name (last path component, not the full path)
    pub name: OsString,

    /// Entry type
    pub entry_type: EntryType,

    /// Size in bytes
    pub size: u64,

    /// Full mode (type + permissions)
    pub mode: u32,

    /// Last modification time
    pub modified: Option<SystemTime>,

    /// Inode number (0 where unavailable)
    pub inode: u64,

    /// Number of hard links
    pub nlink: u64,

    /// User ID
    pub uid: u32,

    /// Group ID
    pub gid: u32,
}

impl FileInfo {
    /// Build from `lstat`-style metadata
    #[cfg(unix)]
    pub fn from_metadata(name: &OsStr, meta: &Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;

        let mode = meta.mode();
        Self {
            name: name.to_os_string(),
            entry_type: EntryType::from_mode(mode),
            size: meta.size(),
            mode,
            modified: meta.modified().ok(),
            inode: meta.ino(),
            nlink: meta.nlink(),
            uid: meta.uid(),
            gid: meta.gid(),
        }
    }

    /// Build from `lstat`-style metadata
    #[cfg(not(unix))]
    pub fn from_metadata(name: &OsStr, meta: &Metadata) -> Self {
        let file_type = meta.file_type();
        let entry_type = if file_type.is_symlink() {
            EntryType::Symlink
        } else if file_type.is_dir() {
            EntryType::Directory
        } else if file_type.is_file() {
            EntryType::File
        } else {
            EntryType::Unknown
        };
        let perms = if meta.permissions().readonly() { 0o444 } else { 0o644 };

        Self {
            name: name.to_os_string(),
            entry_type,
            size: meta.len(),
            mode: entry_type.mode_bits() | perms,
            modified: meta.modified().ok(),
            inode: 0,
            nlink: 1,
            uid: 0,
            gid: 0,
        }
    }

    /// Check if this is a directory (symlinks to directories are not)
    pub fn is_dir(&self) -> bool {
        self.entry_type.is_dir()
    }

    /// Check if this is a regular file
    pub fn is_file(&self) -> bool {
        self.entry_type.is_file()
    }

    /// Check if this is a symbolic link
    pub fn is_symlink(&self) -> bool {
        self.entry_type.is_symlink()
    }

    /// Get permissions from mode
    pub fn permissions(&self) -> Permissions {
        Permissions::from_mode(self.mode)
    }
}
