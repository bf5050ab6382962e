use std::fmt;
use std::fs::Metadata;

const TYPE_MASK: u32 = 0o170000;
const PERMISSION_MASK: u32 = 0o7777;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum FileKind {
    Regular,
    Directory,
    Symlink,
    Fifo,
    Socket,
    CharDevice,
    BlockDevice,
}

impl FileKind {
    fn from_bits(bits: u32) -> Self {
        match bits & TYPE_MASK {
            0o040000 => FileKind::Directory,
            0o120000 => FileKind::Symlink,
            0o010000 => FileKind::Fifo,
            0o140000 => FileKind::Socket,
            0o020000 => FileKind::CharDevice,
            0o060000 => FileKind::BlockDevice,
            _ => FileKind::Regular,
        }
    }

    fn type_bits(&self) -> u32 {
        match self {
            FileKind::Regular => 0o100000,
            FileKind::Directory => 0o040000,
            FileKind::Symlink => 0o120000,
            FileKind::Fifo => 0o010000,
            FileKind::Socket => 0o140000,
            FileKind::CharDevice => 0o020000,
            FileKind::BlockDevice => 0o060000,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            FileKind::Regular => '-',
            FileKind::Directory => 'd',
            FileKind::Symlink => 'l',
            FileKind::Fifo => 'p',
            FileKind::Socket => 's',
            FileKind::CharDevice => 'c',
            FileKind::BlockDevice => 'b',
        }
    }
}

/// Permission and file-type bits, in the `st_mode` layout
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct FileMode(u32);

impl FileMode {
    pub fn new(kind: FileKind, permissions: u32) -> Self {
        FileMode(kind.type_bits() | (permissions & PERMISSION_MASK))
    }

    pub fn regular(permissions: u32) -> Self {
        Self::new(FileKind::Regular, permissions)
    }

    pub fn directory(permissions: u32) -> Self {
        Self::new(FileKind::Directory, permissions)
    }

    pub fn from_bits(bits: u32) -> Self {
        FileMode(bits)
    }

    pub fn permissions(&self) -> u32 {
        self.0 & PERMISSION_MASK
    }

    pub fn kind(&self) -> FileKind {
        FileKind::from_bits(self.0)
    }

    pub fn is_dir(&self) -> bool {
        self.kind() == FileKind::Directory
    }

    pub fn is_regular(&self) -> bool {
        self.kind() == FileKind::Regular
    }

    pub fn is_symlink(&self) -> bool {
        self.kind() == FileKind::Symlink
    }
}

impl Default for FileMode {
    fn default() -> Self {
        FileMode::regular(0o644)
    }
}

impl From<&Metadata> for FileMode {
    #[cfg(unix)]
    fn from(metadata: &Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;
        FileMode(metadata.mode())
    }

    #[cfg(not(unix))]
    fn from(metadata: &Metadata) -> Self {
        let file_type = metadata.file_type();
        let kind = if file_type.is_dir() {
            FileKind::Directory
        } else if file_type.is_symlink() {
            FileKind::Symlink
        } else {
            FileKind::Regular
        };
        let permissions = match (kind, metadata.permissions().readonly()) {
            (FileKind::Directory, false) => 0o755,
            (FileKind::Directory, true) => 0o555,
            (_, false) => 0o644,
            (_, true) => 0o444,
        };
        FileMode::new(kind, permissions)
    }
}

/// `ls -l` style, e.g. `-rwxr-xr-x` or `drwxr-xr-x`
impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bits = self.0;
        let special = |flag: u32, on_exec: char, off_exec: char, exec: bool| {
            match (bits & flag != 0, exec) {
                (true, true) => Some(on_exec),
                (true, false) => Some(off_exec),
                _ => None,
            }
        };

        let mut out = String::with_capacity(10);
        out.push(self.kind().as_char());

        let triplets = [
            (0o400, 0o200, 0o100, 0o4000, 's', 'S'),
            (0o040, 0o020, 0o010, 0o2000, 's', 'S'),
            (0o004, 0o002, 0o001, 0o1000, 't', 'T'),
        ];
        for (r, w, x, flag, on_exec, off_exec) in triplets {
            out.push(if bits & r != 0 { 'r' } else { '-' });
            out.push(if bits & w != 0 { 'w' } else { '-' });
            let exec = bits & x != 0;
            out.push(
                special(flag, on_exec, off_exec, exec).unwrap_or(if exec { 'x' } else { '-' }),
            );
        }

        write!(f, "{out}")
    }
}
