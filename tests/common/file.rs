use derive_new::new;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

#[derive(Debug, Clone, Eq, PartialEq, new)]
pub struct FileSpec {
    pub path: PathBuf,
    pub content: String,
}

pub fn write_file(file_spec: FileSpec) {
    // make sure the parent directory exists
    if let Some(parent) = file_spec.path.parent() {
        std::fs::create_dir_all(parent)
            .unwrap_or_else(|e| panic!("Failed to create directory {:?}: {}", parent, e));
    }

    std::fs::write(&file_spec.path, &file_spec.content)
        .unwrap_or_else(|e| panic!("Failed to write file {:?}: {}", file_spec.path, e));
}

/// Writes the same file into both trees
pub fn write_both(root_a: &Path, root_b: &Path, relative_path: &str, content: &str) {
    for root in [root_a, root_b] {
        write_file(FileSpec::new(root.join(relative_path), content.to_string()));
    }
}

#[cfg(unix)]
pub fn set_mode(path: &Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .unwrap_or_else(|e| panic!("Failed to set mode of {:?}: {}", path, e));
}

#[cfg(unix)]
pub fn mode_of(path: &Path) -> u32 {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .unwrap_or_else(|e| panic!("Failed to stat {:?}: {}", path, e))
        .permissions()
        .mode()
        & 0o7777
}

/// Pins the modification time to a fixed offset from the epoch
pub fn pin_mtime(path: &Path, seconds: u64) {
    let time = filetime::FileTime::from_system_time(SystemTime::UNIX_EPOCH + Duration::from_secs(seconds));
    filetime::set_file_mtime(path, time)
        .unwrap_or_else(|e| panic!("Failed to set mtime of {:?}: {}", path, e));
}
