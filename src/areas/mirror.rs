use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

pub const DEFAULT_SUFFIX: u32 = 2;

/// Resolves the mirror of `path_a` by renaming the first path component equal
/// to `component` to `<component>.<suffix>`.
///
/// `/srv/data/projects` with suffix 2 and component `data` resolves to
/// `/srv/data.2/projects`.
pub fn mirror_path(path_a: &Path, suffix: u32, component: &str) -> anyhow::Result<PathBuf> {
    if suffix < 1 {
        anyhow::bail!("suffix must be a positive number, got {}", suffix);
    }

    let mut found = false;
    let mirrored = path_a
        .components()
        .map(|part| match part {
            Component::Normal(name) if !found && name == component => {
                found = true;
                OsString::from(format!("{}.{}", component, suffix))
            }
            other => other.as_os_str().to_os_string(),
        })
        .collect::<PathBuf>();

    if !found {
        anyhow::bail!(
            "path {:?} does not contain a {:?} component",
            path_a,
            component
        );
    }

    Ok(mirrored)
}
