use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::{Path, PathBuf};

/// A primary tree at `<tmp>/data/project` and its mirror at
/// `<tmp>/data.2/project`
pub struct MirrorDirs {
    pub root: TempDir,
    pub data: PathBuf,
    pub mirror: PathBuf,
}

#[fixture]
pub fn mirror_dirs() -> MirrorDirs {
    let root = TempDir::new().expect("Failed to create temp dir");
    let data = root.path().join("data").join("project");
    let mirror = root.path().join("data.2").join("project");

    for dir in [&data, &mirror] {
        std::fs::create_dir_all(dir)
            .unwrap_or_else(|e| panic!("Failed to create directory {:?}: {}", dir, e));
    }

    MirrorDirs { root, data, mirror }
}

pub fn run_differ_command(dirs: &MirrorDirs, args: &[&str]) -> Command {
    run_differ_command_in(&dirs.data, dirs.root.path(), args)
}

/// Runs the binary in `dir` with user config looked up below `config_home`
pub fn run_differ_command_in(dir: &Path, config_home: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("differ").expect("Failed to find differ binary");
    cmd.env("XDG_DATA_HOME", config_home);
    cmd.env_remove("RUST_LOG");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}
