//! Subprocess harness for driving the `girder` binary end to end.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::OnceLock;

/// Builds the binary on first use and caches its path for the rest of the
/// test run.
fn girder_binary() -> &'static Path {
    static BINARY: OnceLock<PathBuf> = OnceLock::new();
    BINARY.get_or_init(|| {
        let workspace = Path::new(env!("CARGO_MANIFEST_DIR"))
            .ancestors()
            .nth(2)
            .expect("crate should sit two levels below the workspace root")
            .to_path_buf();

        let status = Command::new("cargo")
            .args(["build", "--package", "girder", "--quiet"])
            .current_dir(&workspace)
            .status()
            .expect("cargo build should start");
        assert!(status.success(), "girder binary failed to build");

        workspace.join("target/debug/girder")
    })
}

/// Runs the girder binary in `dir`.
///
/// Color and width overrides from the surrounding environment are
/// neutralized so text-output assertions see the same bytes on every
/// machine: `NO_COLOR` is forced on, and `GIRDER_COLOR` /
/// `GIRDER_MAX_WIDTH` / `RUST_LOG` are cleared.
pub fn run_girder_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(girder_binary())
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("GIRDER_COLOR")
        .env_remove("GIRDER_MAX_WIDTH")
        .env_remove("RUST_LOG")
        .output()
        .expect("girder binary should run")
}
