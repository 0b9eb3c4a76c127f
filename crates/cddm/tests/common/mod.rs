//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use cddm::domain::Dataset;
use cddm::store::Store;
use cddm::workspace::Workspace;
use std::path::Path;
use std::process::{Command, Output};

/// Run the cddm binary in the specified directory, colours off.
pub fn run_cddm_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cddm"))
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run cddm")
}

/// Stdout of a run, as UTF-8.
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Store seeded with the demo dataset.
pub fn sample_store() -> Store {
    let (store, warnings) = Store::load(Dataset::sample());
    assert!(warnings.is_empty());
    store
}

/// Workspace over the demo dataset.
pub fn sample_workspace() -> Workspace {
    Workspace::new(sample_store())
}
