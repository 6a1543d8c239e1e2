//! Build script for ltree-cli
//!
//! Stamps the binary with where and when it was built. Each value falls back
//! to "unknown" so builds outside a git checkout still succeed.

use std::env;
use std::process::Command;

/// Short commit hash, with a `-dirty` suffix for uncommitted changes
fn git_revision() -> Option<String> {
    let run = |args: &[&str]| {
        Command::new("git")
            .args(args)
            .output()
            .ok()
            .filter(|output| output.status.success())
    };

    let head = run(&["rev-parse", "--short=8", "HEAD"])?;
    let hash = String::from_utf8(head.stdout).ok()?.trim().to_string();
    let dirty = run(&["status", "--porcelain", "--untracked-files=no"])
        .map(|output| !output.stdout.is_empty())
        .unwrap_or(false);

    Some(if dirty { format!("{}-dirty", hash) } else { hash })
}

/// UTC build time, e.g. 2026-10-19T12:30:45Z
fn build_time() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

fn emit(key: &str, value: &str) {
    println!("cargo:rustc-env={}={}", key, value);
}

fn main() {
    emit("GIT_HASH", &git_revision().unwrap_or_else(|| "unknown".into()));
    emit("BUILD_TIMESTAMP", &build_time());
    emit("BUILD_PROFILE", &env::var("PROFILE").unwrap_or_else(|_| "unknown".into()));
}
