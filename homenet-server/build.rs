//! Stamps the binary with the commit, build time and profile it was built from
//! (`GIT_HASH`, `BUILD_TIMESTAMP`, `BUILD_PROFILE`), logged by `main` at startup.

use std::process::Command;

/// Short hash of HEAD, or "unknown" outside a git checkout
fn commit() -> String {
    Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|hash| hash.trim().to_string())
        .filter(|hash| !hash.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn stamp(key: &str, value: &str) {
    println!("cargo:rustc-env={}={}", key, value);
}

fn main() {
    stamp("GIT_HASH", &commit());
    stamp(
        "BUILD_TIMESTAMP",
        &chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    );
    stamp(
        "BUILD_PROFILE",
        &std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string()),
    );
}
