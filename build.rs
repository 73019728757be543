use std::process::Command;

const VERSION_ENV: &str = "DOTDAV_VERSION";

/// Version from a `v*` release tag, without the leading `v`.
fn describe() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--match", "v*", "--always", "--dirty"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let raw = String::from_utf8_lossy(&output.stdout);
    let trimmed = raw.trim();
    Some(trimmed.strip_prefix('v').unwrap_or(trimmed).to_string())
}

fn main() {
    if let Some(version) = std::env::var(VERSION_ENV).ok().or_else(describe) {
        println!("cargo:rustc-env={VERSION_ENV}={version}");
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/tags");
    println!("cargo:rerun-if-env-changed={VERSION_ENV}");
}
