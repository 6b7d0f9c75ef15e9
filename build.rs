//! Build script for pr-stats: embeds a human-readable version string.
//!
//! `BUILD_INFO_HUMAN` is `<crate version> (<git description>) <rustc version>`.
//! The git description comes from `git describe --tags --always --dirty`;
//! when the repository has no tags it falls back to
//! `v<crate version>-<commit date>-<short sha>`. Parts that cannot be
//! determined (no git, no rustc on PATH) are left out.

use std::process::Command;

fn main() {
    for path in ["src", "build.rs", "Cargo.toml"] {
        println!("cargo:rerun-if-changed={path}");
    }

    println!("cargo:rustc-env=BUILD_INFO_HUMAN={}", build_info());
}

fn run(program: &str, args: &[&str]) -> Option<String> {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn untagged_version() -> Option<String> {
    let sha = run("git", &["rev-parse", "--short=12", "HEAD"])?;
    let date = run("git", &["log", "-1", "--format=%ct"])
        .and_then(|secs| secs.parse::<i64>().ok())
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y%m%d%H%M%S").to_string())
        .unwrap_or_else(|| chrono::Utc::now().format("%Y%m%d%H%M%S").to_string());

    Some(format!("v{}-{date}-{sha}", env!("CARGO_PKG_VERSION")))
}

fn git_version() -> Option<String> {
    match run("git", &["describe", "--tags", "--always", "--dirty"]) {
        // A bare hash means there are no tags to describe against.
        Some(desc) if desc.contains('v') || desc.contains("-g") => Some(desc),
        Some(_) => untagged_version(),
        None => None,
    }
}

fn build_info() -> String {
    [
        Some(env!("CARGO_PKG_VERSION").to_string()),
        git_version().map(|v| format!("({v})")),
        run("rustc", &["--version"]),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
}
