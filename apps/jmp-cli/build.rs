// build.rs — Version metadata for `jitsi-meet-provision --version`.
//
// JMP_GIT_HASH is `git describe` output, or "unknown" outside a checkout.
// JMP_BUILD_DATE honours SOURCE_DATE_EPOCH so packaged builds reproduce.

use std::process::Command;

use chrono::{DateTime, Utc};

fn main() {
    let describe = Command::new("git")
        .args(["describe", "--always", "--dirty", "--abbrev=8"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string());

    let built = std::env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|epoch| epoch.trim().parse::<i64>().ok())
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .unwrap_or_else(Utc::now);

    println!("cargo:rustc-env=JMP_GIT_HASH={}", describe);
    println!("cargo:rustc-env=JMP_BUILD_DATE={}", built.format("%Y-%m-%d"));
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");
    println!("cargo:rerun-if-changed=../../.git/HEAD");
}
