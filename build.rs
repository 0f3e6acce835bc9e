//! Build script: embeds the Carthage version string.

use std::process::Command;

fn main() {
    // CARTHAGE_VERSION wins (release builds); otherwise git describe.
    if let Ok(version) = std::env::var("CARTHAGE_VERSION") {
        println!("cargo:rustc-env=CARTHAGE_VERSION={version}");
    } else if let Ok(output) = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        && output.status.success()
    {
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        println!("cargo:rustc-env=CARTHAGE_VERSION={version}");
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
    println!("cargo:rerun-if-env-changed=CARTHAGE_VERSION");
}
