use std::process::Command;

/// `git describe` が使えない環境（tarball展開など）ではパッケージのバージョンを使う
fn describe_version() -> String {
    let described = Command::new("git")
        .args(["describe", "--always", "--dirty", "--tags"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .filter(|v| !v.is_empty());

    match described {
        Some(v) => v,
        None => format!("v{}", std::env::var("CARGO_PKG_VERSION").unwrap_or_default()),
    }
}

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");
    println!("cargo:rustc-env=GIT_VERSION={}", describe_version());
}
