// Build script for awake - embeds version at compile time

fn main() {
    // Release builds may stamp a version; otherwise use Cargo.toml
    let version =
        std::env::var("AWAKE_VERSION").unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env=AWAKE_VERSION={}", version);

    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-env-changed=AWAKE_VERSION");
}
