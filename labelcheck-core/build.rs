fn main() {
    built::write_built_file().expect("Failed to acquire build-time information");

    // Allow packagers to stamp a release identifier into the user agent
    println!("cargo:rerun-if-env-changed=LABELCHECK_RELEASE");
    if let Ok(release) = std::env::var("LABELCHECK_RELEASE") {
        println!("cargo:rustc-env=LABELCHECK_RELEASE={}", release);
    }
}
