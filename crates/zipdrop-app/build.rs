use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR"));
    let version_file = manifest_dir
        .ancestors()
        .nth(2)
        .expect("zipdrop-app lives two levels below the workspace root")
        .join("VERSION");

    println!("cargo:rerun-if-changed={}", version_file.display());

    let version = fs::read_to_string(&version_file)
        .unwrap_or_else(|error| panic!("cannot read {}: {error}", version_file.display()));
    let version = version.trim();
    if version.is_empty() {
        panic!("{} is empty", version_file.display());
    }

    println!("cargo:rustc-env=ZIPDROP_VERSION={version}");
}
