use std::env;
use std::fs;
use std::path::Path;

fn main() {
    // Copy config.toml next to the built executable so Config::load()
    // finds it when the binary is run from the target directory.
    let out_dir = env::var("OUT_DIR").unwrap();

    let config_path = Path::new("config.toml");
    let dest_path = Path::new(&out_dir)
        .ancestors()
        .nth(3)
        .unwrap()
        .join("config.toml");

    fs::copy(config_path, dest_path).unwrap();

    println!("cargo:rerun-if-changed=config.toml");
}
