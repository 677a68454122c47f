//! Build script for the MEMS ECU simulator
//!
//! Only relevant when the `ftdi` feature links against libftd2xx.

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    if std::env::var_os("CARGO_FEATURE_FTDI").is_none() {
        return;
    }

    let lib_paths = [
        "/usr/local/lib/libftd2xx.so",
        "/usr/lib/libftd2xx.so",
        "/usr/lib/x86_64-linux-gnu/libftd2xx.so",
    ];

    let found = lib_paths.iter().any(|p| std::path::Path::new(p).exists());

    if !found {
        println!("cargo:warning==============================================");
        println!("cargo:warning=ftdi feature enabled but libftd2xx.so not found!");
        println!("cargo:warning=");
        println!("cargo:warning=  1. Download from: https://ftdichip.com/drivers/d2xx-drivers/");
        println!("cargo:warning=  2. Copy libftd2xx.so to /usr/local/lib/");
        println!("cargo:warning=  3. Run: sudo ldconfig");
        println!("cargo:warning=");
        println!("cargo:warning=Or build without --features ftdi and use --backend serial.");
        println!("cargo:warning==============================================");
    }
}
