//! Command: print version information.

/// Version string: `DOTDAV_VERSION` from the build script, else the package
/// version.
#[must_use]
pub fn version() -> &'static str {
    option_env!("DOTDAV_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the dotdav version to stdout.
pub fn run() {
    println!("dotdav {}", version());
}
