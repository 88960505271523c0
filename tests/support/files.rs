use std::io::Write;

use tempfile::{Builder, NamedTempFile, TempDir};

/// Write `contents` to a temp file ending in `suffix` (e.g. ".json").
pub fn write_temp(contents: &str, suffix: &str) -> NamedTempFile {
    let mut file = Builder::new()
        .prefix("budget-allocator-test-")
        .suffix(suffix)
        .tempfile()
        .expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file.flush().expect("flush temp file");
    file
}

/// Empty working directory, so no stray `config.toml` is picked up.
pub fn empty_dir() -> TempDir {
    tempfile::tempdir().expect("create temp dir")
}
