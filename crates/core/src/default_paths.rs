use std::path::PathBuf;

/// Returns the per-user directory the note files live in by default.
///
/// - Release builds: `<data_dir>/notekeeper`
/// - Debug builds: `<data_dir>/notekeeper-dev`, so development runs never
///   touch real notes
///
/// `<data_dir>` is `~/.local/share` on Linux, `~/Library/Application Support`
/// on macOS and `%APPDATA%` on Windows. Returns `None` when no home directory
/// can be determined.
pub fn default_data_dir(debug: bool) -> Option<PathBuf> {
    let name = if debug { "notekeeper-dev" } else { "notekeeper" };
    dirs::data_dir().map(|dir| dir.join(name))
}
