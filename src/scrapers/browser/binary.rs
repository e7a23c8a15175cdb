//! Process-wide Chrome executable discovery.
//!
//! The lookup runs at most once per process. Concurrent callers wait for the
//! first initializer and later callers get the cached path.

use std::path::{Path, PathBuf};

use tokio::sync::OnceCell;
use tracing::info;

use super::types::BrowserError;

/// Common Chrome executable paths to check.
const CHROME_PATHS: &[&str] = &[
    // Linux
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    // macOS
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/opt/google/chrome/google-chrome",
];

/// Executable names searched on PATH.
const CHROME_COMMANDS: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
];

static CHROME_EXECUTABLE: OnceCell<PathBuf> = OnceCell::const_new();

/// Locate Chrome once and cache the result for the life of the process.
///
/// `CHROME_PATH` takes precedence over the built-in search list. A failed
/// lookup is not cached, so a later call can succeed after installation.
pub async fn chrome_executable() -> Result<&'static Path, BrowserError> {
    CHROME_EXECUTABLE
        .get_or_try_init(|| async { locate_chrome() })
        .await
        .map(PathBuf::as_path)
}

fn locate_chrome() -> Result<PathBuf, BrowserError> {
    if let Ok(path) = std::env::var("CHROME_PATH") {
        let p = PathBuf::from(path.trim());
        if p.is_file() {
            info!("Using Chrome from CHROME_PATH: {}", p.display());
            return Ok(p);
        }
        return Err(BrowserError::ExecutableNotFound(format!(
            "CHROME_PATH points to {}, which does not exist",
            p.display()
        )));
    }

    for path in CHROME_PATHS {
        let p = Path::new(path);
        if p.exists() {
            info!("Found Chrome at: {}", path);
            return Ok(p.to_path_buf());
        }
    }

    if let Some(path) = CHROME_COMMANDS.iter().find_map(|cmd| which::which(cmd).ok()) {
        info!("Found Chrome in PATH: {}", path.display());
        return Ok(path);
    }

    Err(BrowserError::ExecutableNotFound(
        "please install it:\n\
         - Arch/Manjaro: sudo pacman -S chromium\n\
         - Ubuntu/Debian: sudo apt install chromium-browser\n\
         - Fedora: sudo dnf install chromium\n\
         - Or set CHROME_PATH, or BROWSER_URL for a remote browser"
            .to_string(),
    ))
}
