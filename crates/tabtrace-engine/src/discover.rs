//! One-shot lookup of a Chromium-based browser executable.

use std::path::PathBuf;

#[cfg(target_os = "macos")]
const CANDIDATES: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Brave Browser.app/Contents/MacOS/Brave Browser",
    "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
    "/Applications/Arc.app/Contents/MacOS/Arc",
];

#[cfg(target_os = "windows")]
const CANDIDATES: &[&str] = &[
    "C:\\Program Files\\Google\\Chrome\\Application\\chrome.exe",
    "C:\\Program Files (x86)\\Google\\Chrome\\Application\\chrome.exe",
    "C:\\Program Files\\Microsoft\\Edge\\Application\\msedge.exe",
    "C:\\Program Files (x86)\\Microsoft\\Edge\\Application\\msedge.exe",
];

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const CANDIDATES: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/chromium-browser",
    "/usr/bin/chromium",
    "/snap/bin/chromium",
];

/// Probes the per-platform candidate list and returns the first installed
/// executable. Firefox and Safari speak different protocols and are not
/// candidates.
pub fn find_browser() -> Option<PathBuf> {
    find_in(CANDIDATES)
}

/// First existing path among `candidates`, in order.
fn find_in(candidates: &[&str]) -> Option<PathBuf> {
    candidates.iter().map(PathBuf::from).find(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_candidate_list_yields_none() {
        assert_eq!(find_in(&[]), None);
    }

    #[test]
    fn nonexistent_candidates_yield_none() {
        assert_eq!(
            find_in(&["/nonexistent/browser-a", "/nonexistent/browser-b"]),
            None
        );
    }

    #[test]
    fn first_existing_candidate_wins() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("chrome-a");
        let second = dir.path().join("chrome-b");
        std::fs::write(&first, b"").unwrap();
        std::fs::write(&second, b"").unwrap();

        let missing = dir.path().join("missing");
        let candidates = [
            missing.to_str().unwrap(),
            first.to_str().unwrap(),
            second.to_str().unwrap(),
        ];
        assert_eq!(find_in(&candidates), Some(first));
    }

    #[test]
    fn discovered_path_exists() {
        // Environment-dependent: only the postcondition is checkable.
        if let Some(path) = find_browser() {
            assert!(path.exists());
            assert!(path.is_absolute());
        }
    }
}
