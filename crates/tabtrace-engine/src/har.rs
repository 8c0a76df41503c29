//! HAR export stub. Captured traffic is not converted yet; this writes a
//! valid but empty HAR 1.2 document so downstream tooling has something to
//! open. Full conversion is a deferred external feature.

use std::fs;
use std::io;
use std::path::Path;

pub fn export_har(path: &Path) -> io::Result<()> {
    let har = serde_json::json!({
        "log": {
            "version": "1.2",
            "creator": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            },
            "entries": [],
        }
    });
    let text = serde_json::to_string_pretty(&har).map_err(io::Error::from)?;
    fs::write(path, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_an_empty_har_skeleton() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.har");
        export_har(&path).unwrap();

        let doc: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc["log"]["version"], "1.2");
        assert_eq!(doc["log"]["entries"].as_array().unwrap().len(), 0);
    }
}
