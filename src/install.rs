//! Native messaging host registration
//!
//! Browsers find the host through a JSON manifest in a per-browser
//! directory. `--install` writes one manifest per browser that has an
//! allow-list entry, `--uninstall` removes them again. User scope only;
//! Windows needs registry keys and is not handled here.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{BridgeError, Result};

/// Name the extension connects to
pub const HOST_NAME: &str = "com.example.browsertocalc";

pub const HOST_DESCRIPTION: &str = "Stores browser entries in a spreadsheet";

const CHROME_ORIGIN_SCHEME: &str = "chrome-extension://";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Browser {
    Chrome,
    Chromium,
    Firefox,
}

impl Browser {
    pub const ALL: [Browser; 3] = [Self::Chrome, Self::Chromium, Self::Firefox];

    fn uses_origins(self) -> bool {
        !matches!(self, Self::Firefox)
    }

    /// User-scope manifest directory below `home`
    #[cfg(target_os = "linux")]
    pub fn manifest_dir(self, home: &Path) -> Result<PathBuf> {
        Ok(match self {
            Self::Chrome => home.join(".config/google-chrome/NativeMessagingHosts"),
            Self::Chromium => home.join(".config/chromium/NativeMessagingHosts"),
            Self::Firefox => home.join(".mozilla/native-messaging-hosts"),
        })
    }

    /// User-scope manifest directory below `home`
    #[cfg(target_os = "macos")]
    pub fn manifest_dir(self, home: &Path) -> Result<PathBuf> {
        let support = home.join("Library/Application Support");
        Ok(match self {
            Self::Chrome => support.join("Google/Chrome/NativeMessagingHosts"),
            Self::Chromium => support.join("Chromium/NativeMessagingHosts"),
            Self::Firefox => support.join("Mozilla/NativeMessagingHosts"),
        })
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    pub fn manifest_dir(self, _home: &Path) -> Result<PathBuf> {
        Err(BridgeError::Install(
            "manifest registration is only supported on Linux and macOS".to_string(),
        ))
    }

    pub fn manifest_path(self, home: &Path) -> Result<PathBuf> {
        Ok(self.manifest_dir(home)?.join(format!("{}.json", HOST_NAME)))
    }
}

/// Contents of `com.example.browsertocalc.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostManifest {
    pub name: String,
    pub description: String,
    pub path: PathBuf,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_origins: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_extensions: Option<Vec<String>>,
}

/// Extensions allowed to talk to the host
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallOptions {
    /// Chrome/Chromium extension ids or `chrome-extension://<id>/` origins
    pub chrome_origins: Vec<String>,
    /// Firefox extension ids (`name@example.com`)
    pub firefox_ids: Vec<String>,
}

/// Accept a bare id or a full origin; always emit `chrome-extension://<id>/`
pub fn normalize_chrome_origin(origin: &str) -> String {
    let id = origin
        .trim()
        .trim_start_matches(CHROME_ORIGIN_SCHEME)
        .trim_end_matches('/');
    format!("{}{}/", CHROME_ORIGIN_SCHEME, id)
}

impl HostManifest {
    /// Manifest for `browser`, or None when it has nothing on its allow-list
    pub fn for_browser(browser: Browser, exe: &Path, options: &InstallOptions) -> Option<Self> {
        let (allowed_origins, allowed_extensions) = if browser.uses_origins() {
            if options.chrome_origins.is_empty() {
                return None;
            }
            let origins = options
                .chrome_origins
                .iter()
                .map(|o| normalize_chrome_origin(o))
                .collect();
            (Some(origins), None)
        } else {
            if options.firefox_ids.is_empty() {
                return None;
            }
            (None, Some(options.firefox_ids.clone()))
        };

        Some(Self {
            name: HOST_NAME.to_string(),
            description: HOST_DESCRIPTION.to_string(),
            path: exe.to_path_buf(),
            kind: "stdio".to_string(),
            allowed_origins,
            allowed_extensions,
        })
    }
}

/// User home, the base for all manifest directories
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .ok_or_else(|| BridgeError::Install("cannot determine the home directory".to_string()))
}

/// Write manifests below `home` pointing at `exe`. Returns the written paths.
pub fn install(home: &Path, exe: &Path, options: &InstallOptions) -> Result<Vec<PathBuf>> {
    if options.chrome_origins.is_empty() && options.firefox_ids.is_empty() {
        return Err(BridgeError::Install(
            "pass at least one --chrome-origin or --firefox-id".to_string(),
        ));
    }

    let mut written = Vec::new();
    for browser in Browser::ALL {
        let Some(manifest) = HostManifest::for_browser(browser, exe, options) else {
            warn!(?browser, "No allowed extensions for browser, skipping");
            continue;
        };
        let path = browser.manifest_path(home)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&path, serde_json::to_vec_pretty(&manifest)?)?;
        info!(event_type = "host_installed", ?browser, path = %path.display(), "Wrote host manifest");
        written.push(path);
    }
    Ok(written)
}

/// Remove manifests below `home`. Returns the removed paths.
pub fn uninstall(home: &Path) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for browser in Browser::ALL {
        let path = browser.manifest_path(home)?;
        if path.exists() {
            fs::remove_file(&path)?;
            info!(event_type = "host_uninstalled", ?browser, path = %path.display(), "Removed host manifest");
            removed.push(path);
        }
    }
    Ok(removed)
}

#[cfg(all(test, any(target_os = "linux", target_os = "macos")))]
mod tests {
    use super::*;

    fn options() -> InstallOptions {
        InstallOptions {
            chrome_origins: vec!["abcdefghijklmnop".to_string()],
            firefox_ids: vec!["calc-bridge@example.com".to_string()],
        }
    }

    #[test]
    fn test_normalize_chrome_origin() {
        assert_eq!(normalize_chrome_origin("abc"), "chrome-extension://abc/");
        assert_eq!(
            normalize_chrome_origin("chrome-extension://abc/"),
            "chrome-extension://abc/"
        );
    }

    #[test]
    fn test_manifest_shape_per_browser() {
        let exe = Path::new("/opt/calc-bridge/calc-bridge");
        let chrome = HostManifest::for_browser(Browser::Chrome, exe, &options()).unwrap();
        let json = serde_json::to_value(&chrome).unwrap();
        assert_eq!(json["name"], HOST_NAME);
        assert_eq!(json["type"], "stdio");
        assert_eq!(json["path"], "/opt/calc-bridge/calc-bridge");
        assert_eq!(json["allowed_origins"][0], "chrome-extension://abcdefghijklmnop/");
        assert!(json.get("allowed_extensions").is_none());

        let firefox = HostManifest::for_browser(Browser::Firefox, exe, &options()).unwrap();
        assert_eq!(
            firefox.allowed_extensions,
            Some(vec!["calc-bridge@example.com".to_string()])
        );
        assert_eq!(firefox.allowed_origins, None);
    }

    #[test]
    fn test_install_then_uninstall() {
        let home = tempfile::tempdir().unwrap();
        let exe = Path::new("/usr/local/bin/calc-bridge");

        let written = install(home.path(), exe, &options()).unwrap();
        assert_eq!(written.len(), 3);
        for path in &written {
            let manifest: HostManifest =
                serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
            assert_eq!(manifest.path, exe);
            assert!(path.ends_with(format!("{}.json", HOST_NAME)));
        }

        let removed = uninstall(home.path()).unwrap();
        assert_eq!(removed, written);
        assert!(written.iter().all(|p| !p.exists()));
        assert!(uninstall(home.path()).unwrap().is_empty());
    }

    #[test]
    fn test_install_skips_browsers_without_allow_list() {
        let home = tempfile::tempdir().unwrap();
        let only_firefox = InstallOptions {
            chrome_origins: Vec::new(),
            firefox_ids: vec!["x@example.com".to_string()],
        };
        let written = install(home.path(), Path::new("/bin/host"), &only_firefox).unwrap();
        assert_eq!(written, vec![Browser::Firefox.manifest_path(home.path()).unwrap()]);
    }

    #[test]
    fn test_install_without_any_allow_list_fails() {
        let home = tempfile::tempdir().unwrap();
        let err = install(home.path(), Path::new("/bin/host"), &InstallOptions::default())
            .unwrap_err();
        assert!(matches!(err, BridgeError::Install(_)));
    }
}
