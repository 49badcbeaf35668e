//! Module for locating crowdpad configuration and data files

use std::path::PathBuf;

use crate::constants::{DATA_FILE, FALLBACK_CONFIG_PATH, FALLBACK_DATA_PATH, SETTINGS_FILE};

/// Returns the base path for configuration data
pub fn get_base_path() -> PathBuf {
    let Ok(base_dirs) = xdg::BaseDirectories::with_prefix("crowdpad") else {
        log::warn!("Unable to determine config base path. Using fallback path.");
        return PathBuf::from(FALLBACK_CONFIG_PATH);
    };

    // Get the data directories in preference order
    let data_dirs = base_dirs.get_data_dirs();
    for dir in data_dirs {
        if dir.exists() {
            return dir;
        }
    }

    log::warn!("Config base path not found. Using fallback path.");
    PathBuf::from(FALLBACK_CONFIG_PATH)
}

/// Returns the paths to search for the settings file, in load order.
/// E.g. ["./rootfs/usr/share/crowdpad/crowdpad.yaml", "/etc/crowdpad/crowdpad.yaml"]
pub fn get_settings_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("./rootfs/usr/share/crowdpad").join(SETTINGS_FILE),
        PathBuf::from("/etc/crowdpad").join(SETTINGS_FILE),
        get_base_path().join(SETTINGS_FILE),
    ]
}

/// Returns the first settings file that exists, if any.
pub fn find_settings() -> Option<PathBuf> {
    get_settings_paths().into_iter().find(|path| path.exists())
}

/// Returns the path where persistent bot data should be read and written.
/// Prefers a writable XDG data location and falls back to a system path.
pub fn get_data_path() -> PathBuf {
    let Ok(base_dirs) = xdg::BaseDirectories::with_prefix("crowdpad") else {
        log::warn!("Unable to determine data path. Using fallback path.");
        return PathBuf::from(FALLBACK_DATA_PATH).join(DATA_FILE);
    };

    match base_dirs.place_data_file(DATA_FILE) {
        Ok(path) => path,
        Err(e) => {
            log::warn!("Unable to create data directory: {e:?}. Using fallback path.");
            PathBuf::from(FALLBACK_DATA_PATH).join(DATA_FILE)
        }
    }
}
