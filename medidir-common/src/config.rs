//! Configuration loading and root folder resolution
//!
//! The root folder holds everything the service persists: the SQLite
//! database file and the uploaded photo files.

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Database file name inside the root folder
const DATABASE_FILE: &str = "medidir.db";

/// Uploads directory name inside the root folder
const UPLOADS_DIR: &str = "uploads";

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. `MEDIDIR_ROOT_FOLDER` environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>) -> Result<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Ok(PathBuf::from(path));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var("MEDIDIR_ROOT_FOLDER") {
        return Ok(PathBuf::from(path));
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = load_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(root_folder) = config.get("root_folder").and_then(|v| v.as_str()) {
                    return Ok(PathBuf::from(root_folder));
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    Ok(get_default_root_folder())
}

/// Create the root folder and its uploads subdirectory if missing
pub fn ensure_root_folder(root: &Path) -> Result<()> {
    std::fs::create_dir_all(root)?;
    std::fs::create_dir_all(root.join(UPLOADS_DIR))?;
    Ok(())
}

/// Path of the SQLite database file inside the root folder
pub fn database_path(root: &Path) -> PathBuf {
    root.join(DATABASE_FILE)
}

/// Path of the uploads directory inside the root folder
pub fn uploads_dir(root: &Path) -> PathBuf {
    root.join(UPLOADS_DIR)
}

/// Get default configuration file path for the platform
fn load_config_file() -> Result<PathBuf> {
    let config_path = if cfg!(target_os = "linux") {
        // Try ~/.config/medidir/config.toml first, then /etc/medidir/config.toml
        let user_config = dirs::config_dir().map(|d| d.join("medidir").join("config.toml"));
        let system_config = PathBuf::from("/etc/medidir/config.toml");

        if let Some(path) = user_config {
            if path.exists() {
                return Ok(path);
            }
        }
        if system_config.exists() {
            return Ok(system_config);
        }
        return Err(Error::Config("No config file found".to_string()));
    } else {
        dirs::config_dir()
            .map(|d| d.join("medidir").join("config.toml"))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?
    };

    if config_path.exists() {
        Ok(config_path)
    } else {
        Err(Error::Config(format!(
            "Config file not found: {:?}",
            config_path
        )))
    }
}

/// Get OS-dependent default root folder path
fn get_default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        dirs::data_local_dir()
            .map(|d| d.join("medidir"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/medidir"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("medidir"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/medidir"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("medidir"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\medidir"))
    } else {
        PathBuf::from("./medidir_data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_argument_takes_priority() {
        let root = resolve_root_folder(Some("/tmp/medidir-test")).unwrap();
        assert_eq!(root, PathBuf::from("/tmp/medidir-test"));
    }

    #[test]
    fn derived_paths_live_under_root() {
        let root = PathBuf::from("/data/medidir");
        assert_eq!(database_path(&root), root.join("medidir.db"));
        assert_eq!(uploads_dir(&root), root.join("uploads"));
    }

    #[test]
    fn ensure_root_folder_creates_uploads() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path().join("nested").join("root");

        ensure_root_folder(&root).unwrap();

        assert!(root.is_dir());
        assert!(root.join("uploads").is_dir());
    }
}
