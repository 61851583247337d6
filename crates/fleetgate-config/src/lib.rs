pub mod error;

pub use error::*;

use std::path::{Path, PathBuf};

/// Environment variable naming a topology file directly
pub const CONFIG_PATH_ENV: &str = "FLEETGATE_CONFIG_PATH";

const CANDIDATES: [&str; 2] = ["fleetgate.local.yaml", "fleetgate.yaml"];

/// fleetgate's per-user config directory (`~/.config/fleetgate`)
pub fn get_config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("fleetgate"))
}

/// Find the topology file
///
/// Search order:
/// 1. `FLEETGATE_CONFIG_PATH` (direct path)
/// 2. current directory: fleetgate.local.yaml, fleetgate.yaml
/// 3. `./.fleetgate/` directory, same order
/// 4. `~/.config/fleetgate/fleetgate.yaml` (global)
pub fn find_config_file() -> Result<PathBuf> {
    // 1. explicit path
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
    }

    let current_dir = std::env::current_dir()?;

    // 2. current directory
    if let Some(path) = find_in(&current_dir) {
        return Ok(path);
    }

    // 3. ./.fleetgate/
    let local_dir = current_dir.join(".fleetgate");
    if local_dir.is_dir() {
        if let Some(path) = find_in(&local_dir) {
            return Ok(path);
        }
    }

    // 4. global
    if let Ok(config_dir) = get_config_dir() {
        let global_config = config_dir.join("fleetgate.yaml");
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::ConfigFileNotFound)
}

fn find_in(dir: &Path) -> Option<PathBuf> {
    CANDIDATES
        .iter()
        .map(|filename| dir.join(filename))
        .find(|path| path.exists())
}

/// Read a topology file
pub fn read_config_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()));
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Read the topology file from `explicit` if given, otherwise from
/// discovery. `Ok(None)` means no file exists and defaults apply.
pub fn load_config_source(explicit: Option<&Path>) -> Result<Option<(PathBuf, String)>> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match find_config_file() {
            Ok(path) => path,
            Err(ConfigError::ConfigFileNotFound) => return Ok(None),
            Err(e) => return Err(e),
        },
    };
    let content = read_config_file(&path)?;
    Ok(Some((path, content)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    fn test_get_config_dir() {
        let config_dir = get_config_dir().unwrap();
        assert!(config_dir.ends_with("fleetgate"));
    }

    #[test]
    #[serial]
    fn test_find_config_file_in_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        fs::write(temp_dir.path().join("fleetgate.yaml"), "backend_count: 3").unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let result = find_config_file();
        std::env::set_current_dir(original_dir).unwrap();

        assert!(result.unwrap().ends_with("fleetgate.yaml"));
    }

    #[test]
    #[serial]
    fn test_local_file_has_priority() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        fs::write(temp_dir.path().join("fleetgate.yaml"), "# shared").unwrap();
        fs::write(temp_dir.path().join("fleetgate.local.yaml"), "# local").unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let result = find_config_file();
        std::env::set_current_dir(original_dir).unwrap();

        // fleetgate.local.yaml wins
        assert!(result.unwrap().ends_with("fleetgate.local.yaml"));
    }

    #[test]
    #[serial]
    fn test_find_config_file_in_dot_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        let dot_dir = temp_dir.path().join(".fleetgate");
        fs::create_dir(&dot_dir).unwrap();
        fs::write(dot_dir.join("fleetgate.yaml"), "# in dot dir").unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let result = find_config_file();
        std::env::set_current_dir(original_dir).unwrap();

        assert!(result.unwrap().ends_with(".fleetgate/fleetgate.yaml"));
    }

    #[test]
    #[serial]
    fn test_find_config_file_env_var() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("custom.yaml");
        fs::write(&config_path, "region: ams3").unwrap();

        unsafe {
            std::env::set_var(CONFIG_PATH_ENV, config_path.to_str().unwrap());
        }

        let result = find_config_file();

        unsafe {
            std::env::remove_var(CONFIG_PATH_ENV);
        }

        assert_eq!(result.unwrap(), config_path);
    }

    #[test]
    #[serial]
    fn test_no_file_means_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let result = load_config_source(None);
        std::env::set_current_dir(original_dir).unwrap();

        // a global ~/.config/fleetgate/fleetgate.yaml on the test machine
        // would be found here, so only reject an error
        assert!(result.is_ok());
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = load_config_source(Some(&temp_dir.path().join("nope.yaml")));
        assert!(matches!(result, Err(ConfigError::MissingFile(_))));
    }

    #[test]
    fn test_explicit_file_is_read() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("topology.yaml");
        fs::write(&path, "bastion_count: 2").unwrap();

        let (found, content) = load_config_source(Some(&path)).unwrap().unwrap();
        assert_eq!(found, path);
        assert_eq!(content, "bastion_count: 2");
    }
}
