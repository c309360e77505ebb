// Store location resolution

use eyre::{Result, eyre};
use std::path::{Path, PathBuf};

/// Environment variable that overrides the store file location
pub const STORE_FILE_ENV: &str = "PATTERNBASE_FILE";

const STORE_DIR: &str = ".patternbase";
const STORE_FILE: &str = "patterns.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub store_file: PathBuf,
}

impl Config {
    /// Use the explicit path if given, otherwise `~/.patternbase/patterns.json`
    pub fn resolve(explicit: Option<PathBuf>) -> Result<Self> {
        let store_file = match explicit {
            Some(path) => path,
            None => {
                let home = dirs::home_dir().ok_or_else(|| {
                    eyre!(
                        "Could not determine home directory; set {} or pass --file",
                        STORE_FILE_ENV
                    )
                })?;
                default_store_file(&home)
            }
        };
        Ok(Self { store_file })
    }
}

/// Default store file under a given home directory
pub fn default_store_file(home: &Path) -> PathBuf {
    home.join(STORE_DIR).join(STORE_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_store_file() {
        let path = default_store_file(Path::new("/home/someone"));
        assert_eq!(path, PathBuf::from("/home/someone/.patternbase/patterns.json"));
    }

    #[test]
    fn test_explicit_path_wins() {
        let config = Config::resolve(Some(PathBuf::from("/tmp/custom.json"))).unwrap();
        assert_eq!(config.store_file, PathBuf::from("/tmp/custom.json"));
    }
}
