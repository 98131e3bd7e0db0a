//! Generic parameters functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::de::DeserializeOwned;
use std::fs::read_to_string;
use std::path::Path;
use thiserror::Error;
use toml;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An error that occurs during loading of a parameter file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("The software root environment variable (NAV_SW_ROOT) is not set")]
    SwRootNotSet,

    #[error("Cannot load the parmeter file: {0}")]
    FileLoadError(std::io::Error),

    #[error("Cannot read the parameter file: {0}")]
    DeserialiseError(toml::de::Error),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Load a parameter file
///
/// The file path is relative to the "params" directory in the software root.
pub fn load<P>(param_file_path: &str) -> Result<P, LoadError>
where
    P: DeserializeOwned,
{
    // Get the params dir
    let mut path = crate::host::get_sw_root().map_err(|_| LoadError::SwRootNotSet)?;
    path.push("params");
    path.push(param_file_path);

    load_from_path(path)
}

/// Load a parameter file from anywhere on disk.
pub fn load_from_path<P, F>(path: F) -> Result<P, LoadError>
where
    P: DeserializeOwned,
    F: AsRef<Path>,
{
    let params_str = read_to_string(path).map_err(LoadError::FileLoadError)?;

    toml::from_str(params_str.as_str()).map_err(LoadError::DeserialiseError)
}

#[cfg(test)]
mod test {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, Debug, PartialEq)]
    struct TestParams {
        gain: f64,
        points: Vec<[f64; 2]>,
    }

    #[test]
    fn test_load_from_path() {
        let path = std::env::temp_dir().join("util_params_test_load_from_path.toml");
        std::fs::write(&path, "gain = 0.3\npoints = [[0.0, 0.3], [0.3, 0.3]]\n").unwrap();

        let params: TestParams = load_from_path(&path).unwrap();
        assert_eq!(
            params,
            TestParams {
                gain: 0.3,
                points: vec![[0.0, 0.3], [0.3, 0.3]]
            }
        );

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_errors() {
        let missing = std::env::temp_dir().join("util_params_test_does_not_exist.toml");
        assert!(matches!(
            load_from_path::<TestParams, _>(&missing),
            Err(LoadError::FileLoadError(_))
        ));

        let path = std::env::temp_dir().join("util_params_test_bad.toml");
        std::fs::write(&path, "gain = \"fast\"\n").unwrap();
        assert!(matches!(
            load_from_path::<TestParams, _>(&path),
            Err(LoadError::DeserialiseError(_))
        ));
        std::fs::remove_file(&path).ok();
    }
}
