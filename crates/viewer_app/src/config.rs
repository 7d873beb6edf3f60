//! Configuration loading for the viewer binary.
//!
//! Defaults, then an optional RON file, then environment variables. The API
//! credential only comes from the environment or a secret file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use viewer_engine::{ApiCredential, CredentialError, EngineConfig, Url};
use viewer_logging::{viewer_debug, viewer_info};

pub const DEFAULT_CONFIG_FILE: &str = "gis_viewer.ron";
pub const DEFAULT_SECRET_DIR: &str = "/run/secrets";
const SECRET_FILE: &str = "gis_api_token";

const ENV_TOKEN: &str = "GIS_API_TOKEN";
const ENV_ENDPOINT: &str = "GIS_API_ENDPOINT";
const ENV_DOWNLOAD_DIR: &str = "GIS_DOWNLOAD_DIR";
const ENV_FONT_PATH: &str = "GIS_FONT_PATH";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("invalid config file {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid endpoint {value:?}: {message}")]
    InvalidEndpoint { value: String, message: String },
    #[error("no API credential: set GIS_API_TOKEN or provide /run/secrets/gis_api_token")]
    MissingCredential,
    #[error("invalid API credential: {0}")]
    InvalidCredential(#[from] CredentialError),
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    endpoint: Option<String>,
    download_dir: Option<PathBuf>,
    font_path: Option<PathBuf>,
    request_timeout_secs: Option<u64>,
    connect_timeout_secs: Option<u64>,
}

/// Where configuration values come from; swapped out in tests.
pub struct Sources<'a> {
    pub config_file: Option<&'a Path>,
    pub secret_dir: &'a Path,
    pub env: &'a dyn Fn(&str) -> Option<String>,
}

pub fn load(sources: &Sources<'_>) -> Result<EngineConfig, ConfigError> {
    let file = match sources.config_file {
        Some(path) => read_file(path)?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.is_file() {
                read_file(default_path)?
            } else {
                FileConfig::default()
            }
        }
    };

    let credential = ApiCredential::new(read_credential(sources)?)?;
    let mut config = EngineConfig::new(credential);

    if let Some(endpoint) = (sources.env)(ENV_ENDPOINT).or(file.endpoint) {
        config.endpoint = endpoint
            .parse::<Url>()
            .map_err(|err| ConfigError::InvalidEndpoint {
                value: endpoint.clone(),
                message: err.to_string(),
            })?;
    }
    if let Some(dir) = (sources.env)(ENV_DOWNLOAD_DIR)
        .map(PathBuf::from)
        .or(file.download_dir)
    {
        config.download_dir = dir;
    }
    if let Some(font) = (sources.env)(ENV_FONT_PATH)
        .map(PathBuf::from)
        .or(file.font_path)
    {
        config.font_path = Some(font);
    }
    if let Some(secs) = file.request_timeout_secs {
        config.request_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = file.connect_timeout_secs {
        config.connect_timeout = Duration::from_secs(secs);
    }

    viewer_info!(
        "Using endpoint {} with downloads in {:?}",
        config.endpoint,
        config.download_dir
    );
    Ok(config)
}

fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    viewer_debug!("Loaded config file {:?}", path);
    ron::from_str(&text).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

fn read_credential(sources: &Sources<'_>) -> Result<String, ConfigError> {
    if let Some(token) = (sources.env)(ENV_TOKEN).filter(|t| !t.trim().is_empty()) {
        return Ok(token);
    }
    let secret_path = sources.secret_dir.join(SECRET_FILE);
    match fs::read_to_string(&secret_path) {
        Ok(token) if !token.trim().is_empty() => {
            viewer_debug!("Read API credential from {:?}", secret_path);
            Ok(token)
        }
        _ => Err(ConfigError::MissingCredential),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn token_from_environment_and_defaults_elsewhere() {
        let temp = tempfile::TempDir::new().unwrap();
        let env = env_from(&[("GIS_API_TOKEN", "abc")]);
        let config_path = temp.path().join("viewer.ron");
        std::fs::write(&config_path, "()").unwrap();

        let config = load(&Sources {
            config_file: Some(&config_path),
            secret_dir: temp.path(),
            env: &env,
        })
        .unwrap();

        assert_eq!(config.credential.expose(), "abc");
        assert_eq!(config.endpoint.as_str(), viewer_engine::DEFAULT_ENDPOINT);
        assert_eq!(config.download_dir, PathBuf::from("downloads"));
        assert_eq!(config.font_path, None);
    }

    #[test]
    fn token_falls_back_to_secret_file() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join(SECRET_FILE), "from-secret\n").unwrap();
        let config_path = temp.path().join("viewer.ron");
        std::fs::write(&config_path, "()").unwrap();
        let env = env_from(&[]);

        let config = load(&Sources {
            config_file: Some(&config_path),
            secret_dir: temp.path(),
            env: &env,
        })
        .unwrap();

        assert_eq!(config.credential.expose(), "from-secret");
    }

    #[test]
    fn missing_token_is_an_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let config_path = temp.path().join("viewer.ron");
        std::fs::write(&config_path, "()").unwrap();
        let env = env_from(&[("GIS_API_TOKEN", "   ")]);

        let err = load(&Sources {
            config_file: Some(&config_path),
            secret_dir: temp.path(),
            env: &env,
        })
        .unwrap_err();

        assert!(matches!(err, ConfigError::MissingCredential));
    }

    #[test]
    fn file_values_apply_and_environment_wins() {
        let temp = tempfile::TempDir::new().unwrap();
        let config_path = temp.path().join("viewer.ron");
        std::fs::write(
            &config_path,
            r#"(
                endpoint: Some("https://staging.example.com/graphql"),
                download_dir: Some("/tmp/cards"),
                font_path: Some("/fonts/Inter.ttf"),
                request_timeout_secs: Some(5),
            )"#,
        )
        .unwrap();
        let env = env_from(&[
            ("GIS_API_TOKEN", "t"),
            ("GIS_DOWNLOAD_DIR", "/srv/cards"),
        ]);

        let config = load(&Sources {
            config_file: Some(&config_path),
            secret_dir: temp.path(),
            env: &env,
        })
        .unwrap();

        assert_eq!(config.endpoint.as_str(), "https://staging.example.com/graphql");
        assert_eq!(config.download_dir, PathBuf::from("/srv/cards"));
        assert_eq!(config.font_path, Some(PathBuf::from("/fonts/Inter.ttf")));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn credential_in_file_is_rejected() {
        let temp = tempfile::TempDir::new().unwrap();
        let config_path = temp.path().join("viewer.ron");
        std::fs::write(&config_path, r#"(api_token: "leaked")"#).unwrap();
        let env = env_from(&[("GIS_API_TOKEN", "t")]);

        let err = load(&Sources {
            config_file: Some(&config_path),
            secret_dir: temp.path(),
            env: &env,
        })
        .unwrap_err();

        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn bad_endpoint_is_reported() {
        let temp = tempfile::TempDir::new().unwrap();
        let config_path = temp.path().join("viewer.ron");
        std::fs::write(&config_path, "()").unwrap();
        let env = env_from(&[("GIS_API_TOKEN", "t"), ("GIS_API_ENDPOINT", "not a url")]);

        let err = load(&Sources {
            config_file: Some(&config_path),
            secret_dir: temp.path(),
            env: &env,
        })
        .unwrap_err();

        assert!(matches!(err, ConfigError::InvalidEndpoint { .. }));
    }
}
