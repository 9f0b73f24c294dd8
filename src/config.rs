use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::metadata::{MetadataError, ModelFile};
use crate::predict::DatasetModel;

/// 기본 설정 파일 이름(작업 디렉터리 기준).
pub const DEFAULT_CONFIG_FILE: &str = "dafd.toml";

/// 애플리케이션 설정을 표현한다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 언어 코드(auto/en-us/ko-kr 등)
    pub language: String,
    /// 언어팩 TOML 디렉터리
    pub language_pack_dir: Option<String>,
    /// 모델 파일 경로. 없으면 내장 모델을 사용한다.
    pub model_path: Option<String>,
    /// 로그 레벨(trace/debug/info/warn/error). RUST_LOG가 있으면 그쪽이 우선한다.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: "auto".to_string(),
            language_pack_dir: None,
            model_path: None,
            log_level: "info".to_string(),
        }
    }
}

/// 설정 로드/저장 시 발생 가능한 오류를 표현한다.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("파일 입출력 오류: {0}")]
    Io(#[from] std::io::Error),
    #[error("설정 파싱 오류: {0}")]
    Serde(#[from] toml::de::Error),
    #[error("설정 직렬화 오류: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// dafd.toml을 로드하거나 없으면 기본 설정을 생성한다.
pub fn load_or_default() -> Result<Config, ConfigError> {
    load_or_create(Path::new(DEFAULT_CONFIG_FILE))
}

/// 지정 경로의 설정을 로드한다. 파일이 없으면 기본값을 그 경로에 저장한다.
pub fn load_or_create(path: &Path) -> Result<Config, ConfigError> {
    if path.exists() {
        let content = fs::read_to_string(path)?;
        let cfg: Config = toml::from_str(&content)?;
        Ok(cfg)
    } else {
        let cfg = Config::default();
        cfg.save_to(path)?;
        Ok(cfg)
    }
}

impl Config {
    /// 설정을 지정 경로에 TOML로 저장한다.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn model_path(&self) -> Option<PathBuf> {
        self.model_path.as_deref().map(PathBuf::from)
    }

    /// 설정된 모델 파일(없으면 내장 모델)로 예측 모델을 만든다.
    pub fn load_model(&self) -> Result<DatasetModel, MetadataError> {
        let file = match self.model_path() {
            Some(path) => {
                tracing::info!(path = %path.display(), "loading model file");
                ModelFile::load(&path)?
            }
            None => ModelFile::built_in()?,
        };
        DatasetModel::from_model_file(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_creates_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dafd.toml");
        let cfg = load_or_create(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn saved_config_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dafd.toml");
        let cfg = Config {
            language: "ko-kr".into(),
            model_path: Some("models/chip.toml".into()),
            ..Config::default()
        };
        cfg.save_to(&path).unwrap();
        assert_eq!(load_or_create(&path).unwrap(), cfg);
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dafd.toml");
        fs::write(&path, "log_level = \"debug\"\n").unwrap();
        let cfg = load_or_create(&path).unwrap();
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.language, "auto");
        assert!(cfg.model_path.is_none());
    }

    #[test]
    fn default_config_loads_built_in_model() {
        let model = Config::default().load_model().unwrap();
        assert!(!model.is_empty());
    }
}
