use serde_derive::Deserialize;
use serde_derive::Serialize;

use log::{error, warn};
use std::fs::File;
use std::io::prelude::*;

use crate::param::{
    BLOCK_BUF_SIZE, LINE_BUF_SIZE, MAX_REQUEST_BODY_LENGTH, SERVER_NAME, SERVER_VERSION,
};

/// 选择内置的 Content-Type 策略
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContentTypeMode {
    /// 对所有文件返回同一个占位类型
    Placeholder,
    /// 按扩展名查表
    Extension,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default = "default_server_name")]
    server_name: String,
    #[serde(default = "default_server_version")]
    server_version: String,
    #[serde(default = "default_chunk_size")]
    chunk_size: usize,
    #[serde(default = "default_max_body_length")]
    max_body_length: u64,
    #[serde(default = "default_max_line_length")]
    max_line_length: usize,
    #[serde(default)]
    confine_to_docroot: bool,
    #[serde(default = "default_content_type")]
    content_type: ContentTypeMode,
}

fn default_server_name() -> String {
    SERVER_NAME.to_string()
}

fn default_server_version() -> String {
    SERVER_VERSION.to_string()
}

fn default_chunk_size() -> usize {
    BLOCK_BUF_SIZE
}

fn default_max_body_length() -> u64 {
    MAX_REQUEST_BODY_LENGTH
}

fn default_max_line_length() -> usize {
    LINE_BUF_SIZE
}

fn default_content_type() -> ContentTypeMode {
    ContentTypeMode::Placeholder
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            server_name: default_server_name(),
            server_version: default_server_version(),
            chunk_size: default_chunk_size(),
            max_body_length: default_max_body_length(),
            max_line_length: default_max_line_length(),
            confine_to_docroot: false,
            content_type: default_content_type(),
        }
    }

    /// 从 TOML 文本构建配置，未出现的字段取默认值。
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        let mut raw_config: Config = toml::from_str(s)?;
        if raw_config.chunk_size == 0 {
            warn!("chunk_size被设置为0，这会导致无法传输文件，因此该值将被改为{}。", BLOCK_BUF_SIZE);
            raw_config.chunk_size = BLOCK_BUF_SIZE;
        }
        if raw_config.max_line_length < 2 {
            warn!("max_line_length过小，该值将被改为{}。", LINE_BUF_SIZE);
            raw_config.max_line_length = LINE_BUF_SIZE;
        }
        Ok(raw_config)
    }

    /// 读取配置文件。文件不存在或无法解析时使用默认配置。
    pub fn from_toml(filename: &str) -> Self {
        let mut file = match File::open(filename) {
            Ok(f) => f,
            Err(e) => {
                warn!("无法打开配置文件{}：{}，使用默认配置", filename, e);
                return Config::new();
            }
        };
        let mut str_val = String::new();
        if let Err(e) = file.read_to_string(&mut str_val) {
            error!("读取配置文件{}时出错：{}，使用默认配置", filename, e);
            return Config::new();
        }

        match Config::from_toml_str(&str_val) {
            Ok(c) => c,
            Err(e) => {
                error!("无法成功从配置文件构建配置对象：{}，使用默认配置", e);
                Config::new()
            }
        }
    }
}

impl Config {
    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    pub fn server_version(&self) -> &str {
        &self.server_version
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn max_body_length(&self) -> u64 {
        self.max_body_length
    }

    pub fn max_line_length(&self) -> usize {
        self.max_line_length
    }

    pub fn confine_to_docroot(&self) -> bool {
        self.confine_to_docroot
    }

    pub fn content_type(&self) -> ContentTypeMode {
        self.content_type
    }

    pub fn with_max_body_length(mut self, limit: u64) -> Self {
        self.max_body_length = limit;
        self
    }

    pub fn with_confine_to_docroot(mut self, confine: bool) -> Self {
        self.confine_to_docroot = confine;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::new();
        assert_eq!(config.server_name(), "LittleHTTP");
        assert_eq!(config.server_version(), "1.0");
        assert_eq!(config.chunk_size(), 1024);
        assert_eq!(config.max_body_length(), 1048576);
        assert_eq!(config.max_line_length(), 4096);
        assert!(!config.confine_to_docroot());
        assert_eq!(config.content_type(), ContentTypeMode::Placeholder);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.chunk_size(), 1024);
        assert_eq!(config.server_name(), "LittleHTTP");
    }

    #[test]
    fn test_partial_toml() {
        let config = Config::from_toml_str(
            r#"
            server_name = "Tiny"
            chunk_size = 4096
            confine_to_docroot = true
            content_type = "extension"
            "#,
        )
        .unwrap();
        assert_eq!(config.server_name(), "Tiny");
        assert_eq!(config.server_version(), "1.0");
        assert_eq!(config.chunk_size(), 4096);
        assert!(config.confine_to_docroot());
        assert_eq!(config.content_type(), ContentTypeMode::Extension);
    }

    #[test]
    fn test_zero_chunk_size_is_replaced() {
        let config = Config::from_toml_str("chunk_size = 0").unwrap();
        assert_eq!(config.chunk_size(), BLOCK_BUF_SIZE);
    }

    #[test]
    fn test_invalid_content_type_mode() {
        assert!(Config::from_toml_str(r#"content_type = "magic""#).is_err());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = Config::from_toml("/nonexistent/littlehttp.toml");
        assert_eq!(config.max_body_length(), MAX_REQUEST_BODY_LENGTH);
    }
}
