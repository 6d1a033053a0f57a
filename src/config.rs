//! 配置模块
//!
//! 支持从 JSON 文件加载系统配置，API_KEY 环境变量优先于文件中的值

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use url::Url;

use crate::services::futures::SHFE_BASE_URL;

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
    /// 工作线程数（0 表示使用 CPU 核心数）
    #[serde(default)]
    pub workers: usize,
}

/// API 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API Key（为空则不启用认证）
    #[serde(default)]
    pub api_key: String,
    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// 连接超时时间（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 日志级别: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// 数据源配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// 交易日历文件（YYYYMMDD 字符串数组）
    #[serde(default = "default_calendar_path")]
    pub calendar_path: String,
    /// 上期所网站根地址
    #[serde(default = "default_shfe_base_url")]
    pub shfe_base_url: String,
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub data: DataConfig,
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_timeout() -> u64 { 30 }
fn default_connect_timeout() -> u64 { 10 }
fn default_log_level() -> String { "info".to_string() }
fn default_calendar_path() -> String { "data/calendar.json".to_string() }
fn default_shfe_base_url() -> String { SHFE_BASE_URL.to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: 0,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            calendar_path: default_calendar_path(),
            shfe_base_url: default_shfe_base_url(),
        }
    }
}

impl AppConfig {
    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// 加载配置，优先从文件，失败则使用默认值
    ///
    /// 日志系统此时尚未初始化，加载结果通过返回的提示信息在初始化后输出
    pub fn load() -> (Self, String) {
        let config_paths = ["config.json", "config/config.json"];

        let (mut config, note) = config_paths
            .iter()
            .filter(|path| Path::new(path).exists())
            .find_map(|path| match Self::from_file(path) {
                Ok(config) => Some((config, format!("从 {} 加载配置成功", path))),
                Err(e) => {
                    eprintln!("加载配置文件 {} 失败: {}", path, e);
                    None
                }
            })
            .unwrap_or_else(|| (Self::default(), "使用默认配置".to_string()));

        config.apply_env(std::env::var("API_KEY").ok());
        (config, note)
    }

    /// 环境变量中的 API Key 覆盖配置文件
    fn apply_env(&mut self, api_key: Option<String>) {
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            self.api.api_key = key;
        }
    }

    /// 校验数据源地址
    pub fn validate(&self) -> anyhow::Result<()> {
        let url = Url::parse(&self.data.shfe_base_url)
            .with_context(|| format!("无效的上期所地址: {}", self.data.shfe_base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("上期所地址必须是 http(s): {}", self.data.shfe_base_url);
        }
        Ok(())
    }

    /// 获取服务器绑定地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
