use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// LLM Provider类型
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub enum LLMProvider {
    #[serde(rename = "openai")]
    #[default]
    OpenAI,
    #[serde(rename = "deepseek")]
    DeepSeek,
    #[serde(rename = "openrouter")]
    OpenRouter,
    #[serde(rename = "anthropic")]
    Anthropic,
    #[serde(rename = "ollama")]
    Ollama,
}

impl LLMProvider {
    /// 本地模型不需要API KEY
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, LLMProvider::Ollama)
    }
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::DeepSeek => write!(f, "deepseek"),
            LLMProvider::OpenRouter => write!(f, "openrouter"),
            LLMProvider::Anthropic => write!(f, "anthropic"),
            LLMProvider::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for LLMProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(LLMProvider::OpenAI),
            "deepseek" => Ok(LLMProvider::DeepSeek),
            "openrouter" => Ok(LLMProvider::OpenRouter),
            "anthropic" => Ok(LLMProvider::Anthropic),
            "ollama" => Ok(LLMProvider::Ollama),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

/// 报告导出格式
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Markdown,
    Json,
    Html,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Json => "json",
            ExportFormat::Html => "html",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "md" | "markdown" => Ok(ExportFormat::Markdown),
            "json" => Ok(ExportFormat::Json),
            "html" => Ok(ExportFormat::Html),
            _ => Err(format!("Unknown export format: {}", s)),
        }
    }
}

/// 应用程序配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct Config {
    /// 输出路径
    pub output_path: PathBuf,

    /// 每条检索请求返回的最大结果数
    pub result_cap: usize,

    /// 每个场景映射的最大数据集数
    pub resource_cap: usize,

    /// 期望生成的场景数量
    pub use_case_count: usize,

    /// 报告保留的最大场景数量
    pub max_use_cases: usize,

    /// 整次分析的超时时间（秒）
    pub timeout_seconds: u64,

    /// 外部服务最大并发调用数
    pub max_parallels: usize,

    /// 重试次数（含首次调用）
    pub retry_attempts: u32,

    /// 首次重试间隔（毫秒），之后按指数递增
    pub retry_delay_ms: u64,

    /// 导出格式
    pub export_formats: Vec<ExportFormat>,

    /// LLM模型配置
    pub llm: LLMConfig,

    /// 检索服务配置
    pub search: SearchConfig,

    /// 是否启用详细日志
    pub verbose: bool,
}

/// LLM模型配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LLMConfig {
    /// LLM Provider类型
    pub provider: LLMProvider,

    /// LLM API KEY
    pub api_key: String,

    /// LLM API基地址
    pub api_base_url: String,

    /// 模型名称
    pub model: String,

    /// 最大tokens
    pub max_tokens: u32,

    /// 温度
    pub temperature: f64,

    /// 单次调用超时时间（秒）
    pub request_timeout_seconds: u64,
}

/// 检索服务配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    /// 检索服务 API KEY
    pub api_key: String,

    /// 检索服务基地址
    pub api_base_url: String,

    /// 检索类型（neural、keyword、auto）
    pub search_type: String,

    /// 单次调用超时时间（秒）
    pub request_timeout_seconds: u64,
}

impl Config {
    /// 从文件加载配置
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut file =
            File::open(path).context(format!("Failed to open config file: {:?}", path))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// 启动时校验一次，任何阶段运行前完成
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredential("search api key"));
        }
        if self.llm.provider.requires_api_key() && self.llm.api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredential("generation api key"));
        }

        let positive: [(&'static str, u64); 7] = [
            ("result_cap", self.result_cap as u64),
            ("resource_cap", self.resource_cap as u64),
            ("use_case_count", self.use_case_count as u64),
            ("max_use_cases", self.max_use_cases as u64),
            ("timeout_seconds", self.timeout_seconds),
            ("max_parallels", self.max_parallels as u64),
            ("retry_attempts", self.retry_attempts as u64),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidSetting {
                    field,
                    message: "must be greater than zero".to_string(),
                });
            }
        }

        if self.max_use_cases < self.use_case_count {
            return Err(ConfigError::InvalidSetting {
                field: "max_use_cases",
                message: format!(
                    "must not be smaller than use_case_count ({})",
                    self.use_case_count
                ),
            });
        }
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::InvalidSetting {
                field: "llm.model",
                message: "must not be empty".to_string(),
            });
        }
        if self.export_formats.is_empty() {
            return Err(ConfigError::InvalidSetting {
                field: "export_formats",
                message: "at least one format is required".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("./dashie.reports"),
            result_cap: 3,
            resource_cap: 3,
            use_case_count: 5,
            max_use_cases: 10,
            timeout_seconds: 300,
            max_parallels: 4,
            retry_attempts: 3,
            retry_delay_ms: 500,
            export_formats: vec![ExportFormat::Markdown, ExportFormat::Json],
            llm: LLMConfig::default(),
            search: SearchConfig::default(),
            verbose: false,
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::default(),
            api_key: std::env::var("DASHIE_LLM_API_KEY").unwrap_or_default(),
            api_base_url: String::from("https://api.openai.com/v1"),
            model: String::from("gpt-4o-mini"),
            max_tokens: 4096,
            temperature: 0.2,
            request_timeout_seconds: 120,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("DASHIE_SEARCH_API_KEY").unwrap_or_default(),
            api_base_url: String::from("https://api.exa.ai"),
            search_type: String::from("neural"),
            request_timeout_seconds: 30,
        }
    }
}

impl Config {
    /// 默认配置文件位置
    pub fn default_path() -> PathBuf {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join("dashie.toml")
    }
}
