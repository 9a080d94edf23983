use crate::config::{Config, ExportFormat, LLMProvider};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

/// Dashie-RS - 由Rust与AI驱动的企业AI战略分析引擎
#[derive(Parser, Debug)]
#[command(name = "dashie-rs")]
#[command(
    about = "AI-driven strategy analysis for a company: industry classification, market research, ranked AI/ML use cases and matching public datasets."
)]
#[command(version)]
pub struct Args {
    /// 公司名称
    pub company: String,

    /// 输出路径
    #[arg(short, long)]
    pub output_path: Option<PathBuf>,

    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 每条检索的结果上限
    #[arg(long)]
    pub result_cap: Option<usize>,

    /// 每个场景的数据集上限
    #[arg(long)]
    pub resource_cap: Option<usize>,

    /// 期望生成的场景数量
    #[arg(long = "use-cases")]
    pub use_cases: Option<usize>,

    /// 整次分析的超时时间（秒）
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// 外部服务的最大并发数
    #[arg(long)]
    pub max_parallels: Option<usize>,

    /// LLM Provider (openai, deepseek, openrouter, anthropic, ollama)
    #[arg(long)]
    pub llm_provider: Option<String>,

    /// LLM API KEY
    #[arg(long)]
    pub llm_api_key: Option<String>,

    /// LLM API基地址
    #[arg(long)]
    pub llm_api_base_url: Option<String>,

    /// 模型名称
    #[arg(long)]
    pub model: Option<String>,

    /// 检索服务 API KEY
    #[arg(long)]
    pub search_api_key: Option<String>,

    /// 检索服务基地址
    #[arg(long)]
    pub search_api_base_url: Option<String>,

    /// 导出格式 (md, json, html)，可多次指定
    #[arg(long = "format")]
    pub formats: Vec<String>,

    /// 是否启用详细日志
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// 将CLI参数转换为配置
    pub fn into_config(self) -> Result<Config> {
        let mut config = if let Some(config_path) = &self.config {
            // 显式指定的配置文件必须可读
            Config::from_file(config_path)
                .context(format!("无法读取配置文件 {:?}", config_path))?
        } else {
            // 尝试从默认位置加载
            let default_config_path = Config::default_path();
            if default_config_path.exists() {
                Config::from_file(&default_config_path)
                    .context(format!("无法读取默认配置文件 {:?}", default_config_path))?
            } else {
                Config::default()
            }
        };

        if let Some(output_path) = self.output_path {
            config.output_path = output_path;
        }
        if let Some(result_cap) = self.result_cap {
            config.result_cap = result_cap;
        }
        if let Some(resource_cap) = self.resource_cap {
            config.resource_cap = resource_cap;
        }
        if let Some(use_cases) = self.use_cases {
            config.use_case_count = use_cases;
            config.max_use_cases = config.max_use_cases.max(use_cases);
        }
        if let Some(timeout_seconds) = self.timeout_seconds {
            config.timeout_seconds = timeout_seconds;
        }
        if let Some(max_parallels) = self.max_parallels {
            config.max_parallels = max_parallels;
        }

        // 覆盖LLM配置
        if let Some(provider_str) = self.llm_provider {
            config.llm.provider = provider_str
                .parse::<LLMProvider>()
                .map_err(anyhow::Error::msg)?;
        }
        if let Some(llm_api_key) = self.llm_api_key {
            config.llm.api_key = llm_api_key;
        }
        if let Some(llm_api_base_url) = self.llm_api_base_url {
            config.llm.api_base_url = llm_api_base_url;
        }
        if let Some(model) = self.model {
            config.llm.model = model;
        }

        // 覆盖检索配置
        if let Some(search_api_key) = self.search_api_key {
            config.search.api_key = search_api_key;
        }
        if let Some(search_api_base_url) = self.search_api_base_url {
            config.search.api_base_url = search_api_base_url;
        }

        if !self.formats.is_empty() {
            config.export_formats = self
                .formats
                .iter()
                .map(|format| format.parse::<ExportFormat>().map_err(anyhow::Error::msg))
                .collect::<Result<Vec<_>>>()?;
        }

        config.verbose = config.verbose || self.verbose;

        Ok(config)
    }
}
