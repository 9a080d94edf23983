//! LLM客户端 - 基于 rig 的文本生成服务实现

use anyhow::Result;
use async_trait::async_trait;

use crate::adapter::GenerationService;
use crate::config::LLMConfig;
use crate::error::ServiceError;
use crate::types::prompt::PromptContext;

mod providers;
pub mod utils;

use providers::ProviderClient;
use utils::classify_provider_error;

/// LLM客户端，重试、超时与并发控制由适配层负责
#[derive(Clone)]
pub struct LLMClient {
    config: LLMConfig,
    client: ProviderClient,
}

impl LLMClient {
    /// 创建新的LLM客户端
    pub fn new(config: LLMConfig) -> Result<Self> {
        let client = ProviderClient::new(&config)?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl GenerationService for LLMClient {
    async fn generate(&self, prompt: &PromptContext) -> Result<String, ServiceError> {
        let agent =
            self.client
                .create_agent(&self.config.model, &prompt.system_prompt, &self.config);
        let user_prompt = prompt.render_user_prompt();

        tracing::debug!(
            "🧠 调用模型 {} ({:?})，提示词长度 {}",
            self.config.model,
            prompt.purpose,
            user_prompt.len()
        );

        agent
            .prompt(&user_prompt)
            .await
            .map_err(|message| classify_provider_error(&message))
    }
}
