use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::adapter::ServiceAdapter;
use crate::config::Config;
use crate::error::{Degradation, ServiceError, StageName};
use crate::types::prompt::PromptContext;
use crate::types::request::AnalysisRequest;
use crate::types::search::SearchHit;

/// 单次分析调用的上下文，克隆之间共享降级记录
#[derive(Clone)]
pub struct GeneratorContext {
    /// 外部服务适配器
    pub adapter: ServiceAdapter,
    /// 配置
    pub config: Config,
    /// 本次分析的请求
    pub request: AnalysisRequest,
    /// 每条检索的结果上限
    pub result_cap: usize,
    /// 整次分析的截止时间
    deadline: Instant,
    /// 各阶段的降级记录
    degradations: Arc<RwLock<Vec<Degradation>>>,
}

impl GeneratorContext {
    pub fn new(
        adapter: ServiceAdapter,
        config: Config,
        request: AnalysisRequest,
        result_cap: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            adapter,
            config,
            request,
            result_cap,
            deadline: Instant::now() + timeout,
            degradations: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn company_name(&self) -> &str {
        self.request.company_name()
    }

    /// 在截止时间约束下检索
    pub async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, ServiceError> {
        self.adapter.search(query, max_results, self.deadline).await
    }

    /// 在截止时间约束下生成
    pub async fn generate(&self, prompt: &PromptContext) -> Result<String, ServiceError> {
        self.adapter.generate(prompt, self.deadline).await
    }

    /// 记录一次降级，报告将被标记为 partial
    pub async fn record_degradation(&self, stage: StageName, reason: impl Into<String>) {
        let degradation = Degradation::new(stage, reason);
        tracing::warn!("⚠️ {} 阶段降级: {}", stage, degradation.reason);
        self.degradations.write().await.push(degradation);
    }

    pub async fn degradations(&self) -> Vec<Degradation> {
        self.degradations.read().await.clone()
    }
}
