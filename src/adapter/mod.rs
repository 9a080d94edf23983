//! 外部服务适配层 - 为检索服务与文本生成服务提供统一接口
//!
//! 适配层负责超时、并发闸门与可重试错误的退避重试，不做任何缓存。

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::Instant;

use crate::config::Config;
use crate::error::{ServiceError, ServiceKind};
use crate::types::prompt::PromptContext;
use crate::types::search::SearchHit;

mod retry;

pub use retry::RetryPolicy;

/// 检索服务
#[async_trait]
pub trait SearchService: Send + Sync {
    async fn search(&self, query: &str, max_results: usize)
    -> Result<Vec<SearchHit>, ServiceError>;
}

/// 文本生成服务
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, prompt: &PromptContext) -> Result<String, ServiceError>;
}

/// 服务适配器，可廉价克隆，克隆之间共享同一个并发闸门
#[derive(Clone)]
pub struct ServiceAdapter {
    search: Arc<dyn SearchService>,
    generation: Arc<dyn GenerationService>,
    gate: Arc<Semaphore>,
    retry_policy: RetryPolicy,
    search_timeout: Duration,
    generation_timeout: Duration,
}

impl ServiceAdapter {
    pub fn new(
        search: Arc<dyn SearchService>,
        generation: Arc<dyn GenerationService>,
        config: &Config,
    ) -> Self {
        Self {
            search,
            generation,
            gate: Arc::new(Semaphore::new(config.max_parallels.max(1))),
            retry_policy: RetryPolicy::from_config(config),
            search_timeout: Duration::from_secs(config.search.request_timeout_seconds.max(1)),
            generation_timeout: Duration::from_secs(config.llm.request_timeout_seconds.max(1)),
        }
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// 当前可用的并发许可数
    pub fn available_permits(&self) -> usize {
        self.gate.available_permits()
    }

    /// 执行检索，`deadline` 为整次分析的截止时间
    pub async fn search(
        &self,
        query: &str,
        max_results: usize,
        deadline: Instant,
    ) -> Result<Vec<SearchHit>, ServiceError> {
        let service = self.search.clone();
        self.call_with_retry(ServiceKind::Search, self.search_timeout, deadline, || {
            let service = service.clone();
            async move { service.search(query, max_results).await }
        })
        .await
    }

    /// 执行生成，`deadline` 为整次分析的截止时间
    pub async fn generate(
        &self,
        prompt: &PromptContext,
        deadline: Instant,
    ) -> Result<String, ServiceError> {
        let service = self.generation.clone();
        self.call_with_retry(
            ServiceKind::Generation,
            self.generation_timeout,
            deadline,
            || {
                let service = service.clone();
                async move { service.generate(prompt).await }
            },
        )
        .await
    }

    /// 通用重试逻辑：闸门准入、超时裁剪、可重试错误指数退避
    async fn call_with_retry<T, F, Fut>(
        &self,
        service: ServiceKind,
        call_timeout: Duration,
        deadline: Instant,
        operation: F,
    ) -> Result<T, ServiceError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        let max_attempts = self.retry_policy.max_attempts;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let result = self
                .attempt_once(service, call_timeout, deadline, &operation)
                .await;

            let err = match result {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !err.is_retryable() {
                tracing::warn!("❌ {} 服务拒绝请求，不再重试: {}", service, err);
                return Err(err);
            }
            if attempt >= max_attempts {
                tracing::warn!("❌ {} 服务调用失败，已尝试 {} 次: {}", service, attempt, err);
                return Err(err);
            }

            let delay = self.retry_policy.delay_for(attempt);
            if Instant::now() + delay >= deadline {
                tracing::warn!("⏱️ {} 服务调用失败，剩余时间不足以重试: {}", service, err);
                return Err(err);
            }

            tracing::debug!(
                "🔄 {} 服务调用出错，{}ms 后重试 (第 {} / {} 次尝试): {}",
                service,
                delay.as_millis(),
                attempt,
                max_attempts,
                err
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn attempt_once<T, F, Fut>(
        &self,
        service: ServiceKind,
        call_timeout: Duration,
        deadline: Instant,
        operation: &F,
    ) -> Result<T, ServiceError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        let _permit = match tokio::time::timeout_at(deadline, self.gate.acquire()).await {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) => {
                return Err(ServiceError::unavailable(service, "concurrency gate closed"));
            }
            Err(_) => {
                return Err(ServiceError::unavailable(
                    service,
                    "analysis deadline reached while waiting for a call slot",
                ));
            }
        };

        let now = Instant::now();
        if now >= deadline {
            return Err(ServiceError::unavailable(service, "analysis deadline reached"));
        }
        let budget = call_timeout.min(deadline - now);

        match tokio::time::timeout(budget, operation()).await {
            Ok(result) => result,
            Err(_) => Err(ServiceError::unavailable(
                service,
                format!("call timed out after {}ms", budget.as_millis()),
            )),
        }
    }
}
