//! 统一错误类型
//!
//! 适配层错误区分可重试与不可重试两类，阶段级错误决定流水线是中止还是降级。

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::classification::Classification;
use crate::types::research::ResearchSummary;

/// 外部服务种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceKind {
    Search,
    Generation,
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceKind::Search => write!(f, "search"),
            ServiceKind::Generation => write!(f, "generation"),
        }
    }
}

/// 外部服务调用错误
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ServiceError {
    /// 暂时不可用（网络故障、限流、超时、响应格式错误），可重试
    #[error("{service} service unavailable: {message}")]
    Unavailable { service: ServiceKind, message: String },

    /// 被服务拒绝（鉴权失败、请求非法），不可重试
    #[error("{service} service rejected the request: {message}")]
    Rejected { service: ServiceKind, message: String },
}

impl ServiceError {
    pub fn unavailable(service: ServiceKind, message: impl Into<String>) -> Self {
        ServiceError::Unavailable {
            service,
            message: message.into(),
        }
    }

    pub fn rejected(service: ServiceKind, message: impl Into<String>) -> Self {
        ServiceError::Rejected {
            service,
            message: message.into(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, ServiceError::Unavailable { .. })
    }
}

/// 单个阶段无法产出结果的原因
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StageFailure {
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// 服务返回了内容，但无法得到可用结果
    #[error("unusable output: {0}")]
    Unusable(String),
}

/// 流水线名义上的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
pub enum StageName {
    Classifier,
    Researcher,
    UseCaseGenerator,
    ResourceMapper,
    ReportAssembler,
}

impl std::fmt::Display for StageName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            StageName::Classifier => "classifier",
            StageName::Researcher => "researcher",
            StageName::UseCaseGenerator => "use-case generator",
            StageName::ResourceMapper => "resource mapper",
            StageName::ReportAssembler => "report assembler",
        };
        write!(f, "{}", str)
    }
}

/// 降级记录，任意一条存在即表示报告为 partial
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Degradation {
    pub stage: StageName,
    pub reason: String,
}

impl Degradation {
    pub fn new(stage: StageName, reason: impl Into<String>) -> Self {
        Self {
            stage,
            reason: reason.into(),
        }
    }
}

/// 终止时已完成阶段的产出，供诊断展示
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialState {
    pub classification: Option<Classification>,
    pub research: Option<ResearchSummary>,
    pub degradations: Vec<Degradation>,
}

/// 流水线终止错误
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid analysis request: {0}")]
    InvalidRequest(String),

    #[error("industry classification failed: {cause}")]
    ClassificationFailed {
        cause: StageFailure,
        partial: Box<PartialState>,
    },

    #[error("market research failed: {cause}")]
    ResearchFailed {
        cause: StageFailure,
        partial: Box<PartialState>,
    },

    #[error("use-case generation failed: {cause}")]
    UseCaseGenerationFailed {
        cause: StageFailure,
        partial: Box<PartialState>,
    },

    /// 内部缺陷，正确运行时不应出现
    #[error("report assembly invariant violated: {0}")]
    AssemblyInvariantViolation(String),
}

impl PipelineError {
    /// 已完成阶段的产出（如有）
    pub fn partial_state(&self) -> Option<&PartialState> {
        match self {
            PipelineError::ClassificationFailed { partial, .. }
            | PipelineError::ResearchFailed { partial, .. }
            | PipelineError::UseCaseGenerationFailed { partial, .. } => Some(partial),
            PipelineError::InvalidRequest(_) | PipelineError::AssemblyInvariantViolation(_) => {
                None
            }
        }
    }
}

/// 启动期配置错误
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("invalid setting `{field}`: {message}")]
    InvalidSetting {
        field: &'static str,
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(ServiceError::unavailable(ServiceKind::Search, "429").is_retryable());
        assert!(!ServiceError::rejected(ServiceKind::Generation, "401").is_retryable());
    }

    #[test]
    fn test_partial_state_exposed_on_terminal_errors() {
        let err = PipelineError::ResearchFailed {
            cause: StageFailure::Unusable("empty".to_string()),
            partial: Box::new(PartialState {
                degradations: vec![Degradation::new(StageName::Classifier, "no hits")],
                ..Default::default()
            }),
        };
        assert_eq!(err.partial_state().unwrap().degradations.len(), 1);
        assert!(PipelineError::InvalidRequest("empty".into()).partial_state().is_none());
    }

    #[test]
    fn test_error_display() {
        let err = ServiceError::rejected(ServiceKind::Search, "invalid api key");
        assert_eq!(
            err.to_string(),
            "search service rejected the request: invalid api key"
        );
    }
}
