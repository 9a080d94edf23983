use crate::error::{ServiceError, ServiceKind};

/// 不可重试的错误特征（鉴权、权限、模型不存在等）
const REJECTION_MARKERS: [&str; 9] = [
    "401",
    "403",
    "unauthorized",
    "forbidden",
    "invalid api key",
    "invalid_api_key",
    "incorrect api key",
    "authentication",
    "model_not_found",
];

/// 将provider错误文本归类为可重试或不可重试
pub fn classify_provider_error(message: &str) -> ServiceError {
    let lowered = message.to_lowercase();
    if REJECTION_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
    {
        ServiceError::rejected(ServiceKind::Generation, message)
    } else {
        ServiceError::unavailable(ServiceKind::Generation, message)
    }
}
