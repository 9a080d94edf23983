use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// AI/ML 应用场景
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UseCase {
    pub title: String,
    pub description: String,
    pub impact_rationale: String,
    /// 从1开始，报告内唯一
    pub rank: u32,
}

impl UseCase {
    pub fn reference(&self) -> UseCaseRef {
        UseCaseRef {
            rank: self.rank,
            title: self.title.clone(),
        }
    }
}

/// 通过排名和标题引用一个场景，不持有所有权
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UseCaseRef {
    pub rank: u32,
    pub title: String,
}

impl UseCaseRef {
    pub fn matches(&self, use_case: &UseCase) -> bool {
        self.rank == use_case.rank
            && normalize_title(&self.title) == normalize_title(&use_case.title)
    }
}

/// 标题归一化：小写，连续空白折叠为单个空格
pub fn normalize_title(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
