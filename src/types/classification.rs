use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// 行业判定的可信度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    #[default]
    Normal,
    /// 没有检索到任何事实，仅凭模型自身知识判定
    Low,
}

/// 行业分类结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Classification {
    pub industry: String,
    pub rationale: String,
    pub confidence: Confidence,
    pub source_snippets: Vec<String>,
}

impl Classification {
    pub fn is_low_confidence(&self) -> bool {
        self.confidence == Confidence::Low
    }
}
