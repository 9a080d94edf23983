use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// 引用来源
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Citation {
    pub title: String,
    pub url: String,
}

/// 市场调研摘要
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ResearchSummary {
    pub trends: Vec<String>,
    pub competitors: Vec<String>,
    pub market_size_note: Option<String>,
    pub citations: Vec<Citation>,
    /// 所有检索均失败，摘要仅来自模型自身知识
    #[serde(default)]
    pub data_scarce: bool,
}
