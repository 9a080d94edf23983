use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::use_case::UseCaseRef;

/// 映射到场景的公开数据集
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ResourceLink {
    pub use_case_ref: Option<UseCaseRef>,
    pub dataset_name: String,
    pub url: String,
    pub provider: Option<String>,
}
