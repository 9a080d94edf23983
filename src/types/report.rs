use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::Degradation;
use crate::types::classification::Classification;
use crate::types::research::ResearchSummary;
use crate::types::resource::ResourceLink;
use crate::types::use_case::UseCase;

/// 最终报告，组装完成后不可变，导出时按值复制
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Report {
    pub company_name: String,
    pub classification: Classification,
    pub research: ResearchSummary,
    pub use_cases: Vec<UseCase>,
    pub resources: Vec<ResourceLink>,
    pub generated_at: DateTime<Utc>,
    /// 任一阶段降级即为 true
    pub partial: bool,
    pub degradations: Vec<Degradation>,
}

impl Report {
    /// 指定场景下的数据集，保持报告内顺序
    pub fn resources_for(&self, rank: u32) -> impl Iterator<Item = &ResourceLink> {
        self.resources.iter().filter(move |link| {
            link.use_case_ref
                .as_ref()
                .is_some_and(|reference| reference.rank == rank)
        })
    }

    /// 未关联任何场景的数据集
    pub fn unreferenced_resources(&self) -> impl Iterator<Item = &ResourceLink> {
        self.resources
            .iter()
            .filter(|link| link.use_case_ref.is_none())
    }

    pub fn source_count(&self) -> usize {
        self.research.citations.len()
    }
}
