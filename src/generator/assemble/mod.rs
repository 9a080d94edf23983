//! 报告组装：纯函数合并，不做任何I/O

use chrono::{DateTime, Utc};

use crate::error::{Degradation, PipelineError};
use crate::types::classification::Classification;
use crate::types::report::Report;
use crate::types::research::ResearchSummary;
use crate::types::resource::ResourceLink;
use crate::types::use_case::UseCase;

/// 组装所需的全部上游产出
#[derive(Debug, Clone)]
pub struct AssemblyInput {
    pub company_name: String,
    pub classification: Classification,
    pub research: ResearchSummary,
    pub use_cases: Vec<UseCase>,
    pub resources: Vec<ResourceLink>,
    pub degradations: Vec<Degradation>,
}

#[derive(Default)]
pub struct ReportAssembler;

impl ReportAssembler {
    /// 以当前时间组装报告
    pub fn assemble(&self, input: AssemblyInput) -> Result<Report, PipelineError> {
        self.assemble_at(input, Utc::now())
    }

    pub fn assemble_at(
        &self,
        input: AssemblyInput,
        generated_at: DateTime<Utc>,
    ) -> Result<Report, PipelineError> {
        validate_ranks(&input.use_cases)?;

        let AssemblyInput {
            company_name,
            classification,
            research,
            use_cases,
            resources,
            degradations,
        } = input;

        let total = resources.len();
        let mut resources: Vec<ResourceLink> = resources
            .into_iter()
            .filter(|link| match &link.use_case_ref {
                Some(reference) => use_cases.iter().any(|use_case| reference.matches(use_case)),
                None => true,
            })
            .collect();
        if resources.len() < total {
            tracing::debug!("🧹 丢弃 {} 个悬空的数据集引用", total - resources.len());
        }
        // 稳定排序：按场景排名，未关联场景的排在最后
        resources.sort_by_key(|link| {
            link.use_case_ref
                .as_ref()
                .map_or(u32::MAX, |reference| reference.rank)
        });

        Ok(Report {
            company_name,
            classification,
            research,
            use_cases,
            resources,
            generated_at,
            partial: !degradations.is_empty(),
            degradations,
        })
    }
}

/// 场景排名必须恰好为 1..N
fn validate_ranks(use_cases: &[UseCase]) -> Result<(), PipelineError> {
    for (idx, use_case) in use_cases.iter().enumerate() {
        let expected = idx as u32 + 1;
        if use_case.rank != expected {
            return Err(PipelineError::AssemblyInvariantViolation(format!(
                "use case `{}` has rank {}, expected {}",
                use_case.title, use_case.rank, expected
            )));
        }
    }
    Ok(())
}
