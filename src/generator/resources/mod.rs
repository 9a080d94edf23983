//! 数据集映射阶段：每个场景一次检索，互相独立，失败只影响自身

use futures::stream::{FuturesUnordered, StreamExt};

use crate::error::{ServiceError, StageFailure, StageName};
use crate::generator::context::GeneratorContext;
use crate::generator::types::Stage;
use crate::types::resource::ResourceLink;
use crate::types::search::SearchHit;
use crate::types::use_case::UseCase;

mod provider;

pub use provider::{detect_provider, is_dataset_url};

/// 检索时多取的倍数，过滤掉非数据集链接后仍能凑满上限
const OVERFETCH_FACTOR: usize = 3;

#[derive(Default)]
pub struct ResourceMapper;

impl Stage for ResourceMapper {
    type Input = Vec<UseCase>;
    type Output = Vec<ResourceLink>;

    fn name(&self) -> StageName {
        StageName::ResourceMapper
    }

    /// 该阶段不会失败：检索失败的场景得到零条数据集并记录降级
    async fn execute(
        &self,
        context: &GeneratorContext,
        input: &Vec<UseCase>,
    ) -> Result<Vec<ResourceLink>, StageFailure> {
        let cap = context.config.resource_cap;
        tracing::info!(
            "📚 为 {} 个场景检索数据集，最大并发数：{}",
            input.len(),
            context.config.max_parallels
        );

        let mut pending: FuturesUnordered<_> = input
            .iter()
            .map(|use_case| async move {
                let query = format!("{} dataset", use_case.title);
                (use_case, context.search(&query, cap * OVERFETCH_FACTOR).await)
            })
            .collect();

        let mut lookups: Vec<(&UseCase, Result<Vec<SearchHit>, ServiceError>)> = Vec::new();
        while let Some(lookup) = pending.next().await {
            lookups.push(lookup);
        }
        // 结果按场景排名排序，与完成顺序无关
        lookups.sort_by_key(|(use_case, _)| use_case.rank);

        let mut links = Vec::new();
        for (use_case, result) in lookups {
            match result {
                Ok(hits) => links.extend(to_links(use_case, hits, cap)),
                Err(err) => {
                    context
                        .record_degradation(
                            self.name(),
                            format!(
                                "dataset lookup for use case {} failed: {}",
                                use_case.rank, err
                            ),
                        )
                        .await;
                }
            }
        }

        tracing::info!("🔗 共映射 {} 个数据集", links.len());
        Ok(links)
    }
}

/// 只保留数据集链接，每个场景最多 `cap` 条
fn to_links(use_case: &UseCase, hits: Vec<SearchHit>, cap: usize) -> Vec<ResourceLink> {
    hits.into_iter()
        .filter(|hit| is_dataset_url(&hit.url))
        .take(cap)
        .map(|hit| ResourceLink {
            use_case_ref: Some(use_case.reference()),
            provider: detect_provider(&hit.url),
            dataset_name: hit.title,
            url: hit.url,
        })
        .collect()
}
