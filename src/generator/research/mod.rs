// 市场调研阶段
// 四个方向的检索并发执行（经由适配层闸门），随后一次生成汇总为结构化摘要。
// 单个方向失败只省略对应字段；全部失败时仍尝试仅凭模型知识生成，并标记数据匮乏。

use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::{BTreeMap, HashSet};

use crate::error::{ServiceError, StageFailure, StageName};
use crate::generator::context::GeneratorContext;
use crate::generator::types::Stage;
use crate::types::classification::Classification;
use crate::types::prompt::{PromptContext, PromptPurpose};
use crate::types::research::{Citation, ResearchSummary};
use crate::types::search::SearchHit;

mod parser;
mod queries;

pub use parser::{ParsedResearch, parse_research};
pub use queries::ResearchQuery;

#[derive(Default)]
pub struct Researcher;

/// 各方向的检索结果，按方向排序
struct SearchOutcomes {
    succeeded: BTreeMap<ResearchQuery, Vec<SearchHit>>,
    failed: BTreeMap<ResearchQuery, ServiceError>,
}

impl Stage for Researcher {
    type Input = Classification;
    type Output = ResearchSummary;

    fn name(&self) -> StageName {
        StageName::Researcher
    }

    async fn execute(
        &self,
        context: &GeneratorContext,
        input: &Classification,
    ) -> Result<ResearchSummary, StageFailure> {
        let outcomes = self.run_searches(context, &input.industry).await;

        // 按方向顺序记录降级，保证多次运行结果一致
        for (query, err) in &outcomes.failed {
            context
                .record_degradation(self.name(), format!("{} search failed: {}", query, err))
                .await;
        }

        let data_scarce = outcomes.succeeded.is_empty();
        if data_scarce {
            tracing::warn!("⚠️ 所有调研检索均失败，尝试仅凭模型知识生成摘要");
        }

        let prompt = build_prompt(context.company_name(), input, &outcomes);
        let raw = context.generate(&prompt).await?;
        let parsed = parse_research(&raw);
        if parsed.is_empty() {
            return Err(StageFailure::Unusable(
                "generation returned no research content".to_string(),
            ));
        }

        let summary = merge_summary(parsed, &outcomes, data_scarce);
        tracing::info!(
            "📈 市场调研完成: {} 条趋势，{} 个竞争对手，{} 个来源",
            summary.trends.len(),
            summary.competitors.len(),
            summary.citations.len()
        );
        Ok(summary)
    }
}

impl Researcher {
    async fn run_searches(&self, context: &GeneratorContext, industry: &str) -> SearchOutcomes {
        let company = context.company_name();
        let mut pending: FuturesUnordered<_> = ResearchQuery::ALL
            .iter()
            .map(|&kind| {
                let query = kind.query(company, industry);
                async move {
                    tracing::debug!("🔍 调研检索: {}", query);
                    (kind, context.search(&query, context.result_cap).await)
                }
            })
            .collect();

        let mut outcomes = SearchOutcomes {
            succeeded: BTreeMap::new(),
            failed: BTreeMap::new(),
        };
        while let Some((kind, result)) = pending.next().await {
            match result {
                Ok(hits) => {
                    outcomes.succeeded.insert(kind, hits);
                }
                Err(err) => {
                    outcomes.failed.insert(kind, err);
                }
            }
        }
        outcomes
    }
}

fn build_prompt(
    company: &str,
    classification: &Classification,
    outcomes: &SearchOutcomes,
) -> PromptContext {
    let mut prompt = PromptContext::new(
        PromptPurpose::ResearchSynthesis,
        "You are a market research analyst who condenses search results into a concise, factual summary.",
    )
    .opening(format!(
        "Summarize the market context of {} in the {} industry using the research material below.",
        company, classification.industry
    ));

    if outcomes.succeeded.is_empty() {
        prompt = prompt.section(
            "Data availability",
            "No search results could be retrieved. Rely on general knowledge and state clearly that source data was scarce.",
        );
    }

    for (kind, hits) in &outcomes.succeeded {
        let body = hits
            .iter()
            .map(|hit| format!("- [{}]({}): {}", hit.title, hit.url, hit.snippet))
            .collect::<Vec<_>>()
            .join("\n");
        prompt = prompt.section(kind.heading(), body);
    }

    prompt.closing(
        "Respond in exactly this format:\n\
         TRENDS:\n\
         - <trend>\n\
         COMPETITORS:\n\
         - <competitor>\n\
         MARKET SIZE: <one sentence, or unknown>",
    )
}

/// 将生成结果与检索结果合并，失败方向对应的字段被省略
fn merge_summary(
    parsed: ParsedResearch,
    outcomes: &SearchOutcomes,
    data_scarce: bool,
) -> ResearchSummary {
    let failed = |kind: ResearchQuery| !data_scarce && outcomes.failed.contains_key(&kind);

    let trends = if failed(ResearchQuery::Trends) && failed(ResearchQuery::Outlook) {
        Vec::new()
    } else {
        parsed.trends
    };
    let competitors = if failed(ResearchQuery::Competitors) {
        Vec::new()
    } else {
        parsed.competitors
    };
    let market_size_note = if failed(ResearchQuery::MarketSize) {
        None
    } else {
        parsed.market_size
    };

    let mut seen = HashSet::new();
    let citations = outcomes
        .succeeded
        .values()
        .flatten()
        .filter(|hit| seen.insert(hit.url.clone()))
        .map(|hit| Citation {
            title: hit.title.clone(),
            url: hit.url.clone(),
        })
        .collect();

    ResearchSummary {
        trends,
        competitors,
        market_size_note,
        citations,
        data_scarce,
    }
}
