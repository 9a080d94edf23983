//! 行业分类阶段：一次检索 + 一次生成

use crate::error::{StageFailure, StageName};
use crate::generator::context::GeneratorContext;
use crate::generator::types::Stage;
use crate::types::classification::{Classification, Confidence};
use crate::types::prompt::{PromptContext, PromptPurpose};
use crate::types::request::AnalysisRequest;
use crate::types::search::SearchHit;

mod parser;

pub use parser::{ParsedClassification, parse_classification};

#[derive(Default)]
pub struct Classifier;

impl Stage for Classifier {
    type Input = AnalysisRequest;
    type Output = Classification;

    fn name(&self) -> StageName {
        StageName::Classifier
    }

    async fn execute(
        &self,
        context: &GeneratorContext,
        input: &AnalysisRequest,
    ) -> Result<Classification, StageFailure> {
        let company = input.company_name();
        let query = format!("{} industry sector", company);

        let hits = match context.search(&query, context.result_cap).await {
            Ok(hits) => {
                if hits.is_empty() {
                    context
                        .record_degradation(
                            self.name(),
                            "no search results; industry inferred without retrieved facts",
                        )
                        .await;
                }
                hits
            }
            Err(e) => {
                context
                    .record_degradation(self.name(), format!("industry search failed: {}", e))
                    .await;
                Vec::new()
            }
        };

        let confidence = if hits.is_empty() {
            Confidence::Low
        } else {
            Confidence::Normal
        };

        let source_snippets: Vec<String> = hits.iter().map(format_snippet).collect();
        let prompt = build_prompt(company, &source_snippets);
        let raw = context.generate(&prompt).await?;

        let parsed = parse_classification(&raw).ok_or_else(|| {
            StageFailure::Unusable("generation returned no industry label".to_string())
        })?;

        tracing::info!("🏷️ 行业识别完成: {}", parsed.industry);

        Ok(Classification {
            industry: parsed.industry,
            rationale: parsed.rationale,
            confidence,
            source_snippets,
        })
    }
}

fn format_snippet(hit: &SearchHit) -> String {
    if hit.snippet.is_empty() {
        hit.title.clone()
    } else {
        format!("{}: {}", hit.title, hit.snippet)
    }
}

fn build_prompt(company: &str, snippets: &[String]) -> PromptContext {
    let facts = snippets
        .iter()
        .map(|snippet| format!("- {}", snippet))
        .collect::<Vec<_>>()
        .join("\n");

    PromptContext::new(
        PromptPurpose::Classification,
        "You are a market analyst who classifies companies into their primary industry.",
    )
    .opening(format!(
        "Analyze the company {} and determine its primary industry.",
        company
    ))
    .section("Retrieved facts", facts)
    .closing(
        "Respond in exactly this format:\n\
         INDUSTRY: <short industry name, e.g. Electric Vehicles or Cloud Computing>\n\
         RATIONALE: <one paragraph explaining the classification>",
    )
}
