//! 场景生成阶段：一次生成，解析失败时以更严格的格式要求重试一次

use crate::error::{StageFailure, StageName};
use crate::generator::context::GeneratorContext;
use crate::generator::types::Stage;
use crate::types::classification::Classification;
use crate::types::prompt::{PromptContext, PromptPurpose};
use crate::types::research::ResearchSummary;
use crate::types::use_case::UseCase;

mod parser;

pub use parser::{ParsedUseCase, parse_use_cases, rank_use_cases};

/// 场景生成所需的上游产出
#[derive(Debug, Clone)]
pub struct UseCaseBrief {
    pub classification: Classification,
    pub research: ResearchSummary,
}

#[derive(Default)]
pub struct UseCaseGenerator;

impl Stage for UseCaseGenerator {
    type Input = UseCaseBrief;
    type Output = Vec<UseCase>;

    fn name(&self) -> StageName {
        StageName::UseCaseGenerator
    }

    async fn execute(
        &self,
        context: &GeneratorContext,
        input: &UseCaseBrief,
    ) -> Result<Vec<UseCase>, StageFailure> {
        let count = context.config.use_case_count;
        let company = context.company_name();

        let raw = context
            .generate(&build_prompt(company, input, count, false))
            .await?;
        let mut parsed = parse_use_cases(&raw);

        if parsed.is_empty() {
            tracing::warn!("⚠️ 场景生成结果无法解析，使用严格格式要求重试一次");
            let raw = context
                .generate(&build_prompt(company, input, count, true))
                .await?;
            parsed = parse_use_cases(&raw);
        }

        if parsed.is_empty() {
            return Err(StageFailure::Unusable(
                "no well-formed use cases in generated output".to_string(),
            ));
        }

        let use_cases = rank_use_cases(parsed, context.config.max_use_cases);
        tracing::info!("💡 生成 {} 个AI/ML应用场景", use_cases.len());
        Ok(use_cases)
    }
}

fn build_prompt(company: &str, brief: &UseCaseBrief, count: usize, strict: bool) -> PromptContext {
    let research = &brief.research;
    let mut context_lines = vec![format!("Industry: {}", brief.classification.industry)];
    if !brief.classification.rationale.is_empty() {
        context_lines.push(format!("Industry rationale: {}", brief.classification.rationale));
    }
    if !research.trends.is_empty() {
        context_lines.push(format!("Trends: {}", research.trends.join("; ")));
    }
    if !research.competitors.is_empty() {
        context_lines.push(format!("Competitors: {}", research.competitors.join(", ")));
    }
    if let Some(note) = &research.market_size_note {
        context_lines.push(format!("Market size: {}", note));
    }

    let (purpose, closing) = if strict {
        (
            PromptPurpose::UseCasesStrict,
            format!(
                "Your previous answer could not be parsed. Output ONLY a numbered list of {count} items and nothing else, no introduction and no summary. Every item MUST use exactly these three labelled lines:\n\
                 1. Title: <title>\n   Description: <description>\n   Impact: <expected impact>"
            ),
        )
    } else {
        (
            PromptPurpose::UseCases,
            format!(
                "Give {count} distinct use cases, ranked from most to least valuable. Avoid code and implementation details. Use this format for every item:\n\
                 1. Title: <title>\n   Description: <description>\n   Impact: <expected impact>"
            ),
        )
    };

    PromptContext::new(
        purpose,
        "You are an AI strategy consultant who proposes specific, actionable AI/ML use cases.",
    )
    .opening(format!(
        "Based on the analysis of {} in the {} industry, propose innovative AI/ML use cases focused on operational efficiency, customer experience and technological innovation.",
        company, brief.classification.industry
    ))
    .section("Research insights", context_lines.join("\n"))
    .closing(closing)
}
