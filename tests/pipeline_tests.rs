mod common;

use chrono::Utc;
use common::*;
use dashie_rs::adapter::ServiceAdapter;
use dashie_rs::error::{
    ConfigError, PipelineError, ServiceError, ServiceKind, StageFailure, StageName,
};
use dashie_rs::generator::assemble::{AssemblyInput, ReportAssembler};
use dashie_rs::generator::pipeline::{AnalysisOptions, AnalysisPipeline};
use dashie_rs::types::classification::Confidence;
use dashie_rs::types::prompt::PromptPurpose;
use dashie_rs::types::resource::ResourceLink;
use dashie_rs::types::use_case::{UseCase, UseCaseRef};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn options() -> AnalysisOptions {
    AnalysisOptions {
        result_cap: 3,
        timeout_seconds: 30,
    }
}

#[tokio::test]
async fn test_full_run_produces_complete_report() {
    let search = Arc::new(ScriptedSearch::new());
    let generation = Arc::new(ScriptedGeneration::healthy());
    let pipeline = build_pipeline(test_config(), search.clone(), generation.clone());

    let report = pipeline.run_analysis("  Tesla ", options()).await.unwrap();

    assert_eq!(report.company_name, "Tesla");
    assert!(!report.partial);
    assert!(report.degradations.is_empty());
    assert_eq!(report.classification.industry, "Electric Vehicles");
    assert_eq!(report.classification.confidence, Confidence::Normal);
    assert_eq!(report.research.trends.len(), 2);
    assert_eq!(report.research.competitors, vec!["BYD", "Volkswagen"]);
    assert!(report.research.market_size_note.is_some());
    assert_eq!(report.research.citations.len(), 8);

    let ranks: Vec<u32> = report.use_cases.iter().map(|u| u.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3]);

    // two dataset hits per use case, grouped by rank
    assert_eq!(report.resources.len(), 6);
    let resource_ranks: Vec<u32> = report
        .resources
        .iter()
        .map(|link| link.use_case_ref.as_ref().unwrap().rank)
        .collect();
    assert_eq!(resource_ranks, vec![1, 1, 2, 2, 3, 3]);
    assert_eq!(report.resources[0].provider.as_deref(), Some("Kaggle"));

    // one classification search, four research searches, one per use case
    assert_eq!(search.queries().len(), 1 + 4 + 3);
    assert_eq!(generation.total_calls(), 3);
}

#[tokio::test]
async fn test_market_size_failure_degrades_report() {
    let search = Arc::new(
        ScriptedSearch::new().fail_on("market size", unavailable_search("gateway timeout")),
    );
    let generation = Arc::new(ScriptedGeneration::healthy());
    let pipeline = build_pipeline(test_config(), search.clone(), generation);

    let report = pipeline.run_analysis("Tesla", options()).await.unwrap();

    assert!(report.partial);
    assert_eq!(report.classification.industry, "Electric Vehicles");
    assert!(!report.use_cases.is_empty());
    assert_eq!(report.research.market_size_note, None);
    assert_eq!(report.research.competitors, vec!["BYD", "Volkswagen"]);
    assert_eq!(report.degradations.len(), 1);
    assert_eq!(report.degradations[0].stage, StageName::Researcher);
    assert!(report.degradations[0].reason.starts_with("market size search failed"));

    // transient failure retried up to the attempt bound
    assert_eq!(search.count_matching("market size"), 3);
}

#[tokio::test]
async fn test_classification_failure_is_terminal() {
    let search = Arc::new(ScriptedSearch::new());
    let generation = Arc::new(
        ScriptedGeneration::healthy()
            .fail(PromptPurpose::Classification, unavailable_generation("overloaded")),
    );
    let pipeline = build_pipeline(test_config(), search.clone(), generation.clone());

    let err = pipeline.run_analysis("Tesla", options()).await.unwrap_err();

    match &err {
        PipelineError::ClassificationFailed { cause, partial } => {
            assert!(matches!(
                cause,
                StageFailure::Service(ServiceError::Unavailable { .. })
            ));
            assert!(partial.classification.is_none());
            assert!(partial.research.is_none());
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(generation.calls(PromptPurpose::Classification), 3);
    assert_eq!(generation.calls(PromptPurpose::ResearchSynthesis), 0);
    // no stage after classification issued a search
    assert_eq!(search.queries().len(), 1);
}

#[tokio::test]
async fn test_rejected_generation_is_not_retried() {
    let search = Arc::new(ScriptedSearch::new());
    let generation = Arc::new(ScriptedGeneration::healthy().fail(
        PromptPurpose::Classification,
        ServiceError::rejected(ServiceKind::Generation, "invalid api key"),
    ));
    let pipeline = build_pipeline(test_config(), search, generation.clone());

    let err = pipeline.run_analysis("Tesla", options()).await.unwrap_err();

    assert!(matches!(err, PipelineError::ClassificationFailed { .. }));
    assert_eq!(generation.calls(PromptPurpose::Classification), 1);
}

#[tokio::test]
async fn test_duplicate_use_cases_are_reranked() {
    let reply = "1. Title: Predictive Maintenance\n   Description: Telemetry based.\n2. Title:  predictive   MAINTENANCE \n   Description: Same idea again.\n3. Title: Demand Forecasting\n   Description: Regional demand.";
    let search = Arc::new(ScriptedSearch::new());
    let generation =
        Arc::new(ScriptedGeneration::healthy().reply(PromptPurpose::UseCases, reply));
    let pipeline = build_pipeline(test_config(), search.clone(), generation);

    let report = pipeline.run_analysis("Tesla", options()).await.unwrap();

    let titles: Vec<(u32, &str)> = report
        .use_cases
        .iter()
        .map(|u| (u.rank, u.title.as_str()))
        .collect();
    assert_eq!(
        titles,
        vec![(1, "Predictive Maintenance"), (2, "Demand Forecasting")]
    );
    assert_eq!(search.count_matching(" dataset"), 2);
    assert!(report
        .resources
        .iter()
        .all(|link| link.use_case_ref.as_ref().unwrap().rank <= 2));
}

#[tokio::test]
async fn test_unparseable_use_cases_retry_with_strict_prompt() {
    let search = Arc::new(ScriptedSearch::new());
    let generation = Arc::new(
        ScriptedGeneration::healthy()
            .reply(PromptPurpose::UseCases, "AI could help in many ways."),
    );
    let pipeline = build_pipeline(test_config(), search, generation.clone());

    let report = pipeline.run_analysis("Tesla", options()).await.unwrap();

    assert_eq!(report.use_cases.len(), 3);
    assert_eq!(generation.calls(PromptPurpose::UseCases), 1);
    assert_eq!(generation.calls(PromptPurpose::UseCasesStrict), 1);
}

#[tokio::test]
async fn test_use_case_failure_carries_prior_results() {
    let search = Arc::new(ScriptedSearch::new());
    let generation = Arc::new(
        ScriptedGeneration::healthy()
            .reply(PromptPurpose::UseCases, "nothing useful")
            .reply(PromptPurpose::UseCasesStrict, "still nothing"),
    );
    let pipeline = build_pipeline(test_config(), search, generation);

    let err = pipeline.run_analysis("Tesla", options()).await.unwrap_err();

    match err {
        PipelineError::UseCaseGenerationFailed { cause, partial } => {
            assert!(matches!(cause, StageFailure::Unusable(_)));
            assert_eq!(
                partial.classification.unwrap().industry,
                "Electric Vehicles"
            );
            assert_eq!(partial.research.unwrap().competitors.len(), 2);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_all_research_searches_failing_marks_data_scarce() {
    let search = Arc::new(
        ScriptedSearch::new()
            .fail_on("overview and trends", unavailable_search("down"))
            .fail_on("competitors in", unavailable_search("down"))
            .fail_on("market size", unavailable_search("down"))
            .fail_on("future outlook", unavailable_search("down")),
    );
    let generation = Arc::new(ScriptedGeneration::healthy());
    let pipeline = build_pipeline(test_config(), search, generation.clone());

    let report = pipeline.run_analysis("Tesla", options()).await.unwrap();

    assert!(report.partial);
    assert!(report.research.data_scarce);
    assert!(report.research.citations.is_empty());
    assert_eq!(report.research.trends.len(), 2);
    let stages: Vec<StageName> = report.degradations.iter().map(|d| d.stage).collect();
    assert_eq!(stages, vec![StageName::Researcher; 4]);
    assert_eq!(generation.calls(PromptPurpose::ResearchSynthesis), 1);
}

#[tokio::test]
async fn test_dataset_lookup_failure_is_isolated() {
    let search = Arc::new(ScriptedSearch::new().fail_on(
        "Battery Health Forecasting dataset",
        ServiceError::rejected(ServiceKind::Search, "HTTP 400"),
    ));
    let generation = Arc::new(ScriptedGeneration::healthy());
    let pipeline = build_pipeline(test_config(), search, generation);

    let report = pipeline.run_analysis("Tesla", options()).await.unwrap();

    assert!(report.partial);
    assert_eq!(report.use_cases.len(), 3);
    assert_eq!(report.resources_for(1).count(), 2);
    assert_eq!(report.resources_for(2).count(), 0);
    assert_eq!(report.resources_for(3).count(), 2);
    assert_eq!(report.degradations.len(), 1);
    assert_eq!(report.degradations[0].stage, StageName::ResourceMapper);
}

#[tokio::test]
async fn test_resources_follow_rank_when_lookups_finish_out_of_order() {
    let search = Arc::new(
        ScriptedSearch::new()
            .delay_on("Predictive Maintenance dataset", Duration::from_millis(300))
            .delay_on("Battery Health Forecasting dataset", Duration::from_millis(150)),
    );
    let generation = Arc::new(ScriptedGeneration::healthy());
    let pipeline = build_pipeline(test_config(), search, generation);

    let report = pipeline.run_analysis("Tesla", options()).await.unwrap();

    assert!(!report.partial);
    let resource_ranks: Vec<u32> = report
        .resources
        .iter()
        .map(|link| link.use_case_ref.as_ref().unwrap().rank)
        .collect();
    assert_eq!(resource_ranks, vec![1, 1, 2, 2, 3, 3]);
    assert!(report.resources[0].dataset_name.starts_with("Predictive Maintenance"));
}

#[tokio::test]
async fn test_deadline_returns_partial_report_without_resources() {
    let search = Arc::new(ScriptedSearch::new().delay_on(" dataset", Duration::from_secs(5)));
    let generation = Arc::new(ScriptedGeneration::healthy());
    let pipeline = build_pipeline(test_config(), search, generation);

    let started = Instant::now();
    let report = pipeline
        .run_analysis(
            "Tesla",
            AnalysisOptions {
                result_cap: 3,
                timeout_seconds: 1,
            },
        )
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(4));
    assert!(report.partial);
    assert_eq!(report.use_cases.len(), 3);
    assert!(report.resources.is_empty());
    assert_eq!(report.degradations.len(), 3);
    assert!(
        report
            .degradations
            .iter()
            .all(|d| d.stage == StageName::ResourceMapper)
    );
}

#[tokio::test]
async fn test_empty_classification_search_lowers_confidence() {
    let search = Arc::new(
        ScriptedSearch::new().on("industry sector", SearchScript::Hits(vec![])),
    );
    let generation = Arc::new(ScriptedGeneration::healthy());
    let pipeline = build_pipeline(test_config(), search, generation);

    let report = pipeline.run_analysis("Tesla", options()).await.unwrap();

    assert_eq!(report.classification.confidence, Confidence::Low);
    assert!(report.classification.source_snippets.is_empty());
    assert!(report.partial);
    assert_eq!(report.degradations[0].stage, StageName::Classifier);
}

#[tokio::test]
async fn test_reruns_are_equal_except_timestamp() {
    let run = || async {
        let search = Arc::new(
            ScriptedSearch::new().fail_on("competitors in", unavailable_search("rate limited")),
        );
        let generation = Arc::new(ScriptedGeneration::healthy());
        build_pipeline(test_config(), search, generation)
            .run_analysis("Tesla", options())
            .await
            .unwrap()
    };

    let first = run().await;
    let mut second = run().await;
    second.generated_at = first.generated_at;

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_blank_company_name_is_rejected() {
    let pipeline = build_pipeline(
        test_config(),
        Arc::new(ScriptedSearch::new()),
        Arc::new(ScriptedGeneration::healthy()),
    );

    let err = pipeline.run_analysis("   ", options()).await.unwrap_err();
    assert!(matches!(err, PipelineError::InvalidRequest(_)));
}

#[test]
fn test_missing_credentials_fail_at_construction() {
    let mut config = test_config();
    config.search.api_key = String::new();
    let adapter = ServiceAdapter::new(
        Arc::new(ScriptedSearch::new()),
        Arc::new(ScriptedGeneration::healthy()),
        &config,
    );

    let result = AnalysisPipeline::new(config, adapter);
    assert_eq!(
        result.err(),
        Some(ConfigError::MissingCredential("search api key"))
    );
}

#[test]
fn test_link_to_deduplicated_use_case_is_dropped() {
    let use_cases = vec![
        UseCase {
            title: "Predictive Maintenance".to_string(),
            description: "Telemetry".to_string(),
            impact_rationale: String::new(),
            rank: 1,
        },
        UseCase {
            title: "Demand Forecasting".to_string(),
            description: "Regional demand".to_string(),
            impact_rationale: String::new(),
            rank: 2,
        },
    ];
    let link = |rank: u32, title: &str| ResourceLink {
        use_case_ref: Some(UseCaseRef {
            rank,
            title: title.to_string(),
        }),
        dataset_name: format!("{} data", title),
        url: format!("https://data.example/{}", rank),
        provider: None,
    };

    let report = ReportAssembler
        .assemble_at(
            AssemblyInput {
                company_name: "Tesla".to_string(),
                classification: dashie_rs::types::classification::Classification {
                    industry: "Electric Vehicles".to_string(),
                    rationale: String::new(),
                    confidence: Confidence::Normal,
                    source_snippets: vec![],
                },
                research: Default::default(),
                use_cases,
                // rank 2 once pointed at a duplicate that dedup removed
                resources: vec![
                    link(2, "Predictive maintenance"),
                    link(1, "Predictive Maintenance"),
                ],
                degradations: vec![],
            },
            Utc::now(),
        )
        .unwrap();

    assert_eq!(report.resources.len(), 1);
    assert_eq!(report.resources[0].dataset_name, "Predictive Maintenance data");
    assert!(!report.partial);
}
