//! Scripted search and generation services for driving the pipeline in tests.

#![allow(dead_code)]

use async_trait::async_trait;
use dashie_rs::adapter::{GenerationService, SearchService, ServiceAdapter};
use dashie_rs::config::Config;
use dashie_rs::error::{ServiceError, ServiceKind};
use dashie_rs::generator::pipeline::AnalysisPipeline;
use dashie_rs::types::prompt::{PromptContext, PromptPurpose};
use dashie_rs::types::search::SearchHit;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub const CLASSIFICATION_REPLY: &str =
    "INDUSTRY: Electric Vehicles\nRATIONALE: Designs and sells battery electric cars and energy storage.";

pub const RESEARCH_REPLY: &str = "TRENDS:\n- Falling battery costs\n- Autonomous driving\nCOMPETITORS:\n- BYD\n- Volkswagen\nMARKET SIZE: Roughly 500 billion USD in 2025.";

pub const USE_CASES_REPLY: &str = "1. Title: Predictive Maintenance\n   Description: Forecast component failures from vehicle telemetry.\n   Impact: Fewer breakdowns.\n2. Title: Battery Health Forecasting\n   Description: Model degradation of battery packs.\n   Impact: Longer warranties.\n3. Title: Demand Forecasting\n   Description: Predict regional demand for each model.\n   Impact: Leaner inventory.";

#[derive(Clone)]
pub enum SearchScript {
    Hits(Vec<SearchHit>),
    Fail(ServiceError),
}

/// Answers each query with the first rule whose needle it contains,
/// otherwise with two hits derived from the query text. Queries matching a
/// latency needle sleep before answering.
#[derive(Default)]
pub struct ScriptedSearch {
    rules: Vec<(String, SearchScript)>,
    latencies: Vec<(String, Duration)>,
    queries: Mutex<Vec<String>>,
}

impl ScriptedSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, needle: &str, script: SearchScript) -> Self {
        self.rules.push((needle.to_string(), script));
        self
    }

    pub fn fail_on(self, needle: &str, error: ServiceError) -> Self {
        self.on(needle, SearchScript::Fail(error))
    }

    pub fn delay_on(mut self, needle: &str, latency: Duration) -> Self {
        self.latencies.push((needle.to_string(), latency));
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    pub fn count_matching(&self, needle: &str) -> usize {
        self.queries()
            .iter()
            .filter(|query| query.contains(needle))
            .count()
    }
}

#[async_trait]
impl SearchService for ScriptedSearch {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, ServiceError> {
        self.queries.lock().unwrap().push(query.to_string());

        let latency = self
            .latencies
            .iter()
            .find(|(needle, _)| query.contains(needle.as_str()))
            .map(|(_, latency)| *latency);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        for (needle, script) in &self.rules {
            if query.contains(needle.as_str()) {
                return match script {
                    SearchScript::Hits(hits) => {
                        Ok(hits.iter().take(max_results).cloned().collect())
                    }
                    SearchScript::Fail(error) => Err(error.clone()),
                };
            }
        }

        let slug = query.to_lowercase().replace(' ', "-");
        Ok((1..=2)
            .take(max_results)
            .map(|i| {
                SearchHit::new(
                    format!("{} result {}", query, i),
                    format!("About {}", query),
                    format!("https://www.kaggle.com/{}/{}", slug, i),
                )
            })
            .collect())
    }
}

#[derive(Clone)]
pub enum GenerationScript {
    Text(String),
    Fail(ServiceError),
}

/// Replies per prompt purpose; each purpose may hold a queue of replies,
/// the last one repeating once the queue is exhausted.
pub struct ScriptedGeneration {
    replies: HashMap<PromptPurpose, Vec<GenerationScript>>,
    calls: Mutex<HashMap<PromptPurpose, usize>>,
    total: AtomicUsize,
}

impl ScriptedGeneration {
    /// Well-formed replies for every stage.
    pub fn healthy() -> Self {
        let mut replies = HashMap::new();
        replies.insert(
            PromptPurpose::Classification,
            vec![GenerationScript::Text(CLASSIFICATION_REPLY.to_string())],
        );
        replies.insert(
            PromptPurpose::ResearchSynthesis,
            vec![GenerationScript::Text(RESEARCH_REPLY.to_string())],
        );
        replies.insert(
            PromptPurpose::UseCases,
            vec![GenerationScript::Text(USE_CASES_REPLY.to_string())],
        );
        replies.insert(
            PromptPurpose::UseCasesStrict,
            vec![GenerationScript::Text(USE_CASES_REPLY.to_string())],
        );
        Self {
            replies,
            calls: Mutex::new(HashMap::new()),
            total: AtomicUsize::new(0),
        }
    }

    pub fn reply(mut self, purpose: PromptPurpose, text: &str) -> Self {
        self.replies
            .insert(purpose, vec![GenerationScript::Text(text.to_string())]);
        self
    }

    pub fn fail(mut self, purpose: PromptPurpose, error: ServiceError) -> Self {
        self.replies
            .insert(purpose, vec![GenerationScript::Fail(error)]);
        self
    }

    pub fn calls(&self, purpose: PromptPurpose) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(&purpose)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationService for ScriptedGeneration {
    async fn generate(&self, prompt: &PromptContext) -> Result<String, ServiceError> {
        self.total.fetch_add(1, Ordering::SeqCst);
        let call = {
            let mut calls = self.calls.lock().unwrap();
            let count = calls.entry(prompt.purpose).or_insert(0);
            *count += 1;
            *count - 1
        };

        let queue = self.replies.get(&prompt.purpose).ok_or_else(|| {
            ServiceError::rejected(ServiceKind::Generation, "no scripted reply")
        })?;
        let script = queue
            .get(call)
            .or_else(|| queue.last())
            .cloned()
            .ok_or_else(|| ServiceError::rejected(ServiceKind::Generation, "empty script"))?;

        match script {
            GenerationScript::Text(text) => Ok(text),
            GenerationScript::Fail(error) => Err(error),
        }
    }
}

/// Config with credentials present and fast retries.
pub fn test_config() -> Config {
    let mut config = Config {
        retry_attempts: 3,
        retry_delay_ms: 1,
        timeout_seconds: 30,
        ..Default::default()
    };
    config.llm.api_key = "test-llm-key".to_string();
    config.search.api_key = "test-search-key".to_string();
    config
}

pub fn build_pipeline(
    config: Config,
    search: Arc<ScriptedSearch>,
    generation: Arc<ScriptedGeneration>,
) -> AnalysisPipeline {
    let adapter = ServiceAdapter::new(search, generation, &config);
    AnalysisPipeline::new(config, adapter).expect("test config is valid")
}

pub fn unavailable_search(message: &str) -> ServiceError {
    ServiceError::unavailable(ServiceKind::Search, message)
}

pub fn unavailable_generation(message: &str) -> ServiceError {
    ServiceError::unavailable(ServiceKind::Generation, message)
}
