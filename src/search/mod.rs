//! 检索服务客户端 - Exa 兼容的神经检索 HTTP 接口

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::adapter::SearchService;
use crate::config::SearchConfig;
use crate::error::{ServiceError, ServiceKind};
use crate::types::search::SearchHit;

/// 摘要文本的最大字符数
const MAX_SNIPPET_CHARS: usize = 600;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    query: &'a str,
    num_results: usize,
    #[serde(rename = "type")]
    search_type: &'a str,
    contents: SearchContents,
}

#[derive(Debug, Serialize)]
struct SearchContents {
    summary: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<RawResult>,
}

#[derive(Debug, Deserialize)]
struct RawResult {
    title: Option<String>,
    url: Option<String>,
    summary: Option<String>,
    text: Option<String>,
    #[serde(default)]
    highlights: Vec<String>,
}

/// 检索服务客户端
#[derive(Clone)]
pub struct ExaSearchClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    search_type: String,
}

impl ExaSearchClient {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds.max(1)))
            .build()
            .context("Failed to create HTTP client for the search service")?;

        Ok(Self {
            http,
            endpoint: format!("{}/search", config.api_base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            search_type: config.search_type.clone(),
        })
    }
}

#[async_trait]
impl SearchService for ExaSearchClient {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, ServiceError> {
        let request = SearchRequest {
            query,
            num_results: max_results,
            search_type: &self.search_type,
            contents: SearchContents { summary: true },
        };

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ServiceError::unavailable(ServiceKind::Search, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body));
        }

        let payload: SearchResponse = response.json().await.map_err(|e| {
            ServiceError::unavailable(ServiceKind::Search, format!("malformed response: {}", e))
        })?;

        Ok(normalize_results(payload.results, max_results))
    }
}

/// 根据HTTP状态码区分可重试与不可重试错误
pub fn classify_status(status: StatusCode, body: &str) -> ServiceError {
    let message = if body.trim().is_empty() {
        format!(
            "HTTP {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown error")
        )
    } else {
        format!("HTTP {}: {}", status.as_u16(), body.trim())
    };

    if status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
    {
        ServiceError::unavailable(ServiceKind::Search, message)
    } else {
        ServiceError::rejected(ServiceKind::Search, message)
    }
}

fn normalize_results(results: Vec<RawResult>, max_results: usize) -> Vec<SearchHit> {
    results
        .into_iter()
        .filter_map(|raw| {
            let url = raw.url.map(|u| u.trim().to_string()).unwrap_or_default();
            if url.is_empty() {
                return None;
            }
            let title = raw
                .title
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| url.clone());
            let snippet = raw
                .summary
                .filter(|s| !s.trim().is_empty())
                .or_else(|| raw.text.filter(|t| !t.trim().is_empty()))
                .or_else(|| {
                    let joined = raw.highlights.join(" ");
                    (!joined.trim().is_empty()).then_some(joined)
                })
                .map(|s| truncate_chars(s.trim(), MAX_SNIPPET_CHARS))
                .unwrap_or_default();
            Some(SearchHit {
                title,
                snippet,
                url,
            })
        })
        .take(max_results)
        .collect()
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
