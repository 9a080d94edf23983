use url::Url;

/// 常见公开数据集平台：(域名, 展示名)
const KNOWN_PROVIDERS: [(&str, &str); 8] = [
    ("kaggle.com", "Kaggle"),
    ("huggingface.co", "Hugging Face"),
    ("github.com", "GitHub"),
    ("data.gov", "data.gov"),
    ("archive.ics.uci.edu", "UCI ML Repository"),
    ("zenodo.org", "Zenodo"),
    ("registry.opendata.aws", "AWS Open Data"),
    ("datasetsearch.research.google.com", "Google Dataset Search"),
];

/// 由URL推断数据集提供方，无法解析时返回 None
pub fn detect_provider(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = normalized_host(&parsed)?;

    known_provider(&host)
        .map(|name| name.to_string())
        .or(Some(host))
}

/// 已知数据集平台上的链接，或路径中带有 `data` 的链接
pub fn is_dataset_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let Some(host) = normalized_host(&parsed) else {
        return false;
    };

    known_provider(&host).is_some() || parsed.path().to_lowercase().contains("data")
}

fn normalized_host(url: &Url) -> Option<String> {
    url.host_str()
        .map(|host| host.trim_start_matches("www.").to_lowercase())
}

fn known_provider(host: &str) -> Option<&'static str> {
    KNOWN_PROVIDERS
        .iter()
        .find(|(domain, _)| host == *domain || host.ends_with(&format!(".{}", domain)))
        .map(|(_, name)| *name)
}
