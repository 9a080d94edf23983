/// 市场调研的检索方向，顺序即报告中引用的顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResearchQuery {
    Trends,
    Competitors,
    MarketSize,
    Outlook,
}

impl ResearchQuery {
    pub const ALL: [ResearchQuery; 4] = [
        ResearchQuery::Trends,
        ResearchQuery::Competitors,
        ResearchQuery::MarketSize,
        ResearchQuery::Outlook,
    ];

    pub fn query(&self, company: &str, industry: &str) -> String {
        match self {
            ResearchQuery::Trends => format!("{} industry overview and trends", industry),
            ResearchQuery::Competitors => format!("{} competitors in {}", company, industry),
            ResearchQuery::MarketSize => format!("{} market size and growth", industry),
            ResearchQuery::Outlook => {
                format!("{} technological innovations and future outlook", industry)
            }
        }
    }

    pub fn heading(&self) -> &'static str {
        match self {
            ResearchQuery::Trends => "Industry trends",
            ResearchQuery::Competitors => "Competitors",
            ResearchQuery::MarketSize => "Market size",
            ResearchQuery::Outlook => "Technology outlook",
        }
    }
}

impl std::fmt::Display for ResearchQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            ResearchQuery::Trends => "trends",
            ResearchQuery::Competitors => "competitors",
            ResearchQuery::MarketSize => "market size",
            ResearchQuery::Outlook => "technology outlook",
        };
        write!(f, "{}", str)
    }
}
