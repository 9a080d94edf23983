//! 报告的派生视图：Markdown、JSON、HTML 与 JSON Schema

use anyhow::{Context, Result};

use crate::types::report::Report;
use crate::types::resource::ResourceLink;

/// 生成 Markdown 报告：行业 → 市场调研 → 应用场景 → 数据集资源
pub fn render_markdown(report: &Report) -> String {
    let mut content = String::new();

    content.push_str(&format!(
        "# AI Strategy Analysis for {}\n\n",
        report.company_name
    ));
    content.push_str(&format!(
        "*Generated on {}*\n\n",
        report.generated_at.format("%B %d, %Y")
    ));

    if report.partial {
        content.push_str("> **Note:** this report is partial. Some data could not be retrieved:\n");
        for degradation in &report.degradations {
            content.push_str(&format!(
                "> - {}: {}\n",
                degradation.stage, degradation.reason
            ));
        }
        content.push('\n');
    }

    // 行业
    let classification = &report.classification;
    content.push_str(&format!("## Industry: {}\n\n", classification.industry));
    if !classification.rationale.is_empty() {
        content.push_str(&format!("{}\n\n", classification.rationale));
    }
    if classification.is_low_confidence() {
        content.push_str("*Low confidence: no search results supported this classification.*\n\n");
    }

    // 市场调研
    let research = &report.research;
    content.push_str("## Market Research Insights\n\n");
    if research.data_scarce {
        content.push_str("*Source data was scarce; the insights below rely on general knowledge.*\n\n");
    }
    push_list(&mut content, "Key Trends", &research.trends);
    push_list(&mut content, "Competitors", &research.competitors);
    if let Some(note) = &research.market_size_note {
        content.push_str(&format!("### Market Size\n\n{}\n\n", note));
    }
    if !research.citations.is_empty() {
        content.push_str("### Sources\n\n");
        for citation in &research.citations {
            content.push_str(&format!("- [{}]({})\n", citation.title, citation.url));
        }
        content.push('\n');
    }

    // 应用场景及其数据集
    content.push_str("## Recommended AI/ML Use Cases\n\n");
    for use_case in &report.use_cases {
        content.push_str(&format!(
            "### Use Case {}: {}\n\n{}\n\n",
            use_case.rank, use_case.title, use_case.description
        ));
        if !use_case.impact_rationale.is_empty() {
            content.push_str(&format!(
                "**Expected impact:** {}\n\n",
                use_case.impact_rationale
            ));
        }
        let links: Vec<&ResourceLink> = report.resources_for(use_case.rank).collect();
        if !links.is_empty() {
            content.push_str("**Datasets:**\n\n");
            for link in links {
                content.push_str(&format_link(link));
            }
            content.push('\n');
        }
    }

    let unreferenced: Vec<&ResourceLink> = report.unreferenced_resources().collect();
    if !unreferenced.is_empty() {
        content.push_str("## Resources\n\n");
        for link in unreferenced {
            content.push_str(&format_link(link));
        }
        content.push('\n');
    }

    content
}

fn push_list(content: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    content.push_str(&format!("### {}\n\n", heading));
    for item in items {
        content.push_str(&format!("- {}\n", item));
    }
    content.push('\n');
}

fn format_link(link: &ResourceLink) -> String {
    match &link.provider {
        Some(provider) => format!("- [{}]({}) ({})\n", link.dataset_name, link.url, provider),
        None => format!("- [{}]({})\n", link.dataset_name, link.url),
    }
}

/// 供展示层使用的结构化形式
pub fn render_json(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize report to JSON")
}

/// 由 Markdown 转换得到的 HTML 页面
pub fn render_html(report: &Report) -> String {
    let body = markdown::to_html(&render_markdown(report));
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>AI Strategy Analysis for {}</title>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape_html(&report.company_name),
        body
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// 报告结构的 JSON Schema
pub fn report_schema() -> Result<String> {
    let schema = schemars::schema_for!(Report);
    serde_json::to_string_pretty(&schema).context("Failed to serialize report schema")
}
