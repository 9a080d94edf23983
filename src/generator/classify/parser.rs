use regex::Regex;
use std::sync::LazyLock;

static LABELED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:#+\s*|>\s*)?(?:\*\*|__)?(industry|rationale)[\s*_]*:[\s*_]*(.*)$")
        .unwrap()
});

/// 解析后的行业分类
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedClassification {
    pub industry: String,
    pub rationale: String,
}

/// 解析 `INDUSTRY:` / `RATIONALE:` 格式的回复
///
/// 缺少 `INDUSTRY:` 行时，取第一行非空文本作为行业名，其余作为理由。
/// 只认第一个 `INDUSTRY:` 标签；理由段内再出现的标签行按理由正文处理。
pub fn parse_classification(text: &str) -> Option<ParsedClassification> {
    let mut industry: Option<String> = None;
    let mut rationale_lines: Vec<String> = Vec::new();
    let mut in_rationale = false;

    for line in text.lines() {
        if let Some(captures) = LABELED_LINE.captures(line) {
            let value = captures[2].trim().to_string();
            if captures[1].eq_ignore_ascii_case("industry") {
                if industry.is_none() && !in_rationale {
                    industry = Some(value);
                } else if in_rationale {
                    rationale_lines.push(line.trim().to_string());
                }
            } else {
                in_rationale = true;
                if !value.is_empty() {
                    rationale_lines.push(value);
                }
            }
        } else if in_rationale && !line.trim().is_empty() {
            rationale_lines.push(line.trim().to_string());
        }
    }

    let (industry, rationale) = match industry {
        Some(industry) => (industry, rationale_lines.join(" ")),
        None => {
            let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
            let first = lines.next()?.to_string();
            (first, lines.collect::<Vec<_>>().join(" "))
        }
    };

    let industry = clean_label(&industry);
    if industry.is_empty() {
        return None;
    }

    Some(ParsedClassification {
        industry,
        rationale: rationale.trim().to_string(),
    })
}

fn clean_label(label: &str) -> String {
    label
        .trim()
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '“' | '”' | '*' | '_' | '`'))
        .trim_end_matches('.')
        .trim()
        .to_string()
}
