use regex::Regex;
use std::sync::LazyLock;

static SECTION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:#+\s*|>\s*)?(?:\*\*|__)?(trends|competitors|market\s+size)[\s*_]*:[\s*_]*(.*)$",
    )
    .unwrap()
});

static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*•]|\d+[.)])\s+(.+)$").unwrap());

/// 解析后的调研摘要字段
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedResearch {
    pub trends: Vec<String>,
    pub competitors: Vec<String>,
    pub market_size: Option<String>,
}

impl ParsedResearch {
    pub fn is_empty(&self) -> bool {
        self.trends.is_empty() && self.competitors.is_empty() && self.market_size.is_none()
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Section {
    Trends,
    Competitors,
    MarketSize,
}

/// 解析 `TRENDS:` / `COMPETITORS:` / `MARKET SIZE:` 分段的回复
///
/// 没有任何分段标题时，所有列表项视为趋势；连列表项也没有则整段文字作为一条趋势。
pub fn parse_research(text: &str) -> ParsedResearch {
    let mut parsed = ParsedResearch::default();
    let mut section: Option<Section> = None;
    let mut market_lines: Vec<String> = Vec::new();
    let mut saw_header = false;
    let mut loose_bullets: Vec<String> = Vec::new();

    for line in text.lines() {
        if let Some(captures) = SECTION_HEADER.captures(line) {
            saw_header = true;
            let name = captures[1].to_lowercase();
            let inline = captures[2].trim().to_string();
            let current = if name.starts_with("trends") {
                Section::Trends
            } else if name.starts_with("competitors") {
                Section::Competitors
            } else {
                Section::MarketSize
            };
            section = Some(current);
            if !inline.is_empty() {
                push_inline(&mut parsed, &mut market_lines, current, &inline);
            }
            continue;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let item = BULLET
            .captures(line)
            .map(|c| clean_item(&c[1]))
            .unwrap_or_else(|| clean_item(trimmed));
        if item.is_empty() {
            continue;
        }

        match section {
            Some(Section::Trends) => parsed.trends.push(item),
            Some(Section::Competitors) => parsed.competitors.push(item),
            Some(Section::MarketSize) => market_lines.push(item),
            None => {
                if BULLET.is_match(line) {
                    loose_bullets.push(item);
                }
            }
        }
    }

    if !saw_header {
        parsed.trends = if loose_bullets.is_empty() {
            let paragraph = text.split_whitespace().collect::<Vec<_>>().join(" ");
            if paragraph.is_empty() {
                vec![]
            } else {
                vec![paragraph]
            }
        } else {
            loose_bullets
        };
        return parsed;
    }

    let note = market_lines.join(" ");
    if !note.is_empty() && !is_placeholder(&note) {
        parsed.market_size = Some(note);
    }
    parsed
}

fn push_inline(
    parsed: &mut ParsedResearch,
    market_lines: &mut Vec<String>,
    section: Section,
    inline: &str,
) {
    match section {
        Section::MarketSize => market_lines.push(clean_item(inline)),
        Section::Trends | Section::Competitors => {
            let items = inline
                .split([',', ';'])
                .map(clean_item)
                .filter(|item| !item.is_empty() && !is_placeholder(item));
            if section == Section::Trends {
                parsed.trends.extend(items);
            } else {
                parsed.competitors.extend(items);
            }
        }
    }
}

fn clean_item(item: &str) -> String {
    item.trim()
        .trim_matches(|c: char| matches!(c, '*' | '_' | '`'))
        .trim()
        .to_string()
}

fn is_placeholder(value: &str) -> bool {
    matches!(
        value.trim().trim_end_matches('.').to_lowercase().as_str(),
        "unknown" | "n/a" | "none" | "not available" | "-"
    )
}
