use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::types::use_case::{UseCase, normalize_title};

static ITEM_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:#+\s*)?(?:[*_]{1,2})?\d+[.)]\s+(.*)$").unwrap());

static FIELD_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:[-*•]\s+)?[*_]*(title|description|expected\s+impact|impact\s+rationale|impact|rationale)[*_]*\s*:[*_]*\s*(.*)$",
    )
    .unwrap()
});

/// 从生成文本中解析出的单个场景（尚未排名）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUseCase {
    pub title: String,
    pub description: String,
    pub impact_rationale: String,
}

#[derive(Clone, Copy, PartialEq)]
enum Field {
    Title,
    Description,
    Impact,
}

#[derive(Default)]
struct Draft {
    title: Vec<String>,
    description: Vec<String>,
    impact: Vec<String>,
    last: Option<Field>,
}

impl Draft {
    fn push(&mut self, field: Field, value: &str) {
        let value = clean_text(value);
        self.last = Some(field);
        if value.is_empty() {
            return;
        }
        match field {
            Field::Title => self.title.push(value),
            Field::Description => self.description.push(value),
            Field::Impact => self.impact.push(value),
        }
    }

    /// 无标签的续行：接在上一个字段后，标题之后默认归入描述
    fn push_continuation(&mut self, value: &str) {
        match self.last {
            Some(Field::Impact) => self.push(Field::Impact, value),
            _ => self.push(Field::Description, value),
        }
    }

    fn finish(self) -> Option<ParsedUseCase> {
        let title = self.title.join(" ");
        let description = self.description.join(" ");
        if title.is_empty() || description.is_empty() {
            return None;
        }
        Some(ParsedUseCase {
            title,
            description,
            impact_rationale: self.impact.join(" "),
        })
    }
}

/// 解析编号列表格式的场景，丢弃缺少标题或描述的条目
///
/// ```text
/// 1. Title: <title>
///    Description: <description>
///    Impact: <impact rationale>
/// ```
pub fn parse_use_cases(text: &str) -> Vec<ParsedUseCase> {
    let mut records = Vec::new();
    let mut current: Option<Draft> = None;

    for line in text.lines() {
        if let Some(captures) = ITEM_START.captures(line) {
            if let Some(draft) = current.take() {
                records.extend(draft.finish());
            }
            let mut draft = Draft::default();
            let rest = captures[1].trim();
            match FIELD_LINE.captures(rest) {
                Some(field) => draft.push(field_of(&field[1]), &field[2]),
                None => draft.push(Field::Title, rest),
            }
            current = Some(draft);
            continue;
        }

        let Some(draft) = current.as_mut() else {
            continue;
        };
        if line.trim().is_empty() {
            continue;
        }
        match FIELD_LINE.captures(line) {
            Some(field) => draft.push(field_of(&field[1]), &field[2]),
            None => draft.push_continuation(line),
        }
    }

    if let Some(draft) = current.take() {
        records.extend(draft.finish());
    }
    records
}

/// 按归一化标题去重（保留首次出现），按输出顺序从1开始连续排名
pub fn rank_use_cases(parsed: Vec<ParsedUseCase>, max_use_cases: usize) -> Vec<UseCase> {
    let mut seen = HashSet::new();
    parsed
        .into_iter()
        .filter(|candidate| seen.insert(normalize_title(&candidate.title)))
        .take(max_use_cases)
        .enumerate()
        .map(|(idx, candidate)| UseCase {
            title: candidate.title,
            description: candidate.description,
            impact_rationale: candidate.impact_rationale,
            rank: idx as u32 + 1,
        })
        .collect()
}

fn field_of(label: &str) -> Field {
    let label = label.to_lowercase();
    if label == "title" {
        Field::Title
    } else if label == "description" {
        Field::Description
    } else {
        Field::Impact
    }
}

fn clean_text(value: &str) -> String {
    value
        .trim()
        .trim_matches(|c: char| matches!(c, '*' | '_' | '`' | '"'))
        .trim()
        .to_string()
}
