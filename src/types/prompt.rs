use serde::{Deserialize, Serialize};

/// 生成调用的用途，供适配层日志与测试桩区分调用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PromptPurpose {
    Classification,
    ResearchSynthesis,
    UseCases,
    /// 首次解析失败后的严格格式重试
    UseCasesStrict,
}

/// 上下文资料段落
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptSection {
    pub heading: String,
    pub body: String,
}

/// 一次生成调用的结构化上下文
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptContext {
    pub purpose: PromptPurpose,
    /// 系统提示词
    pub system_prompt: String,
    /// 开头的说明性指令
    pub opening_instruction: String,
    pub sections: Vec<PromptSection>,
    /// 结尾的强调性指令
    pub closing_instruction: String,
}

impl PromptContext {
    pub fn new(purpose: PromptPurpose, system_prompt: impl Into<String>) -> Self {
        Self {
            purpose,
            system_prompt: system_prompt.into(),
            opening_instruction: String::new(),
            sections: Vec::new(),
            closing_instruction: String::new(),
        }
    }

    pub fn opening(mut self, instruction: impl Into<String>) -> Self {
        self.opening_instruction = instruction.into();
        self
    }

    pub fn section(mut self, heading: impl Into<String>, body: impl Into<String>) -> Self {
        self.sections.push(PromptSection {
            heading: heading.into(),
            body: body.into(),
        });
        self
    }

    pub fn closing(mut self, instruction: impl Into<String>) -> Self {
        self.closing_instruction = instruction.into();
        self
    }

    /// 拼装用户侧提示词
    pub fn render_user_prompt(&self) -> String {
        let mut prompt = String::new();
        if !self.opening_instruction.is_empty() {
            prompt.push_str(&self.opening_instruction);
            prompt.push_str("\n\n");
        }
        for section in &self.sections {
            prompt.push_str(&format!("### {}\n", section.heading));
            if section.body.trim().is_empty() {
                prompt.push_str("(no data available)\n\n");
            } else {
                prompt.push_str(section.body.trim_end());
                prompt.push_str("\n\n");
            }
        }
        if !self.closing_instruction.is_empty() {
            prompt.push_str(&self.closing_instruction);
        }
        prompt.trim_end().to_string()
    }
}
