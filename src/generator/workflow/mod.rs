use crate::config::Config;
use crate::error::{PartialState, PipelineError};
use crate::generator::pipeline::AnalysisPipeline;
use crate::types::report::Report;

use anyhow::Result;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// 时间跟踪作用域
pub struct TimingScope {
    start_time: Instant,
    phase_start_times: Vec<(&'static str, Instant)>,
    phase_durations: Vec<(&'static str, Duration)>,
}

impl Default for TimingScope {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingScope {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            phase_start_times: Vec::new(),
            phase_durations: Vec::new(),
        }
    }

    /// 开始一个新的阶段计时
    pub fn start_phase(&mut self, phase_name: &'static str) {
        self.phase_start_times.retain(|(name, _)| *name != phase_name);
        self.phase_start_times.push((phase_name, Instant::now()));
    }

    /// 结束一个阶段的计时
    pub fn end_phase(&mut self, phase_name: &'static str) -> Option<Duration> {
        let index = self
            .phase_start_times
            .iter()
            .position(|(name, _)| *name == phase_name)?;
        let (_, start_time) = self.phase_start_times.remove(index);
        let duration = start_time.elapsed();
        self.phase_durations.push((phase_name, duration));
        Some(duration)
    }

    /// 获取总执行时间
    pub fn get_total_duration(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// 按完成顺序获取各阶段的执行时间
    pub fn get_phase_durations(&self) -> &[(&'static str, Duration)] {
        &self.phase_durations
    }

    /// 获取格式化的执行时间报告
    pub fn generate_timing_report(&self) -> String {
        let mut report = format!(
            "总执行时间: {:.2}秒\n",
            self.get_total_duration().as_secs_f64()
        );

        if !self.phase_durations.is_empty() {
            report.push_str("\n各阶段执行时间:\n");
            for (phase, duration) in &self.phase_durations {
                report.push_str(&format!("- {}: {:.3}秒\n", phase, duration.as_secs_f64()));
            }
        }

        report
    }
}

/// 时间跟踪常量
pub struct TimingKeys;

impl TimingKeys {
    pub const CLASSIFY: &'static str = "classify";
    pub const RESEARCH: &'static str = "research";
    pub const USE_CASES: &'static str = "use_cases";
    pub const RESOURCES: &'static str = "resources";
    pub const OUTPUT: &'static str = "output";

    /// 获取所有阶段的键列表
    pub fn get_all_phase_keys() -> Vec<&'static str> {
        vec![
            Self::CLASSIFY,
            Self::RESEARCH,
            Self::USE_CASES,
            Self::RESOURCES,
            Self::OUTPUT,
        ]
    }
}

/// 启动分析工作流：运行流水线、输出摘要并保存报告
pub async fn launch(config: &Config, company_name: &str) -> Result<Vec<PathBuf>> {
    let pipeline = AnalysisPipeline::from_config(config.clone())?;

    let report = match pipeline.run(company_name).await {
        Ok(report) => report,
        Err(err) => {
            eprintln!("{}", format_failure(&err));
            return Err(err.into());
        }
    };

    println!("{}", format_summary(&report));

    let mut timing = TimingScope::new();
    timing.start_phase(TimingKeys::OUTPUT);
    let written = crate::generator::outlet::save(config, &report).await?;
    timing.end_phase(TimingKeys::OUTPUT);
    tracing::debug!("{}", timing.generate_timing_report());

    for path in &written {
        println!("💾 {}", path.display());
    }
    Ok(written)
}

/// 报告摘要：行业以及来源、场景、数据集的数量
pub fn format_summary(report: &Report) -> String {
    let mut summary = format!("\n📊 {} 分析结果\n", report.company_name);
    summary.push_str(&format!("- 行业: {}\n", report.classification.industry));
    summary.push_str(&format!("- 来源: {}\n", report.source_count()));
    summary.push_str(&format!("- 应用场景: {}\n", report.use_cases.len()));
    summary.push_str(&format!("- 数据集: {}\n", report.resources.len()));
    if report.partial {
        summary.push_str(&format!(
            "⚠️ 报告不完整，{} 处降级:\n",
            report.degradations.len()
        ));
        for degradation in &report.degradations {
            summary.push_str(&format!("  - {}: {}\n", degradation.stage, degradation.reason));
        }
    }
    summary
}

/// 终止错误：原因以及已完成阶段的产出
pub fn format_failure(err: &PipelineError) -> String {
    let mut message = format!("❌ 分析失败: {}\n", err);
    if let Some(partial) = err.partial_state() {
        message.push_str(&format_partial(partial));
    }
    message
}

fn format_partial(partial: &PartialState) -> String {
    let mut text = String::new();
    if let Some(classification) = &partial.classification {
        text.push_str(&format!("- 已完成行业识别: {}\n", classification.industry));
    }
    if let Some(research) = &partial.research {
        text.push_str(&format!(
            "- 已完成市场调研: {} 条趋势，{} 个竞争对手，{} 个来源\n",
            research.trends.len(),
            research.competitors.len(),
            research.citations.len()
        ));
    }
    for degradation in &partial.degradations {
        text.push_str(&format!("- 降级 {}: {}\n", degradation.stage, degradation.reason));
    }
    text
}
