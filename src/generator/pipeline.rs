use std::sync::Arc;
use std::time::Duration;

use tracing::Instrument;

use crate::adapter::ServiceAdapter;
use crate::config::Config;
use crate::error::{ConfigError, PartialState, PipelineError, StageName};
use crate::generator::assemble::{AssemblyInput, ReportAssembler};
use crate::generator::classify::Classifier;
use crate::generator::context::GeneratorContext;
use crate::generator::research::Researcher;
use crate::generator::resources::ResourceMapper;
use crate::generator::types::Stage;
use crate::generator::use_cases::{UseCaseBrief, UseCaseGenerator};
use crate::generator::workflow::{TimingKeys, TimingScope};
use crate::llm::client::LLMClient;
use crate::search::ExaSearchClient;
use crate::types::report::Report;
use crate::types::request::AnalysisRequest;

/// 单次调用的选项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// 每条检索的结果上限
    pub result_cap: usize,
    /// 整次分析的超时时间（秒）
    pub timeout_seconds: u64,
}

impl From<&Config> for AnalysisOptions {
    fn from(config: &Config) -> Self {
        Self {
            result_cap: config.result_cap,
            timeout_seconds: config.timeout_seconds,
        }
    }
}

/// 分析流水线：分类 → 调研 → 场景生成 → 数据集映射 → 组装
pub struct AnalysisPipeline {
    config: Config,
    adapter: ServiceAdapter,
}

impl AnalysisPipeline {
    /// 构造时校验一次配置，任何阶段运行前即暴露配置错误
    pub fn new(config: Config, adapter: ServiceAdapter) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, adapter })
    }

    /// 由配置构造真实的检索与生成客户端
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        config.validate()?;
        let search = ExaSearchClient::new(&config.search)?;
        let generation = LLMClient::new(config.llm.clone())?;
        let adapter = ServiceAdapter::new(Arc::new(search), Arc::new(generation), &config);
        Ok(Self::new(config, adapter)?)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 使用配置中的默认选项执行分析
    pub async fn run(&self, company_name: &str) -> Result<Report, PipelineError> {
        self.run_analysis(company_name, AnalysisOptions::from(&self.config))
            .await
    }

    pub async fn run_analysis(
        &self,
        company_name: &str,
        options: AnalysisOptions,
    ) -> Result<Report, PipelineError> {
        let request = AnalysisRequest::new(company_name)?;
        let run_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("analysis", %run_id, company = request.company_name());

        async move {
            let context = GeneratorContext::new(
                self.adapter.clone(),
                self.config.clone(),
                request,
                options.result_cap.max(1),
                Duration::from_secs(options.timeout_seconds.max(1)),
            );
            let mut timing = TimingScope::new();
            let result = self.execute_stages(&context, &mut timing).await;
            tracing::debug!("{}", timing.generate_timing_report());
            result
        }
        .instrument(span)
        .await
    }

    async fn execute_stages(
        &self,
        context: &GeneratorContext,
        timing: &mut TimingScope,
    ) -> Result<Report, PipelineError> {
        tracing::info!("🚀 开始分析 {} ...", context.company_name());

        // 第一阶段：行业识别
        timing.start_phase(TimingKeys::CLASSIFY);
        let classification = match Classifier.execute(context, &context.request).await {
            Ok(classification) => classification,
            Err(cause) => {
                return Err(PipelineError::ClassificationFailed {
                    cause,
                    partial: Box::new(partial_state(context, None, None).await),
                });
            }
        };
        timing.end_phase(TimingKeys::CLASSIFY);

        // 第二阶段：市场调研
        timing.start_phase(TimingKeys::RESEARCH);
        let research = match Researcher.execute(context, &classification).await {
            Ok(research) => research,
            Err(cause) => {
                return Err(PipelineError::ResearchFailed {
                    cause,
                    partial: Box::new(partial_state(context, Some(classification), None).await),
                });
            }
        };
        timing.end_phase(TimingKeys::RESEARCH);

        // 第三阶段：场景生成
        timing.start_phase(TimingKeys::USE_CASES);
        let brief = UseCaseBrief {
            classification,
            research,
        };
        let use_cases = match UseCaseGenerator.execute(context, &brief).await {
            Ok(use_cases) => use_cases,
            Err(cause) => {
                let UseCaseBrief {
                    classification,
                    research,
                } = brief;
                return Err(PipelineError::UseCaseGenerationFailed {
                    cause,
                    partial: Box::new(
                        partial_state(context, Some(classification), Some(research)).await,
                    ),
                });
            }
        };
        timing.end_phase(TimingKeys::USE_CASES);

        // 第四阶段：数据集映射（不会终止流水线）
        timing.start_phase(TimingKeys::RESOURCES);
        let resources = match ResourceMapper.execute(context, &use_cases).await {
            Ok(resources) => resources,
            Err(cause) => {
                context
                    .record_degradation(StageName::ResourceMapper, cause.to_string())
                    .await;
                Vec::new()
            }
        };
        timing.end_phase(TimingKeys::RESOURCES);

        // 第五阶段：组装
        let UseCaseBrief {
            classification,
            research,
        } = brief;
        let report = ReportAssembler.assemble(AssemblyInput {
            company_name: context.company_name().to_string(),
            classification,
            research,
            use_cases,
            resources,
            degradations: context.degradations().await,
        })?;

        if report.partial {
            tracing::warn!(
                "⚠️ 分析完成，但有 {} 处降级，报告标记为 partial",
                report.degradations.len()
            );
        } else {
            tracing::info!("✅ 分析完成");
        }
        Ok(report)
    }
}

async fn partial_state(
    context: &GeneratorContext,
    classification: Option<crate::types::classification::Classification>,
    research: Option<crate::types::research::ResearchSummary>,
) -> PartialState {
    PartialState {
        classification,
        research,
        degradations: context.degradations().await,
    }
}
