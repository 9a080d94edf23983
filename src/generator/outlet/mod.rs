use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{Config, ExportFormat};
use crate::types::report::Report;

mod render;

pub use render::{render_html, render_json, render_markdown, report_schema};

/// 报告结构描述文件名
pub const SCHEMA_FILE_NAME: &str = "report.schema.json";

/// 保存报告，返回写入的文件路径
pub async fn save(config: &Config, report: &Report) -> Result<Vec<PathBuf>> {
    let outlet = DiskOutlet::new(&config.output_path, &config.export_formats);
    outlet.save(report).await
}

#[allow(async_fn_in_trait)]
pub trait Outlet {
    async fn save(&self, report: &Report) -> Result<Vec<PathBuf>>;
}

/// 将报告的各派生视图写入输出目录
pub struct DiskOutlet {
    output_dir: PathBuf,
    formats: Vec<ExportFormat>,
}

impl DiskOutlet {
    pub fn new(output_dir: &Path, formats: &[ExportFormat]) -> Self {
        let mut unique = Vec::new();
        for format in formats {
            if !unique.contains(format) {
                unique.push(*format);
            }
        }
        Self {
            output_dir: output_dir.to_path_buf(),
            formats: unique,
        }
    }

    /// `{company_slug}_analysis_{YYYYMMDD}`
    pub fn file_stem(report: &Report) -> String {
        format!(
            "{}_analysis_{}",
            company_slug(&report.company_name),
            report.generated_at.format("%Y%m%d")
        )
    }
}

impl Outlet for DiskOutlet {
    async fn save(&self, report: &Report) -> Result<Vec<PathBuf>> {
        tracing::info!("🖊️ 报告存储中...");
        fs::create_dir_all(&self.output_dir).context(format!(
            "Failed to create output directory: {:?}",
            self.output_dir
        ))?;

        let stem = Self::file_stem(report);
        let mut written = Vec::new();

        for format in &self.formats {
            let content = match format {
                ExportFormat::Markdown => render_markdown(report),
                ExportFormat::Json => render_json(report)?,
                ExportFormat::Html => render_html(report),
            };
            let path = self
                .output_dir
                .join(format!("{}.{}", stem, format.extension()));
            fs::write(&path, content).context(format!("Failed to write report: {:?}", path))?;
            tracing::info!("💾 已保存报告: {}", path.display());
            written.push(path);
        }

        let schema_path = self.output_dir.join(SCHEMA_FILE_NAME);
        fs::write(&schema_path, report_schema()?)
            .context(format!("Failed to write report schema: {:?}", schema_path))?;
        written.push(schema_path);

        tracing::info!("💾 报告保存完成，输出目录: {}", self.output_dir.display());
        Ok(written)
    }
}

/// 文件名安全的公司名：小写字母数字，其余字符折叠为单个下划线
pub fn company_slug(company_name: &str) -> String {
    let mut slug = String::new();
    for ch in company_name.trim().chars() {
        if ch.is_alphanumeric() {
            slug.extend(ch.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    let slug = slug.trim_end_matches('_').to_string();
    if slug.is_empty() {
        "company".to_string()
    } else {
        slug
    }
}
