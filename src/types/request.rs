use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// 一次分析请求，创建后不可变
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    company_name: String,
}

impl AnalysisRequest {
    /// 公司名去除首尾空白后不能为空
    pub fn new(company_name: &str) -> Result<Self, PipelineError> {
        let trimmed = company_name.trim();
        if trimmed.is_empty() {
            return Err(PipelineError::InvalidRequest(
                "company name must not be empty".to_string(),
            ));
        }
        Ok(Self {
            company_name: trimmed.to_string(),
        })
    }

    pub fn company_name(&self) -> &str {
        &self.company_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_is_trimmed() {
        let request = AnalysisRequest::new("  Tesla \n").unwrap();
        assert_eq!(request.company_name(), "Tesla");
    }

    #[test]
    fn test_blank_request_rejected() {
        assert!(matches!(
            AnalysisRequest::new("   "),
            Err(PipelineError::InvalidRequest(_))
        ));
        assert!(AnalysisRequest::new("").is_err());
    }
}
