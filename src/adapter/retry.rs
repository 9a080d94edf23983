use rand::Rng;
use std::time::Duration;

use crate::config::Config;

/// 有界指数退避策略
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// 最大尝试次数（含首次调用）
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// 叠加的随机抖动上限，占当前间隔的比例
    pub jitter_ratio: f64,
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        let base_delay = Duration::from_millis(config.retry_delay_ms);
        Self {
            max_attempts: config.retry_attempts.max(1),
            base_delay,
            max_delay: base_delay * 16,
            jitter_ratio: 0.2,
        }
    }

    /// 第 `attempt` 次失败后的等待时间（attempt 从1开始）
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let backoff = self
            .base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay);

        let jitter_cap = (backoff.as_millis() as f64 * self.jitter_ratio) as u64;
        if jitter_cap == 0 {
            return backoff;
        }
        let jitter = rand::rng().random_range(0..=jitter_cap);
        backoff + Duration::from_millis(jitter)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
