//! 存储层失败分类与重试
//!
//! 所有读操作、短码插入和点击事务都经过 `with_retry`。点击事务整体算一次
//! 尝试：失败时事务已回滚，重来不会重复计数。短码冲突不是瞬时错误，直接交给
//! 调用方映射成 `Conflict`。

use std::future::Future;
use std::time::Duration;

use sea_orm::{DbErr, SqlErr};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::DatabaseConfig;

/// 存储错误的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbFailure {
    /// 唯一索引拦下了插入（短码被占用）
    Duplicate,
    /// 锁竞争、连接抖动，稍后重试可能成功
    Transient,
    Fatal,
}

// SQLite: database is locked / database table is locked
// MySQL: Deadlock found / Lock wait timeout exceeded
// PostgreSQL: deadlock detected / could not serialize access
const TRANSIENT_MARKERS: &[&str] = &[
    "database is locked",
    "database table is locked",
    "deadlock",
    "lock wait timeout",
    "could not serialize",
];

// sql_err() 识别不了的驱动消息（MySQL 的 DO NOTHING 等）
const DUPLICATE_MARKERS: &[&str] = &[
    "record not inserted",
    "unique constraint",
    "duplicate entry",
    "duplicate key",
];

pub fn classify(err: &DbErr) -> DbFailure {
    if matches!(err, DbErr::RecordNotInserted)
        || matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
    {
        return DbFailure::Duplicate;
    }

    let message = err.to_string().to_lowercase();
    if DUPLICATE_MARKERS.iter().any(|m| message.contains(m)) {
        return DbFailure::Duplicate;
    }

    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => DbFailure::Transient,
        DbErr::Exec(_) | DbErr::Query(_)
            if TRANSIENT_MARKERS.iter().any(|m| message.contains(m)) =>
        {
            DbFailure::Transient
        }
        _ => DbFailure::Fatal,
    }
}

/// 重试策略，来自 `[database]` 配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl From<&DatabaseConfig> for RetryPolicy {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            max_retries: config.retry_count,
            base_delay_ms: config.retry_base_delay_ms,
            max_delay_ms: config.retry_max_delay_ms.max(config.retry_base_delay_ms),
        }
    }
}

impl RetryPolicy {
    /// 第 `retry` 次重试前的等待：指数退避，封顶后加 0-25% 抖动
    pub fn backoff(&self, retry: u32) -> Duration {
        let exp = self
            .base_delay_ms
            .saturating_mul(2u64.saturating_pow(retry.saturating_sub(1)));
        let capped = exp.min(self.max_delay_ms);
        let jitter = rand::random_range(0..=capped / 4);
        Duration::from_millis(capped.saturating_add(jitter))
    }
}

/// 只重试 `Transient` 错误，其余原样返回
pub async fn with_retry<T, F, Fut>(
    operation: &str,
    policy: RetryPolicy,
    mut attempt: F,
) -> Result<T, DbErr>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    let mut retries = 0;
    loop {
        let err = match attempt().await {
            Ok(value) => {
                if retries > 0 {
                    debug!("{} succeeded after {} retries", operation, retries);
                }
                return Ok(value);
            }
            Err(e) => e,
        };

        match classify(&err) {
            DbFailure::Transient if retries < policy.max_retries => {
                retries += 1;
                let delay = policy.backoff(retries);
                warn!(
                    "{} hit a transient error (retry {}/{} in {:?}): {}",
                    operation, retries, policy.max_retries, delay, err
                );
                sleep(delay).await;
            }
            DbFailure::Duplicate => {
                debug!("{} rejected by unique index", operation);
                return Err(err);
            }
            _ => return Err(err),
        }
    }
}
