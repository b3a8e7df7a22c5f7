//! 点击分析：UA 分类与按需聚合

pub mod classifier;
pub mod summary;

pub use classifier::{Browser, DeviceType, UaClass, classify};
pub use summary::{ClickSummary, summarize_clicks};
