//! 扫描错误类型（对外暴露）
//!
//! 口径：致命失败用显式 Err 表达（样本不可读 / 外部引擎分析失败），
//! 调用方不可能把“没有发现”误读成“分析失败”。错误文本携带样本标识
//! 与失败阶段，但绝不回显规则内容。
use thiserror::Error;

use crate::decoder::DecoderError;

/// 单样本扫描的致命错误，对应“报告缺席”
#[derive(Debug, Error)]
pub enum ScanError {
    /// 样本不可读（打开或读取失败），扫描立即中止
    #[error("cannot read sample {sample}: {source}")]
    SampleUnreadable {
        sample: String,
        #[source]
        source: std::io::Error,
    },

    /// 外部解码引擎分析失败（含超时）；已算出的静态结果一并丢弃
    #[error("decoder analysis failed for sample {sample}: {source}")]
    AnalysisFailed {
        sample: String,
        #[source]
        source: DecoderError,
    },

    /// 扫描参数无法构建扫描器（如最小长度超出正则重复上限）
    #[error("invalid scan options for sample {sample}: {reason}")]
    InvalidOptions { sample: String, reason: String },
}

impl ScanError {
    /// 失败样本的标识（供上层按样本聚合日志）
    pub fn sample(&self) -> &str {
        match self {
            ScanError::SampleUnreadable { sample, .. } => sample,
            ScanError::AnalysisFailed { sample, .. } => sample,
            ScanError::InvalidOptions { sample, .. } => sample,
        }
    }
}
