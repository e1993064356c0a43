//! 指标提取与关联核心库
//!
//! 设计要点：
//! - 从二进制样本中按字节模式提取可读字符串（ASCII / UTF-16LE 两路），
//!   外部解码引擎通过能力接口注入，可换可桩。
//! - 单样本流水线严格串行、无跨样本状态；规则集按调用显式传入的不可变
//!   快照，并发扫描天然隔离。
//! - 致命失败（样本不可读、引擎分析失败）以显式 Err 表达，“无发现”
//!   永远不会和“分析失败”混淆。
//! - 体量超限与配置缺席均为非致命：截断/空规则集 + 日志。

mod config;
mod correlate;
mod decoder;
mod errors;
mod limits;
mod options;
mod rules;
mod scan;
mod scanner;
mod types;

pub use config::{load_scan_config, ScanConfig};
pub use decoder::{DecoderEngine, DecoderError, DecoderOutput, NullDecoder};
pub use errors::ScanError;
pub use options::{ScanOptions, ScanStats, StaticPolicy};
pub use rules::{RuleSet, STRING_SEPARATOR};
pub use scan::{scan_bytes, scan_dir_and_write, scan_sample};
pub use types::{Origin, Report};
