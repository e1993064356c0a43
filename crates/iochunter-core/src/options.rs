//! 扫描选项与统计信息（模块）
use std::path::PathBuf;

/// 静态字符串的展示策略
/// 两个来源变体对“有 decoded/stack 结果时是否仍报告静态桶”口径不一，
/// 这里做成显式开关而不是猜测意图。关联引擎始终看到全部桶，开关只影响组装。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaticPolicy {
    /// 始终报告静态桶（默认，信息量更大）
    #[default]
    Always,
    /// 仅在没有 decoded/stack 结果时报告静态桶
    OnlyWithoutDecoded,
}

/// 扫描选项（每次调用的不可变快照，线程间只读共享）
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// 报告字符串的最小长度（> 0；ascii 按字节、utf16 按码元计）
    pub minimum_string_len: usize,
    /// 单条字符串的最大长度（字符数）；0 表示不截断
    pub maximum_string_len: usize,
    /// 静态字符串的最大条数；0 表示不限制，超限追加 "[snip]" 哨兵
    pub maximum_strings: usize,
    /// 样本最大读取字节数；超出部分不读取（截断读，不是错误）
    pub max_sample_size: u64,
    /// 忽略列表文件路径（每行一条字面量）；缺失时按空列表处理
    pub ignored_strings_path: Option<PathBuf>,
    /// 可疑字符串文件路径（每行一条，含 "_AND_" 的行为多项关联规则）
    pub interesting_strings_path: Option<PathBuf>,
    /// 静态桶展示策略
    pub static_policy: StaticPolicy,
    /// 批量模式线程数：None 表示自动（等于 CPU 核数）；Some(1) 走串行
    pub threads: Option<usize>,
}

/// 默认值沿用原模块口径：最小 6、最大 256 字符、最多 5000 条、样本上限 16 MiB
impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            minimum_string_len: 6,
            maximum_string_len: 256,
            maximum_strings: 5000,
            max_sample_size: 16 * 1024 * 1024,
            ignored_strings_path: None,
            interesting_strings_path: None,
            static_policy: StaticPolicy::default(),
            threads: None,
        }
    }
}

/// 扫描统计信息（便于 CLI 打印）
#[derive(Debug, Default, Clone)]
pub struct ScanStats {
    pub samples_scanned: usize,
    pub samples_failed: usize,
    pub candidates_total: usize,
    pub warnings_total: usize,
}
