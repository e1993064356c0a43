//! 公共类型（对外暴露）
use serde::Serialize;

/// 候选字符串的来源桶
/// - StaticAscii / StaticUtf16：直接字节模式扫描得到（静态字符串）。
/// - Decoded：外部引擎识别解码例程后还原的字符串。
/// - Stack：外部引擎从栈缓冲重建的字符串。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    StaticAscii,
    StaticUtf16,
    Decoded,
    Stack,
}

/// 待过滤/关联的候选项（内部使用，随单次扫描生灭）
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub(crate) value: String,
    pub(crate) origin: Origin,
}

impl Candidate {
    pub(crate) fn new(value: String, origin: Origin) -> Self {
        Self { value, origin }
    }
}

/// 单样本扫描报告（对应输出 JSON 的 report 字段）
/// 注意：全部桶为空且无告警是合法结果；“分析失败”以 Err 表达，绝不退化为空报告。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub static_strings: Vec<String>,
    pub decoded_strings: Vec<String>,
    pub stack_strings: Vec<String>,
    pub warnings: Vec<String>,
}

impl Report {
    /// 是否完全没有产出（合法的“无发现”结果）
    pub fn is_empty(&self) -> bool {
        self.static_strings.is_empty()
            && self.decoded_strings.is_empty()
            && self.stack_strings.is_empty()
            && self.warnings.is_empty()
    }
}
