//! 外部解码引擎的适配边界（能力接口，而非具体依赖）
//!
//! 设计要点：
//! - 引擎做自己的控制流恢复，合法地可能产出零结果；任何错误都是
//!   “分析失败”而非“零结果”，由调用方将整个样本判为失败。
//! - 超时/取消由调用方约束（对恶意样本的无界分析是可用性风险）；
//!   Timeout 变体留给包装引擎上报，便于与普通失败区分记录。
//! - 以 trait 对象注入，测试中可用桩替换，不触碰扫描/关联逻辑。
use std::time::Duration;

use thiserror::Error;

/// 引擎一次分析的产出：解码得到的字符串与栈重建的字符串
#[derive(Debug, Clone, Default)]
pub struct DecoderOutput {
    pub decoded: Vec<String>,
    pub stack: Vec<String>,
}

/// 外部引擎错误（对样本而言是致命的）
#[derive(Debug, Error)]
pub enum DecoderError {
    #[error("analysis failed: {0}")]
    Analysis(String),

    #[error("analysis timed out after {0:?}")]
    Timeout(Duration),
}

/// 解码引擎能力接口
/// 契约：对样本无副作用；Ok 中两个序列都可以为空。
pub trait DecoderEngine: Send + Sync {
    fn analyze(&self, sample: &[u8], minimum_string_len: usize)
        -> Result<DecoderOutput, DecoderError>;
}

/// 空实现：未接入第三方引擎时使用，永远成功且产出为空
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDecoder;

impl DecoderEngine for NullDecoder {
    fn analyze(&self, _sample: &[u8], _minimum_string_len: usize)
        -> Result<DecoderOutput, DecoderError> {
        Ok(DecoderOutput::default())
    }
}
