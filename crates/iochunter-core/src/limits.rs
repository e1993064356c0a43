//! 体量限制（单条截断 + 总量上限）
//!
//! 两个上限都以 0 表示关闭。超限属于非致命情况：截断 + warn 级日志，
//! 绝不中止扫描，也不产生可疑告警（与关联引擎的 Warning 严格区分）。
use tracing::warn;

use crate::types::Candidate;

/// 超限哨兵：追加在被截断的候选序列末尾，提示结果不完整
pub(crate) const SNIP_MARKER: &str = "[snip]";

/// 按字符数截断（ascii 即字节数，utf16 解码后按字符计）
pub(crate) fn truncate_chars(s: &str, maximum_string_len: usize) -> String {
    if maximum_string_len == 0 {
        return s.to_string();
    }
    s.chars().take(maximum_string_len).collect()
}

/// 对候选序列施加两个上限：
/// - maximum_string_len > 0：逐条截断文本；
/// - maximum_strings > 0 且超限：保留扫描顺序中的前 N 条并追加哨兵。
/// 顺序保持不变，本阶段不做去重。
pub(crate) fn apply_limits(
    sample: &str,
    mut candidates: Vec<Candidate>,
    maximum_string_len: usize,
    maximum_strings: usize,
) -> Vec<Candidate> {
    if maximum_string_len > 0 {
        for c in candidates.iter_mut() {
            if c.value.chars().count() > maximum_string_len {
                c.value = truncate_chars(&c.value, maximum_string_len);
            }
        }
    }

    if maximum_strings > 0 && candidates.len() > maximum_strings {
        warn!(sample, limit = maximum_strings, "maximum number of strings reached");
        let origin = candidates[maximum_strings - 1].origin;
        candidates.truncate(maximum_strings);
        // 哨兵沿用截断点的来源桶，随后与普通候选一样经过过滤与关联
        candidates.push(Candidate::new(SNIP_MARKER.to_string(), origin));
    }

    candidates
}
