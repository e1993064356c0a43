//! 忽略过滤与可疑关联
//!
//! 设计要点：
//! - 过滤在关联之前、对所有桶统一执行；命中任一忽略字面量即整条丢弃
//!   （不计数、不报告、不参与关联）。过滤是幂等的。
//! - 单项规则：在存活集中找到第一条包含该项的候选即产出一条告警并停止
//!   （每条单项规则每次扫描至多一条告警）。
//! - 多项规则：各项分别在存活集中有命中（允许不同候选）才告警；部分
//!   命中不产出任何东西。
//! - 告警按文本精确去重，保留首次出现顺序；同一存活集上重跑结果不变。
use std::collections::HashSet;

use crate::rules::{RuleSet, SuspicionRule};
use crate::types::Candidate;

/// 对候选序列执行忽略过滤，保留存活者（顺序不变）
pub(crate) fn filter_ignored(candidates: Vec<Candidate>, rules: &RuleSet) -> Vec<Candidate> {
    candidates
        .into_iter()
        .filter(|c| !rules.is_ignored(&c.value))
        .collect()
}

/// 在全体存活候选上运行可疑规则，返回去重后的告警列表
///
/// `candidates` 的遍历顺序决定单项规则命中时具体引用哪条候选文本；
/// 告警本身按规则顺序产出。
pub(crate) fn correlate(candidates: &[&str], rules: &RuleSet) -> Vec<String> {
    let mut warnings: Vec<String> = Vec::new();

    for rule in &rules.suspicious {
        match rule {
            SuspicionRule::Single(term) => {
                // 首个包含该项的候选即命中；告警中引用命中的候选文本
                if let Some(hit) = candidates.iter().find(|c| c.contains(term.as_str())) {
                    warnings.push(format!("Found suspicious string: {hit}"));
                }
            }
            SuspicionRule::Correlated(terms) => {
                let mut remaining = terms.len();
                for term in terms {
                    if candidates.iter().any(|c| c.contains(term.as_str())) {
                        remaining -= 1;
                    }
                }
                // 集合级关联：每一项都有命中才成立（候选可以各不相同）
                if remaining == 0 {
                    warnings.push(format!(
                        "Found suspicious correlation of strings: {}",
                        terms.join(",")
                    ));
                }
            }
        }
    }

    dedup_preserve_order(warnings)
}

/// 按文本精确去重，保留首次出现的顺序
fn dedup_preserve_order(warnings: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out: Vec<String> = Vec::new();
    for w in warnings {
        if seen.insert(w.clone()) {
            out.push(w);
        }
    }
    out
}
