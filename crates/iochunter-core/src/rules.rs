//! 规则文件加载（忽略列表 + 可疑字符串列表）
//!
//! 设计要点：
//! - 两个文件都是纯文本、每行一条规则；空行跳过。
//! - 可疑行里出现分隔符 "_AND_" 即解析为多项关联规则（各项分别命中
//!   存活集中的某个候选即告警，不要求同一条候选）。
//! - 文件缺失或不可读是“配置缺席”，非致命：info 级日志 + 空规则集。
//! - 忽略列表编译成 Aho-Corasick 自动机，一次构建、整个扫描只读共享。
use std::path::Path;

use aho_corasick::AhoCorasick;
use tracing::info;

/// 多项关联规则的分隔符
pub const STRING_SEPARATOR: &str = "_AND_";

/// 单条可疑规则：单项字面量，或 AND 连接的多项关联
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SuspicionRule {
    Single(String),
    Correlated(Vec<String>),
}

/// 一次扫描调用的规则快照（不可变；并发扫描各拿各的引用）
#[derive(Debug, Default)]
pub struct RuleSet {
    pub(crate) ignored: Vec<String>,
    pub(crate) suspicious: Vec<SuspicionRule>,
    /// 忽略字面量的包含匹配自动机；列表为空时为 None
    pub(crate) ignore_matcher: Option<AhoCorasick>,
}

impl RuleSet {
    /// 从两个可选文件加载规则集；任一文件缺失都替换为空列表
    pub fn load(
        ignored_path: Option<&Path>,
        interesting_path: Option<&Path>,
    ) -> Self {
        let ignored = match ignored_path {
            Some(p) => read_rule_lines(p, "ignored strings"),
            None => {
                info!("no file with ignored strings defined");
                Vec::new()
            }
        };
        let interesting = match interesting_path {
            Some(p) => read_rule_lines(p, "interesting strings"),
            None => {
                info!("no file with interesting strings defined");
                Vec::new()
            }
        };
        Self::from_lines(ignored, interesting)
    }

    /// 从行列表构建（便于测试与上层按其他来源注入规则）
    pub fn from_lines(ignored: Vec<String>, interesting: Vec<String>) -> Self {
        let suspicious = interesting
            .into_iter()
            .filter_map(|line| parse_suspicion_rule(&line))
            .collect();
        let ignore_matcher = if ignored.is_empty() {
            None
        } else {
            // 默认 MatchKind 足够：只关心“是否包含任一字面量”
            AhoCorasick::new(&ignored).ok()
        };
        Self { ignored, suspicious, ignore_matcher }
    }

    /// 候选是否命中忽略列表（大小写敏感的子串包含；一条命中即丢弃）
    pub(crate) fn is_ignored(&self, candidate: &str) -> bool {
        match &self.ignore_matcher {
            Some(ac) => ac.is_match(candidate),
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ignored.is_empty() && self.suspicious.is_empty()
    }
}

/// 解析一行可疑规则；空行与退化规则（分隔后无有效项）返回 None
fn parse_suspicion_rule(line: &str) -> Option<SuspicionRule> {
    if line.is_empty() {
        return None;
    }
    if line.contains(STRING_SEPARATOR) {
        // 丢弃分隔产生的空项，避免“空子串匹配一切”的退化规则
        let terms: Vec<String> = line
            .split(STRING_SEPARATOR)
            .filter(|t| !t.is_empty())
            .map(|t| t.to_string())
            .collect();
        match terms.len() {
            0 => None,
            1 => Some(SuspicionRule::Single(terms.into_iter().next().unwrap())),
            _ => Some(SuspicionRule::Correlated(terms)),
        }
    } else {
        Some(SuspicionRule::Single(line.to_string()))
    }
}

/// 读出规则文件的全部行；失败时记 info 日志并返回空列表（非致命）
fn read_rule_lines(path: &Path, what: &str) -> Vec<String> {
    match std::fs::read_to_string(path) {
        Ok(txt) => {
            let lines: Vec<String> = txt
                .lines()
                .filter(|l| !l.is_empty())
                .map(|l| l.to_string())
                .collect();
            info!(path = %path.display(), rules = lines.len(), "loaded {what}");
            lines
        }
        Err(_) => {
            info!(path = %path.display(), "no file with {what} defined");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn plain_line_becomes_single_rule() {
        assert_eq!(
            parse_suspicion_rule("infected"),
            Some(SuspicionRule::Single("infected".to_string()))
        );
    }

    #[test]
    fn separator_line_becomes_correlated_rule() {
        assert_eq!(
            parse_suspicion_rule("CreateRemoteThread_AND_WriteProcessMemory"),
            Some(SuspicionRule::Correlated(vec![
                "CreateRemoteThread".to_string(),
                "WriteProcessMemory".to_string(),
            ]))
        );
    }

    #[test]
    fn empty_terms_are_discarded() {
        assert_eq!(
            parse_suspicion_rule("_AND_mutex"),
            Some(SuspicionRule::Single("mutex".to_string()))
        );
        assert_eq!(parse_suspicion_rule("_AND_"), None);
        assert_eq!(parse_suspicion_rule(""), None);
    }

    #[test]
    fn missing_files_yield_empty_rule_set() {
        let rs = RuleSet::load(
            Some(Path::new("/nonexistent/ignored.txt")),
            Some(Path::new("/nonexistent/interesting.txt")),
        );
        assert!(rs.is_empty());
    }

    #[test]
    fn rule_files_are_loaded_line_per_rule() {
        let dir = tempfile::tempdir().unwrap();
        let ign = dir.path().join("ignored.txt");
        let sus = dir.path().join("interesting.txt");
        let mut f = std::fs::File::create(&ign).unwrap();
        writeln!(f, "Microsoft").unwrap();
        writeln!(f).unwrap();
        writeln!(f, "Windows").unwrap();
        let mut f = std::fs::File::create(&sus).unwrap();
        writeln!(f, "infected").unwrap();
        writeln!(f, "a_AND_b").unwrap();

        let rs = RuleSet::load(Some(&ign), Some(&sus));
        assert_eq!(rs.ignored, vec!["Microsoft", "Windows"]);
        assert_eq!(rs.suspicious.len(), 2);
        assert!(rs.is_ignored("Microsoft Corporation"));
        assert!(!rs.is_ignored("microsoft"));
    }
}
