//! 扫描配置文件加载（TOML）
//!
//! 所有字段均可选：配置文件只覆盖显式给出的项，其余沿用默认值；
//! CLI 的单项参数再覆盖配置文件。文件本身损坏（存在但解析失败）
//! 视为调用方错误，直接报错而不是静默忽略。
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::options::{ScanOptions, StaticPolicy};

/// 配置文件结构（逐字段可选）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanConfig {
    #[serde(default)]
    pub minimum_string_len: Option<usize>,
    #[serde(default)]
    pub maximum_string_len: Option<usize>,
    #[serde(default)]
    pub maximum_strings: Option<usize>,
    #[serde(default)]
    pub max_sample_size: Option<u64>,
    #[serde(default)]
    pub ignored_strings_file: Option<PathBuf>,
    #[serde(default)]
    pub interesting_strings_file: Option<PathBuf>,
    #[serde(default)]
    pub static_policy: Option<StaticPolicy>,
    #[serde(default)]
    pub threads: Option<usize>,
}

/// 从 TOML 文件加载配置
pub fn load_scan_config(path: &Path) -> Result<ScanConfig> {
    let txt = std::fs::read_to_string(path)
        .with_context(|| format!("read config file {}", path.display()))?;
    let cfg: ScanConfig = toml::from_str(&txt)
        .with_context(|| format!("parse config file {}", path.display()))?;
    Ok(cfg)
}

impl ScanConfig {
    /// 将配置中显式给出的字段套用到选项上
    pub fn apply(self, opts: &mut ScanOptions) {
        if let Some(v) = self.minimum_string_len { opts.minimum_string_len = v; }
        if let Some(v) = self.maximum_string_len { opts.maximum_string_len = v; }
        if let Some(v) = self.maximum_strings { opts.maximum_strings = v; }
        if let Some(v) = self.max_sample_size { opts.max_sample_size = v; }
        if let Some(v) = self.ignored_strings_file { opts.ignored_strings_path = Some(v); }
        if let Some(v) = self.interesting_strings_file { opts.interesting_strings_path = Some(v); }
        if let Some(v) = self.static_policy { opts.static_policy = v; }
        if let Some(v) = self.threads { opts.threads = Some(v); }
    }
}
