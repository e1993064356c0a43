//! 扫描主流程与并行调度
//!
//! 单样本流水线严格串行：静态扫描 → 体量限制 → 外部解码 → 静态去重 →
//! 忽略过滤 → 可疑关联 → 组装报告。样本间相互独立、无共享可变状态，
//! 批量模式据此并行。失败口径是“按样本全有或全无”：解码失败时丢弃
//! 已算出的静态结果，返回 Err 而不是残缺报告。
use anyhow::Result;
use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info};
use walkdir::WalkDir;

use crate::correlate::{correlate, filter_ignored};
use crate::decoder::DecoderEngine;
use crate::errors::ScanError;
use crate::limits::{apply_limits, truncate_chars};
use crate::options::{ScanOptions, ScanStats, StaticPolicy};
use crate::rules::RuleSet;
use crate::scanner::StaticScanner;
use crate::types::{Candidate, Origin, Report};

/// 对一段内存中的样本执行完整流水线
///
/// `sample` 仅用于日志与错误上下文。规则集由调用方显式传入
/// （每次扫描调用的不可变快照，并发扫描各自只读）。
pub fn scan_bytes(
    sample: &str,
    data: &[u8],
    decoder: &dyn DecoderEngine,
    rules: &RuleSet,
    opts: &ScanOptions,
) -> Result<Report, ScanError> {
    let scanner = StaticScanner::new(opts.minimum_string_len).map_err(|e| {
        ScanError::InvalidOptions { sample: sample.to_string(), reason: format!("{e:#}") }
    })?;

    // 静态扫描 + 体量限制（限制只作用于静态候选流）
    let static_candidates = apply_limits(
        sample,
        scanner.scan(data),
        opts.maximum_string_len,
        opts.maximum_strings,
    );

    // 外部引擎分析：零结果是成功，任何错误都让整个样本失败
    let analysis = decoder
        .analyze(data, opts.minimum_string_len)
        .map_err(|source| ScanError::AnalysisFailed { sample: sample.to_string(), source })?;

    // 解码结果对静态集合做逐字去重（只对静态集，不在 decoded/stack 内部去重）
    let static_set: HashSet<&str> =
        static_candidates.iter().map(|c| c.value.as_str()).collect();

    // 关联引擎的遍历顺序：decoded → stack → static
    let mut candidates: Vec<Candidate> = Vec::new();
    for s in analysis.decoded {
        if static_set.contains(s.as_str()) {
            continue;
        }
        candidates.push(Candidate::new(
            truncate_chars(&s, opts.maximum_string_len),
            Origin::Decoded,
        ));
    }
    for s in analysis.stack {
        candidates.push(Candidate::new(
            truncate_chars(&s, opts.maximum_string_len),
            Origin::Stack,
        ));
    }
    candidates.extend(static_candidates);

    // 忽略过滤对所有桶统一执行，之后才进入关联
    let surviving = filter_ignored(candidates, rules);
    let values: Vec<&str> = surviving.iter().map(|c| c.value.as_str()).collect();
    let warnings = correlate(&values, rules);

    Ok(assemble(surviving, warnings, opts.static_policy))
}

/// 将存活候选按来源桶归并为报告，并套用静态桶展示策略
fn assemble(surviving: Vec<Candidate>, warnings: Vec<String>, policy: StaticPolicy) -> Report {
    let mut report = Report { warnings, ..Report::default() };
    for c in surviving {
        match c.origin {
            Origin::Decoded => report.decoded_strings.push(c.value),
            Origin::Stack => report.stack_strings.push(c.value),
            Origin::StaticAscii | Origin::StaticUtf16 => report.static_strings.push(c.value),
        }
    }
    // 展示策略只影响组装；关联已经在全部桶上跑过
    if policy == StaticPolicy::OnlyWithoutDecoded
        && (!report.decoded_strings.is_empty() || !report.stack_strings.is_empty())
    {
        report.static_strings.clear();
    }
    report
}

/// 扫描单个样本文件：按上限截断读入，然后走内存流水线
pub fn scan_sample(
    path: &Path,
    decoder: &dyn DecoderEngine,
    rules: &RuleSet,
    opts: &ScanOptions,
) -> Result<Report, ScanError> {
    let sample = path.display().to_string();
    let unreadable = |source| ScanError::SampleUnreadable { sample: sample.clone(), source };

    let file = File::open(path).map_err(unreadable)?;
    let mut data = Vec::new();
    // 截断读：超出 max_sample_size 的部分不读取，这不是错误
    file.take(opts.max_sample_size)
        .read_to_end(&mut data)
        .map_err(unreadable)?;
    debug!(sample = %sample, bytes = data.len(), "sample loaded");

    scan_bytes(&sample, &data, decoder, rules, opts)
}

/// 扫描目录（深度 1）并将逐样本结果以 JSON 数组流式写入 `out`
///
/// 稳定性保证：
/// - 文件级：先收集文件并按文件名排序，确保输出顺序可复现
/// - 样本级失败写成 `{"sample", "error"}` 元素（显式失败信号），
///   不会中断其余样本
pub fn scan_dir_and_write(
    input_dir: &Path,
    out: &mut dyn Write,
    decoder: Arc<dyn DecoderEngine>,
    opts: &ScanOptions,
) -> Result<ScanStats> {
    // 规则每次调用只加载一次；缺失文件由 RuleSet 内部降级为空集
    let rules = Arc::new(RuleSet::load(
        opts.ignored_strings_path.as_deref(),
        opts.interesting_strings_path.as_deref(),
    ));

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(input_dir).min_depth(1).max_depth(1) {
        let entry = match entry { Ok(e) => e, Err(_) => continue };
        if entry.file_type().is_file() { files.push(entry.into_path()); }
    }
    // 按文件名排序，确保输出顺序稳定
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    info!(samples = files.len(), "starting batch scan");

    let mut stats = ScanStats::default();
    let threads = opts.threads.unwrap_or_else(num_cpus::get);

    if threads > 1 && files.len() > 1 {
        scan_dir_parallel(&files, out, decoder, &rules, opts, &mut stats, threads)?;
        return Ok(stats);
    }

    // 串行路径
    write!(out, "[")?;
    let mut first = true;
    for path in &files {
        let sample = path.display().to_string();
        let res = scan_sample(path, decoder.as_ref(), &rules, opts);
        write_element(out, &mut first, &sample, res, &mut stats)?;
    }
    write!(out, "]")?;
    Ok(stats)
}

/// 并行调度：
/// - 后台线程建 Rayon 线程池并行扫描
/// - 单线程 Writer 按 idx 重排并流式写 JSON，保证稳定顺序
fn scan_dir_parallel(
    files: &[PathBuf],
    out: &mut dyn Write,
    decoder: Arc<dyn DecoderEngine>,
    rules: &Arc<RuleSet>,
    opts: &ScanOptions,
    stats: &mut ScanStats,
    threads: usize,
) -> Result<()> {
    use crossbeam_channel as channel;
    use rayon::prelude::*;
    use std::collections::BTreeMap;

    write!(out, "[")?;
    let mut first = true;

    // worker → writer 的结果通道
    type Msg = (usize /*idx*/, String /*sample*/, Result<Report, ScanError>);
    let (tx, rx) = channel::bounded::<Msg>(256);

    // &mut out 留在当前线程做 Writer；扫描在后台线程的 Rayon 池里执行
    let files_vec: Vec<(usize, PathBuf)> = files
        .iter()
        .enumerate()
        .map(|(i, p)| (i, p.clone()))
        .collect();
    let rules = Arc::clone(rules);
    let opts = opts.clone();

    let scan_thread = std::thread::spawn(move || {
        let pool = match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(p) => p,
            Err(e) => {
                error!(error = %e, "cannot build scan thread pool");
                return;
            }
        };
        pool.install(|| {
            files_vec.par_iter().for_each(|(idx, path)| {
                let sample = path.display().to_string();
                let res = scan_sample(path, decoder.as_ref(), &rules, &opts);
                let _ = tx.send((*idx, sample, res));
            });
        });
        // 池退出后所有 Sender 被丢弃，Writer 端随之收到关闭信号
    });

    // Writer：维护 next_idx 与缓存，按序输出
    let mut next_idx: usize = 0;
    let mut buffer: BTreeMap<usize, (String, Result<Report, ScanError>)> = BTreeMap::new();

    while let Ok((idx, sample, res)) = rx.recv() {
        buffer.insert(idx, (sample, res));
        while let Some((sample, res)) = buffer.remove(&next_idx) {
            write_element(out, &mut first, &sample, res, stats)?;
            next_idx += 1;
        }
    }

    let _ = scan_thread.join();

    // 冲刷残余（理论上缓冲应已清空）
    while let Some((sample, res)) = buffer.remove(&next_idx) {
        write_element(out, &mut first, &sample, res, stats)?;
        next_idx += 1;
    }

    write!(out, "]")?;
    Ok(())
}

/// 写出一个样本的 JSON 元素（成功带 report，失败带 error 文本）
fn write_element(
    out: &mut dyn Write,
    first: &mut bool,
    sample: &str,
    res: Result<Report, ScanError>,
    stats: &mut ScanStats,
) -> Result<()> {
    if !*first { write!(out, ",")?; } else { *first = false; }
    match res {
        Ok(report) => {
            stats.samples_scanned += 1;
            stats.candidates_total += report.static_strings.len()
                + report.decoded_strings.len()
                + report.stack_strings.len();
            stats.warnings_total += report.warnings.len();
            let item = serde_json::json!({ "sample": sample, "report": report });
            serde_json::to_writer(&mut *out, &item)?;
        }
        Err(e) => {
            stats.samples_failed += 1;
            error!(sample, error = %e, "sample scan failed");
            let item = serde_json::json!({ "sample": sample, "error": e.to_string() });
            serde_json::to_writer(&mut *out, &item)?;
        }
    }
    Ok(())
}
