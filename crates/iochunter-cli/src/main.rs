use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use iochunter_core::{
    load_scan_config, scan_dir_and_write, scan_sample, NullDecoder, RuleSet, ScanOptions,
    StaticPolicy,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// 命令行入口（基于 clap）
#[derive(Parser, Debug)]
#[command(name = "iochunter", version, about = "Extract and correlate indicator strings from binary samples")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 扫描单个样本或样本目录并生成 result.json
    Scan {
        /// 输入：样本文件，或只含样本的目录（深度 1）
        #[arg(long)]
        input: PathBuf,

        /// 输出文件（目录模式为 JSON 数组，单样本为单个报告对象）
        #[arg(long, default_value = "./result.json")]
        output: PathBuf,

        /// TOML 配置文件；单项参数会覆盖其中的同名配置
        #[arg(long)]
        config: Option<PathBuf>,

        /// 报告字符串的最小长度
        #[arg(long)]
        min_len: Option<usize>,

        /// 单条字符串的最大长度（字符数，0 不截断）
        #[arg(long)]
        max_len: Option<usize>,

        /// 静态字符串最大条数（0 不限制，超限追加 "[snip]"）
        #[arg(long)]
        max_strings: Option<usize>,

        /// 样本最大读取字节数（超出部分忽略）
        #[arg(long)]
        max_sample_size: Option<u64>,

        /// 忽略列表文件（每行一条字面量）
        #[arg(long)]
        ignored: Option<PathBuf>,

        /// 可疑字符串文件（每行一条；含 "_AND_" 的行为关联规则）
        #[arg(long)]
        interesting: Option<PathBuf>,

        /// 有 decoded/stack 结果时是否仍报告静态桶
        #[arg(long, default_value = "always", value_parser = ["always", "only-without-decoded"])]
        static_policy: String,

        /// 批量模式线程数（"auto"=CPU 核心数）
        #[arg(long, default_value = "auto")]
        threads: String,
    },
}

fn main() -> Result<()> {
    // 初始化日志（支持通过 RUST_LOG 控制等级，例如 info、debug）
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            input,
            output,
            config,
            min_len,
            max_len,
            max_strings,
            max_sample_size,
            ignored,
            interesting,
            static_policy,
            threads,
        } => {
            info!(?input, ?output, "starting scan");

            // 选项来源优先级：默认值 < 配置文件 < 命令行单项参数
            let mut opts = ScanOptions::default();
            if let Some(path) = config {
                load_scan_config(&path)
                    .context("load scan config")?
                    .apply(&mut opts);
            }
            if let Some(v) = min_len { opts.minimum_string_len = v; }
            if let Some(v) = max_len { opts.maximum_string_len = v; }
            if let Some(v) = max_strings { opts.maximum_strings = v; }
            if let Some(v) = max_sample_size { opts.max_sample_size = v; }
            if let Some(v) = ignored { opts.ignored_strings_path = Some(v); }
            if let Some(v) = interesting { opts.interesting_strings_path = Some(v); }
            if static_policy == "only-without-decoded" {
                opts.static_policy = StaticPolicy::OnlyWithoutDecoded;
            }
            if let Some(n) = parse_threads(&threads) { opts.threads = Some(n); }

            let mut out = BufWriter::new(File::create(&output).context("create output file")?);

            if input.is_dir() {
                // 未接入第三方解码引擎时使用空实现（decoded/stack 恒为空）
                let stats = scan_dir_and_write(&input, &mut out, Arc::new(NullDecoder), &opts)
                    .context("batch scan failed")?;
                out.flush().ok();
                info!(
                    samples_scanned = stats.samples_scanned,
                    samples_failed = stats.samples_failed,
                    candidates_total = stats.candidates_total,
                    warnings_total = stats.warnings_total,
                    "scan finished"
                );
            } else {
                let rules = RuleSet::load(
                    opts.ignored_strings_path.as_deref(),
                    opts.interesting_strings_path.as_deref(),
                );
                let report = scan_sample(&input, &NullDecoder, &rules, &opts)?;
                serde_json::to_writer_pretty(&mut out, &report).context("write report")?;
                out.flush().ok();
                info!(
                    static_strings = report.static_strings.len(),
                    warnings = report.warnings.len(),
                    "scan finished"
                );
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    // 支持通过环境变量 RUST_LOG 控制日志等级，如：RUST_LOG=debug
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(env_filter).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// 解析线程参数
fn parse_threads(s: &str) -> Option<usize> {
    if s.eq_ignore_ascii_case("auto") { return None; }
    match s.parse::<usize>() {
        Ok(n) if n >= 1 => Some(n),
        _ => None,
    }
}
