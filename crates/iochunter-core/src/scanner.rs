//! 静态字符串扫描引擎（字节级）
//!
//! 设计要点：
//! - 两条固定模式：可打印 ASCII 连续段（0x1F–0x7E）与 UTF-16LE 连续段
//!   （低字节可打印、高字节 0x00），长度阈值分别按字节数 / 码元数计。
//! - 两路扫描各自独立跑完整个缓冲区；同一区域按不同对齐可能被两路同时
//!   命中，这里刻意不做重叠抑制，保持容忍重复的简单扫描。
//! - 空缓冲区产出空序列，不是错误。
use anyhow::{Context, Result};
use regex::bytes::Regex;

use crate::types::{Candidate, Origin};

/// 由最小长度编译出的两条字节正则（单次扫描构建一次，可跨线程共享）
pub(crate) struct StaticScanner {
    ascii: Regex,
    utf16: Regex,
}

impl StaticScanner {
    /// 从最小长度构建扫描器（长度计入正则的重复下限）
    pub(crate) fn new(minimum_string_len: usize) -> Result<Self> {
        let min = minimum_string_len.max(1);
        let ascii = Regex::new(&format!(r"(?-u)[\x1f-\x7e]{{{min},}}"))
            .context("compile ascii run pattern")?;
        let utf16 = Regex::new(&format!(r"(?-u)(?:[\x1f-\x7e]\x00){{{min},}}"))
            .context("compile utf-16le run pattern")?;
        Ok(Self { ascii, utf16 })
    }

    /// 扫描整个缓冲区，按扫描顺序返回候选项（先 ascii 一轮，再 utf16 一轮）
    pub(crate) fn scan(&self, data: &[u8]) -> Vec<Candidate> {
        let mut out: Vec<Candidate> = Vec::new();

        for m in self.ascii.find_iter(data) {
            // 字符类覆盖 0x1F–0x7E，整段必为合法 ASCII
            let value = String::from_utf8_lossy(m.as_bytes()).into_owned();
            out.push(Candidate::new(value, Origin::StaticAscii));
        }

        for m in self.utf16.find_iter(data) {
            // 低字节即字符本体（高字节恒为 0x00），逐码元取出即可
            let value: String = m
                .as_bytes()
                .iter()
                .step_by(2)
                .map(|&b| b as char)
                .collect();
            out.push(Candidate::new(value, Origin::StaticUtf16));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(cands: &[Candidate]) -> Vec<&str> {
        cands.iter().map(|c| c.value.as_str()).collect()
    }

    #[test]
    fn ascii_runs_above_minimum_are_extracted() {
        let scanner = StaticScanner::new(6).unwrap();
        let mut data = vec![0u8; 16];
        data.extend_from_slice(b"infected123456");
        data.extend_from_slice(&[0x00, 0x01]);
        data.extend_from_slice(b"short");
        let cands = scanner.scan(&data);
        assert_eq!(values(&cands), vec!["infected123456"]);
        assert_eq!(cands[0].origin, Origin::StaticAscii);
    }

    #[test]
    fn ascii_candidates_respect_byte_range_and_length() {
        let scanner = StaticScanner::new(4).unwrap();
        let data = b"\x00abcd\xffwxyz12\x80";
        for c in scanner.scan(data) {
            assert!(c.value.len() >= 4);
            assert!(c.value.bytes().all(|b| (0x1f..=0x7e).contains(&b)));
        }
    }

    #[test]
    fn utf16_runs_are_decoded_with_unit_count_minimum() {
        let scanner = StaticScanner::new(6).unwrap();
        // "kernel32" 的 UTF-16LE 编码，前后夹非打印字节
        let mut data = vec![0xff, 0xfe];
        for b in b"kernel32" {
            data.push(*b);
            data.push(0x00);
        }
        data.push(0x90);
        let cands = scanner.scan(&data);
        let utf16: Vec<&Candidate> = cands
            .iter()
            .filter(|c| c.origin == Origin::StaticUtf16)
            .collect();
        assert_eq!(utf16.len(), 1);
        assert_eq!(utf16[0].value, "kernel32");
    }

    #[test]
    fn utf16_run_below_minimum_units_is_dropped() {
        let scanner = StaticScanner::new(6).unwrap();
        let mut data = Vec::new();
        for b in b"abcde" {
            data.push(*b);
            data.push(0x00);
        }
        let cands = scanner.scan(&data);
        assert!(cands.iter().all(|c| c.origin != Origin::StaticUtf16));
    }

    #[test]
    fn empty_buffer_yields_no_candidates() {
        let scanner = StaticScanner::new(6).unwrap();
        assert!(scanner.scan(&[]).is_empty());
    }

    #[test]
    fn overlapping_ascii_and_utf16_views_are_both_reported() {
        // 对 UTF-16 数据，ascii 一路也可能按别的对齐命中；不做重叠抑制
        let scanner = StaticScanner::new(2).unwrap();
        let mut data = Vec::new();
        for b in b"AB" {
            data.push(*b);
            data.push(0x00);
        }
        data.extend_from_slice(b"CDEF");
        let cands = scanner.scan(&data);
        assert!(cands.iter().any(|c| c.origin == Origin::StaticUtf16));
        assert!(cands.iter().any(|c| c.origin == Origin::StaticAscii));
    }
}
