use std::fmt;

use anyhow::Context;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::sa;
use crate::error::{BioError, Result};
use crate::util::seq::{self, SENTINEL};

/// 带出现序号的符号：BWT 列（或首列）中第 `rank` 个 `symbol`（从 0 计）。
/// 同一个 token 在首列和末列各出现恰好一次，二者之间即 LF 映射。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub symbol: u8,
    pub rank: usize,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.symbol as char, self.rank)
    }
}

/// 索引元数据（构建来源、参数、时间）
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexMeta {
    pub source: Option<String>,
    pub build_args: Option<String>,
    pub build_timestamp: Option<String>,
}

/// 根据排序后的旋转起点取出 BWT（末列）符号。
pub fn build_bwt(text: &[u8], sa: &[usize]) -> Vec<u8> {
    let n = text.len();
    sa.iter().map(|&p| if p == 0 { text[n - 1] } else { text[p - 1] }).collect()
}

/// 按出现顺序为每个符号编号
fn tag_occurrences(symbols: &[u8]) -> Vec<Token> {
    let mut seen = [0usize; 256];
    symbols
        .iter()
        .map(|&s| {
            let rank = seen[s as usize];
            seen[s as usize] += 1;
            Token { symbol: s, rank }
        })
        .collect()
}

/// Burrows-Wheeler 全文索引。
///
/// 构建时对带哨兵文本的全部循环旋转排序（通过后缀数组完成，不显式物化旋转表），
/// 保存：
/// - 旋转起点（后缀数组）
/// - 首列与末列的带序号 token
/// - 末列 -> 首列的 LF 映射及其逆映射
///
/// 构建后只读。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BwtIndex {
    /// 含哨兵的原始文本
    text: Vec<u8>,
    sentinel: u8,
    sa: Vec<usize>,
    /// 首列（排序后的文本）
    first: Vec<Token>,
    /// 末列（BWT）
    last: Vec<Token>,
    /// lf[i] = 末列第 i 个 token 在首列中的位置
    lf: Vec<usize>,
    /// fl = lf 的逆
    fl: Vec<usize>,
    meta: IndexMeta,
}

impl BwtIndex {
    /// 以 `$` 为哨兵构建。
    pub fn build(text: &[u8]) -> Result<Self> {
        Self::build_with_sentinel(text, SENTINEL)
    }

    /// 文本中 `sentinel` 必须恰好出现一次，通常位于末尾；在其他位置时，
    /// 原序列按循环旋转理解为从哨兵之后开始。
    pub fn build_with_sentinel(text: &[u8], sentinel: u8) -> Result<Self> {
        let count = text.iter().filter(|&&b| b == sentinel).count();
        if count != 1 {
            return Err(BioError::invalid(format!(
                "text must contain the sentinel '{}' exactly once, found {}",
                sentinel as char, count
            )));
        }
        let n = text.len();

        let codes = sa::encode_ranks(text, sentinel)?;
        let sa_arr = sa::sort_rotations(&codes);
        debug!("bwt: sorted {} rotations", n);

        let last_syms = build_bwt(text, &sa_arr);
        let first_syms: Vec<u8> = sa_arr.iter().map(|&p| text[p]).collect();
        let first = tag_occurrences(&first_syms);
        let last = tag_occurrences(&last_syms);

        // 首列中每个符号块的起始位置
        let mut block_start = [usize::MAX; 256];
        for (i, t) in first.iter().enumerate() {
            if t.rank == 0 {
                block_start[t.symbol as usize] = i;
            }
        }
        let mut lf = vec![0usize; n];
        let mut fl = vec![0usize; n];
        for (i, t) in last.iter().enumerate() {
            let j = block_start[t.symbol as usize] + t.rank;
            lf[i] = j;
            fl[j] = i;
        }

        info!("bwt index built: {} symbols", n);
        Ok(Self { text: text.to_vec(), sentinel, sa: sa_arr, first, last, lf, fl, meta: IndexMeta::default() })
    }

    /// 含哨兵的长度
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn text(&self) -> &[u8] {
        &self.text
    }

    pub fn sentinel(&self) -> u8 {
        self.sentinel
    }

    /// 末列 token 序列
    pub fn bwt_tokens(&self) -> &[Token] {
        &self.last
    }

    /// 首列 token 序列
    pub fn first_tokens(&self) -> &[Token] {
        &self.first
    }

    pub fn bwt_string(&self) -> String {
        self.last.iter().map(|t| t.symbol as char).collect()
    }

    pub fn first_column(&self) -> String {
        self.first.iter().map(|t| t.symbol as char).collect()
    }

    /// 末列位置 -> 首列位置
    pub fn lf(&self, i: usize) -> usize {
        self.lf[i]
    }

    /// 排序后第 `row` 行的旋转
    pub fn rotation(&self, row: usize) -> Vec<u8> {
        let p = self.sa[row];
        let mut r = self.text[p..].to_vec();
        r.extend_from_slice(&self.text[..p]);
        r
    }

    /// 后缀数组：按排序后的旋转顺序给出每个旋转在文本中的起点
    pub fn suffix_array(&self) -> &[usize] {
        &self.sa
    }

    /// 还原原始序列（不含哨兵）。
    ///
    /// 从末列为哨兵的那一行出发：该行首列即原序列第一个符号；在末列找到
    /// 同一个 token 所在行，它的首列就是下一个符号，如此前进。
    pub fn original_sequence(&self) -> Vec<u8> {
        let n = self.len();
        let mut row = self.last.iter().position(|t| t.symbol == self.sentinel).unwrap_or(0);
        let mut out = Vec::with_capacity(n.saturating_sub(1));
        for _ in 1..n {
            out.push(self.first[row].symbol);
            row = self.fl[row];
        }
        out
    }

    /// 以 `pattern` 开头的旋转在排序表中的行号（升序）。
    ///
    /// 从首列中等于模式末字符的行开始，自右向左逐个字符过滤：保留末列符号
    /// 等于当前字符的行，并经 LF 映射到首列。
    pub fn matching_rows(&self, pattern: &[u8]) -> Result<Vec<usize>> {
        let (&tail, head) = pattern
            .split_last()
            .ok_or_else(|| BioError::invalid("empty search pattern"))?;

        let mut rows: Vec<usize> = (0..self.len()).filter(|&r| self.first[r].symbol == tail).collect();
        for &c in head.iter().rev() {
            if rows.is_empty() {
                break;
            }
            rows = rows
                .into_iter()
                .filter(|&r| self.last[r].symbol == c)
                .map(|r| self.lf[r])
                .collect();
        }
        rows.sort_unstable();
        Ok(rows)
    }

    /// `pattern` 在文本中出现的全部起点（升序）。不出现时返回空列表。
    pub fn find_pattern(&self, pattern: &[u8]) -> Result<Vec<usize>> {
        let mut pos: Vec<usize> = self.matching_rows(pattern)?.into_iter().map(|r| self.sa[r]).collect();
        pos.sort_unstable();
        debug!("find_pattern '{}': {} hits", String::from_utf8_lossy(pattern), pos.len());
        Ok(pos)
    }

    /// 同时查找模式及其反向互补，返回 (正链命中, 负链命中)。
    pub fn find_both_strands(&self, pattern: &[u8]) -> Result<(Vec<usize>, Vec<usize>)> {
        let fwd = self.find_pattern(pattern)?;
        let rev = self.find_pattern(&seq::revcomp(pattern))?;
        Ok((fwd, rev))
    }

    pub fn count(&self, pattern: &[u8]) -> Result<usize> {
        Ok(self.matching_rows(pattern)?.len())
    }

    pub fn meta(&self) -> &IndexMeta {
        &self.meta
    }

    pub fn set_meta(&mut self, meta: IndexMeta) {
        self.meta = meta;
    }

    pub fn save_to_file(&self, path: &str) -> anyhow::Result<()> {
        let f = std::fs::File::create(path).with_context(|| format!("cannot create '{}'", path))?;
        bincode::serialize_into(std::io::BufWriter::new(f), self)?;
        Ok(())
    }

    pub fn load_from_file(path: &str) -> anyhow::Result<Self> {
        let f = std::fs::File::open(path).with_context(|| format!("cannot open '{}'", path))?;
        let idx: Self = bincode::deserialize_from(std::io::BufReader::new(f))?;
        Ok(idx)
    }
}
