//! 基于图的序列组装。
//!
//! 片段 -> 图（de Bruijn / overlap）-> 欧拉或哈密顿路径 -> 重建序列。

pub mod debruijn;
pub mod overlap;

use log::info;

use crate::error::{BioError, Result};

pub use debruijn::DeBruijnGraph;
pub use overlap::{Fragment, OverlapGraph};

/// 组装方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum AssemblyMethod {
    /// (k-1)-mer 节点 + 欧拉路径
    #[default]
    #[value(name = "debruijn")]
    DeBruijn,
    /// 片段节点 + 哈密顿路径
    Overlap,
}

/// 组装参数，对应命令行 `assemble` 子命令
#[derive(Debug, Clone, Copy)]
pub struct AssembleOpt {
    pub k: usize,
    pub method: AssemblyMethod,
    /// overlap 图中为重复片段加序号区分
    pub with_reps: bool,
}

impl Default for AssembleOpt {
    fn default() -> Self {
        Self { k: 3, method: AssemblyMethod::DeBruijn, with_reps: false }
    }
}

/// 去掉最后一个符号
#[inline]
pub fn prefix(frag: &str) -> &str {
    match frag.char_indices().next_back() {
        Some((i, _)) => &frag[..i],
        None => frag,
    }
}

/// 去掉第一个符号
#[inline]
pub fn suffix(frag: &str) -> &str {
    let mut chars = frag.chars();
    chars.next();
    chars.as_str()
}

/// 序列中所有长度为 `k` 的子串，按字典序排序。`k` 大于序列长度时为空。
pub fn composition(k: usize, seq: &str) -> Result<Vec<String>> {
    if k == 0 {
        return Err(BioError::invalid("k-mer size must be positive"));
    }
    if !seq.is_ascii() {
        return Err(BioError::invalid("sequence must be ASCII"));
    }
    if k > seq.len() {
        return Ok(Vec::new());
    }
    let mut res: Vec<String> = (0..=seq.len() - k).map(|i| seq[i..i + k].to_string()).collect();
    res.sort();
    Ok(res)
}

/// 校验片段非空、ASCII、等长，且不短于 `min_len`，返回公共长度。
pub(crate) fn check_fragments<S: AsRef<str>>(frags: &[S], min_len: usize) -> Result<usize> {
    let first = frags
        .first()
        .ok_or_else(|| BioError::invalid("no fragments given"))?
        .as_ref()
        .len();
    for (i, f) in frags.iter().enumerate() {
        let f = f.as_ref();
        if !f.is_ascii() {
            return Err(BioError::invalid(format!("fragment #{} is not ASCII", i)));
        }
        if f.len() != first {
            return Err(BioError::invalid(format!(
                "fragment #{} has length {}, expected {}",
                i,
                f.len(),
                first
            )));
        }
    }
    if first < min_len {
        return Err(BioError::invalid(format!("fragments must have at least {} symbols", min_len)));
    }
    Ok(first)
}

/// 把序列切成 k-mer 再组装。
pub fn assemble_sequence(seq: &str, opt: &AssembleOpt) -> Result<Option<String>> {
    let frags = composition(opt.k, seq)?;
    info!("composition: {} fragments of length {}", frags.len(), opt.k);
    assemble_fragments(&frags, opt)
}

/// 按 `opt.method` 组装片段；找不到路径时返回 `Ok(None)`。
pub fn assemble_fragments<S: AsRef<str>>(frags: &[S], opt: &AssembleOpt) -> Result<Option<String>> {
    let res = match opt.method {
        AssemblyMethod::DeBruijn => {
            let g = DeBruijnGraph::from_fragments(frags)?;
            info!("de Bruijn graph: {} nodes, {} edges", g.graph().node_count(), g.graph().edge_count());
            g.assemble()
        }
        AssemblyMethod::Overlap => {
            let g = OverlapGraph::new(frags, opt.with_reps)?;
            info!("overlap graph: {} nodes, {} edges", g.graph().node_count(), g.graph().edge_count());
            g.assemble()
        }
    };
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_suffix() {
        assert_eq!(prefix("ATG"), "AT");
        assert_eq!(suffix("ATG"), "TG");
        assert_eq!(prefix(""), "");
        assert_eq!(suffix(""), "");
    }

    #[test]
    fn prefix_suffix_respect_char_boundaries() {
        assert_eq!(prefix("é"), "");
        assert_eq!(suffix("é"), "");
        assert_eq!(prefix("aé"), "a");
        assert_eq!(suffix("éa"), "a");
        assert_eq!(prefix("Aαβ"), "Aα");
        assert_eq!(suffix("αβA"), "βA");
    }

    #[test]
    fn composition_sorted() {
        assert_eq!(composition(3, "ATGCA").unwrap(), vec!["ATG", "GCA", "TGC"]);
        assert!(composition(6, "ATGCA").unwrap().is_empty());
        assert!(composition(0, "ATGCA").is_err());
    }

    #[test]
    fn fragment_checks() {
        assert_eq!(check_fragments(&["AC", "GT"], 2).unwrap(), 2);
        assert!(check_fragments::<&str>(&[], 2).is_err());
        assert!(check_fragments(&["ACG", "GT"], 2).is_err());
        assert!(check_fragments(&["A", "C"], 2).is_err());
    }

    #[test]
    fn both_methods_reconstruct() {
        let seq = "ATGCAATGGTCTG";
        let db = assemble_sequence(seq, &AssembleOpt { k: 3, ..AssembleOpt::default() }).unwrap();
        assert_eq!(db.as_deref(), Some(seq));

        let opt = AssembleOpt { k: 3, method: AssemblyMethod::Overlap, with_reps: true };
        let ov = assemble_sequence(seq, &opt).unwrap().unwrap();
        assert_eq!(ov.len(), seq.len());
        assert_eq!(composition(3, &ov).unwrap(), composition(3, seq).unwrap());
    }
}
