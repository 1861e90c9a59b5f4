use log::debug;

use super::{check_fragments, prefix, suffix};
use crate::error::{BioError, Result};
use crate::graph::DirectedGraph;

/// de Bruijn 图：每个长度为 k 的片段贡献一条 前缀(k-1) -> 后缀(k-1) 的边。
/// 重复片段产生平行边，重数计入出入度。
#[derive(Debug, Clone)]
pub struct DeBruijnGraph {
    graph: DirectedGraph<String>,
    k: usize,
}

impl DeBruijnGraph {
    /// 片段须等长且至少 2 个符号。
    pub fn from_fragments<S: AsRef<str>>(frags: &[S]) -> Result<Self> {
        let k = check_fragments(frags, 2)?;
        let mut graph = DirectedGraph::new();
        for f in frags {
            let f = f.as_ref();
            graph.add_parallel_edge(prefix(f).to_string(), suffix(f).to_string());
        }
        debug!("de Bruijn graph from {} fragments, k = {}", frags.len(), k);
        Ok(Self { graph, k })
    }

    pub fn graph(&self) -> &DirectedGraph<String> {
        &self.graph
    }

    /// 片段长度
    pub fn k(&self) -> usize {
        self.k
    }

    pub fn eulerian_path(&self) -> Option<Vec<&String>> {
        self.graph.eulerian_path()
    }

    /// 欧拉路径 + 拼接。图不近平衡时返回 `None`。
    pub fn assemble(&self) -> Option<String> {
        let path = self.eulerian_path()?;
        sequence_from_path(&path).ok()
    }
}

/// 第一个节点整体保留，之后每个节点只追加最后一个符号。
pub fn sequence_from_path<S: AsRef<str>>(path: &[S]) -> Result<String> {
    let (first, rest) = path
        .split_first()
        .ok_or_else(|| BioError::invalid("cannot build a sequence from an empty path"))?;
    let mut seq = first.as_ref().to_string();
    for node in rest {
        if let Some(c) = node.as_ref().chars().last() {
            seq.push(c);
        }
    }
    Ok(seq)
}
