use anyhow::{bail, Context, Result};
use std::io::BufRead;

use crate::graph::DirectedGraph;

/// 解析边列表：每行 `起点 终点`，单个名字表示孤立节点，
/// 空行和 `#` 开头的行跳过。节点按首次出现的顺序编号。
pub fn read_edge_list<R: BufRead>(reader: R) -> Result<DirectedGraph<String>> {
    let mut g = DirectedGraph::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read edge list line {}", lineno + 1))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            [v] => g.add_vertex(v.to_string()),
            [o, d] => g.add_edge(o.to_string(), d.to_string()),
            _ => bail!("line {}: expected 'origin dest', got {} fields", lineno + 1, fields.len()),
        }
    }
    Ok(g)
}

pub fn read_edge_file(path: &str) -> Result<DirectedGraph<String>> {
    let fh = std::fs::File::open(path).with_context(|| format!("cannot open edge list '{}'", path))?;
    read_edge_list(std::io::BufReader::new(fh))
}

/// 每行一个片段，跳过空行和 `#` 注释。
pub fn read_fragments<R: BufRead>(reader: R) -> Result<Vec<String>> {
    let mut frags = Vec::new();
    for line in reader.lines() {
        let line = line.context("failed to read fragment line")?;
        let line = line.trim();
        if !line.is_empty() && !line.starts_with('#') {
            frags.push(line.to_string());
        }
    }
    Ok(frags)
}
