//! 代谢网络。
//!
//! 在 [`DirectedGraph<String>`] 之上记录每个节点的类型（代谢物或反应）。
//! 基础形态是代谢物-反应二部图：底物指向反应，反应指向产物，可逆反应双向连边。
//! 由它可以投影出只含代谢物或只含反应的网络：`a -> x -> b` 折叠为 `a -> b`。

use std::collections::{HashMap, VecDeque};
use std::str::FromStr;

use log::debug;
use rayon::prelude::*;

use super::{DegreeType, DirectedGraph};
use crate::error::{BioError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Metabolite,
    Reaction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkKind {
    #[default]
    MetaboliteReaction,
    MetaboliteMetabolite,
    ReactionReaction,
}

/// 一条反应：`id: A + B => C` 或可逆的 `id: A <=> B`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub id: String,
    pub substrates: Vec<String>,
    pub products: Vec<String>,
    pub reversible: bool,
}

impl Reaction {
    pub fn new(id: &str, substrates: &[&str], products: &[&str], reversible: bool) -> Self {
        let owned = |ms: &[&str]| -> Vec<String> { ms.iter().map(|m| m.to_string()).collect() };
        Self { id: id.to_string(), substrates: owned(substrates), products: owned(products), reversible }
    }
}

impl FromStr for Reaction {
    type Err = BioError;

    fn from_str(line: &str) -> Result<Self> {
        let (id, body) = line
            .split_once(':')
            .ok_or_else(|| BioError::invalid(format!("reaction '{}' has no ':' after its id", line.trim())))?;
        let (reversible, (left, right)) = if let Some(sides) = body.split_once("<=>") {
            (true, sides)
        } else if let Some(sides) = body.split_once("=>") {
            (false, sides)
        } else {
            return Err(BioError::invalid(format!("reaction '{}' has no '=>' or '<=>'", line.trim())));
        };
        let side = |s: &str| -> Vec<String> {
            s.split('+').map(str::trim).filter(|m| !m.is_empty()).map(String::from).collect()
        };
        Ok(Self { id: id.trim().to_string(), substrates: side(left), products: side(right), reversible })
    }
}

#[derive(Debug, Clone, Default)]
pub struct MetabolicNetwork {
    graph: DirectedGraph<String>,
    node_types: HashMap<String, NodeType>,
    kind: NetworkKind,
}

impl MetabolicNetwork {
    pub fn new(kind: NetworkKind) -> Self {
        Self { graph: DirectedGraph::new(), node_types: HashMap::new(), kind }
    }

    /// 由反应列表构建。`split_rev` 为真时可逆反应 `r` 拆成正向 `r` 与逆向 `r_b` 两个节点。
    ///
    /// 反应 id 或代谢物名为空、同一名字既作代谢物又作反应时返回 `InvalidInput`。
    pub fn from_reactions(reactions: &[Reaction], kind: NetworkKind, split_rev: bool) -> Result<Self> {
        let mut mr = Self::new(NetworkKind::MetaboliteReaction);
        for r in reactions {
            if r.id.is_empty() {
                return Err(BioError::invalid("reaction with an empty id"));
            }
            let split = r.reversible && split_rev;
            let back = format!("{}_b", r.id);
            mr.add_vertex_type(&r.id, NodeType::Reaction)?;
            if split {
                mr.add_vertex_type(&back, NodeType::Reaction)?;
            }
            for m in &r.substrates {
                mr.add_metabolite(m, &r.id)?;
                mr.add_edge(m, &r.id);
                if split {
                    mr.add_edge(&back, m);
                } else if r.reversible {
                    mr.add_edge(&r.id, m);
                }
            }
            for m in &r.products {
                mr.add_metabolite(m, &r.id)?;
                if split {
                    mr.add_edge(m, &back);
                } else if r.reversible {
                    mr.add_edge(m, &r.id);
                }
                mr.add_edge(&r.id, m);
            }
        }
        debug!(
            "metabolic network: {} reactions, {} nodes, {} edges",
            reactions.len(),
            mr.graph.node_count(),
            mr.graph.edge_count()
        );

        Ok(match kind {
            NetworkKind::MetaboliteReaction => mr,
            NetworkKind::MetaboliteMetabolite => mr.project(NodeType::Metabolite, kind),
            NetworkKind::ReactionReaction => mr.project(NodeType::Reaction, kind),
        })
    }

    fn add_metabolite(&mut self, m: &str, reaction: &str) -> Result<()> {
        if m.is_empty() {
            return Err(BioError::invalid(format!("empty metabolite name in reaction '{}'", reaction)));
        }
        self.add_vertex_type(m, NodeType::Metabolite)
    }

    /// 只保留类型为 `t` 的节点，经由另一类节点的两步路径连边（不含自环）。
    fn project(&self, t: NodeType, kind: NetworkKind) -> Self {
        let mut net = Self::new(kind);
        let keep: Vec<usize> = (0..self.graph.node_count()).filter(|&i| self.type_of_id(i) == Some(t)).collect();
        for &v in &keep {
            let label = self.graph.label(v);
            net.graph.add_vertex(label.clone());
            net.node_types.insert(label.clone(), t);
        }
        for &v in &keep {
            for mid in self.graph.succ_ids(v) {
                for w in self.graph.succ_ids(mid) {
                    if w != v {
                        net.graph.add_edge(self.graph.label(v).clone(), self.graph.label(w).clone());
                    }
                }
            }
        }
        net
    }

    /// 添加带类型的节点。已有相同类型时不做任何事，类型冲突时报错。
    pub fn add_vertex_type(&mut self, v: &str, t: NodeType) -> Result<()> {
        match self.node_types.get(v) {
            Some(&old) if old != t => {
                return Err(BioError::invalid(format!("'{}' is already a {:?}, not a {:?}", v, old, t)));
            }
            Some(_) => {}
            None => {
                self.node_types.insert(v.to_string(), t);
            }
        }
        self.graph.add_vertex(v.to_string());
        Ok(())
    }

    /// 添加边；端点不存在时以无类型节点创建。
    pub fn add_edge(&mut self, o: &str, d: &str) {
        self.graph.add_edge(o.to_string(), d.to_string());
    }

    pub fn graph(&self) -> &DirectedGraph<String> {
        &self.graph
    }

    pub fn kind(&self) -> NetworkKind {
        self.kind
    }

    pub fn node_type(&self, v: &str) -> Option<NodeType> {
        self.node_types.get(v).copied()
    }

    /// 类型为 `t` 的节点，按插入顺序
    pub fn nodes_of_type(&self, t: NodeType) -> Vec<&String> {
        self.graph.nodes().filter(|v| self.node_type(v) == Some(t)).collect()
    }

    fn type_of_id(&self, i: usize) -> Option<NodeType> {
        self.node_type(self.graph.label(i))
    }

    /// 度中心性：相邻节点数 / (n - 1)
    pub fn degrees_centrality(&self) -> Vec<(&String, f64)> {
        let n = self.graph.node_count();
        self.graph
            .all_degrees(DegreeType::InOut)
            .into_iter()
            .map(|(v, d)| (v, if n < 2 { 0.0 } else { d as f64 / (n - 1) as f64 }))
            .collect()
    }

    /// 接近中心性（Wasserman-Faust）：`(r / (n - 1)) * (r / Σd)`，
    /// r 为可达节点数，Σd 为到它们的距离之和。没有可达节点时为 0。
    pub fn closeness_centrality(&self) -> Vec<(&String, f64)> {
        let n = self.graph.node_count();
        let scores: Vec<f64> = (0..n)
            .into_par_iter()
            .map(|i| {
                let dists = self.graph.distances_from(i);
                if dists.is_empty() || n < 2 {
                    return 0.0;
                }
                let total: usize = dists.iter().map(|&(_, d)| d).sum();
                let r = dists.len() as f64;
                (r / (n - 1) as f64) * (r / total as f64)
            })
            .collect();
        self.graph.nodes().zip(scores).collect()
    }

    /// `s` 到 `t` 的最短路径上的中间节点记 1，其余记 0。没有路径时返回 `Ok(None)`。
    pub fn betweenness_centrality(&self, s: &str, t: &str) -> Result<Option<Vec<(&String, usize)>>> {
        let (s, t) = (s.to_string(), t.to_string());
        let path = match self.graph.shortest_path(&s, &t)? {
            Some(p) => p,
            None => return Ok(None),
        };
        Ok(Some(
            self.graph
                .nodes()
                .map(|v| (v, usize::from(*v != s && *v != t && path.contains(&v))))
                .collect(),
        ))
    }

    /// 从给定代谢物出发可被激活的反应，按发现顺序。
    pub fn active_reactions(&self, metabolites: &[&str]) -> Result<Vec<&String>> {
        let start = self.start_ids(metabolites)?;
        Ok(self.graph.labels(&self.reachable_of_type(&start, NodeType::Reaction)))
    }

    /// 从给定节点出发可以产生的代谢物，按发现顺序。
    pub fn produced_metabolites(&self, start: &[&str]) -> Result<Vec<&String>> {
        let start = self.start_ids(start)?;
        Ok(self.graph.labels(&self.reachable_of_type(&start, NodeType::Metabolite)))
    }

    /// 由初始代谢物反复激活反应、收集产物，直到不再出现新的代谢物。
    /// 初始代谢物只有在被某个反应重新产生时才会出现在结果中。
    pub fn final_metabolites(&self, initial: &[&str]) -> Result<Vec<&String>> {
        let mut queue: VecDeque<usize> = self.start_ids(initial)?.into();
        let mut seen = vec![false; self.graph.node_count()];
        let mut res = Vec::new();
        while let Some(x) = queue.pop_front() {
            let reactions = self.reachable_of_type(&[x], NodeType::Reaction);
            for m in self.reachable_of_type(&reactions, NodeType::Metabolite) {
                if !seen[m] {
                    seen[m] = true;
                    res.push(m);
                    queue.push_back(m);
                }
            }
        }
        Ok(self.graph.labels(&res))
    }

    fn start_ids(&self, names: &[&str]) -> Result<Vec<usize>> {
        if self.kind != NetworkKind::MetaboliteReaction {
            return Err(BioError::invalid(format!(
                "production queries need a metabolite-reaction network, not {:?}",
                self.kind
            )));
        }
        names.iter().map(|v| self.graph.require_id(&v.to_string())).collect()
    }

    /// 从 `start` 出发 BFS，收集类型为 `t` 的后继节点。起点本身不预先标记，
    /// 因此可以被重新到达。
    fn reachable_of_type(&self, start: &[usize], t: NodeType) -> Vec<usize> {
        let n = self.graph.node_count();
        let mut visited = vec![false; n];
        let mut found = vec![false; n];
        let mut queue: VecDeque<usize> = start.iter().copied().collect();
        let mut res = Vec::new();
        while let Some(u) = queue.pop_front() {
            for w in self.graph.succ_ids(u) {
                if !found[w] && self.type_of_id(w) == Some(t) {
                    found[w] = true;
                    res.push(w);
                }
                if !visited[w] {
                    visited[w] = true;
                    queue.push_back(w);
                }
            }
        }
        res
    }
}
