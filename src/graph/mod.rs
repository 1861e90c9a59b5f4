//! 有向图引擎。
//!
//! 节点是任意可哈希的标签，底层存储是 `petgraph` 的 [`DiGraph`]，边权即重数。
//! 标签到 [`NodeIndex`] 的映射单独维护，节点编号就是插入顺序。遍历顺序完全
//! 由插入顺序决定，因此同一输入上的所有路径算法输出都是可复现的。
//!
//! - [`paths`] — BFS/DFS 可达性、双向最短路径
//! - [`metrics`] — 度分布、环检测、聚类系数、平均距离
//! - [`eulerian`] — 平衡性判定、欧拉回路与欧拉路径
//! - [`hamiltonian`] — 哈密顿路径的回溯搜索与校验
//! - [`metabolic`] — 代谢网络：节点类型、中心性、可达产物

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction::{Incoming, Outgoing};

use crate::error::{BioError, Result};

pub mod eulerian;
pub mod hamiltonian;
pub mod metabolic;
pub mod metrics;
pub mod paths;

pub use metabolic::{MetabolicNetwork, NetworkKind, NodeType, Reaction};
pub use metrics::{DegreeType, MeanDistances};

/// 图节点标签需要满足的约束。字符串、整数等常见标签都自动满足。
pub trait NodeLabel: Clone + Eq + Hash + fmt::Debug + Send + Sync {}

impl<T: Clone + Eq + Hash + fmt::Debug + Send + Sync> NodeLabel for T {}

/// 出边：目标节点编号与重数。普通边重数恒为 1，只有
/// [`DirectedGraph::add_parallel_edge`] 会让它增长。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Edge {
    pub to: usize,
    pub mult: usize,
}

#[inline]
fn ix(i: usize) -> NodeIndex {
    NodeIndex::new(i)
}

#[derive(Debug, Clone)]
pub struct DirectedGraph<N> {
    inner: DiGraph<N, usize>,
    ids: HashMap<N, NodeIndex>,
}

impl<N: NodeLabel> Default for DirectedGraph<N> {
    fn default() -> Self {
        Self { inner: DiGraph::new(), ids: HashMap::new() }
    }
}

impl<N: NodeLabel> PartialEq for DirectedGraph<N> {
    fn eq(&self, other: &Self) -> bool {
        self.nodes().eq(other.nodes()) && self.adjacency() == other.adjacency()
    }
}

impl<N: NodeLabel> Eq for DirectedGraph<N> {}

impl<N: NodeLabel> DirectedGraph<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从初始邻接表构建，例如 `[(1, vec![2]), (2, vec![3])]`。
    /// 只出现在目标位置的节点会被自动创建。
    pub fn from_adjacency<I, D>(adjacency: I) -> Self
    where
        I: IntoIterator<Item = (N, D)>,
        D: IntoIterator<Item = N>,
    {
        let mut g = Self::new();
        for (origin, dests) in adjacency {
            g.add_vertex(origin.clone());
            for d in dests {
                g.add_edge(origin.clone(), d);
            }
        }
        g
    }

    /// 添加节点；已存在时不做任何事。
    pub fn add_vertex(&mut self, v: N) {
        self.ensure_node(v);
    }

    /// 添加边 `o -> d`，缺失的端点会被创建。重复添加同一条边不改变图。
    pub fn add_edge(&mut self, o: N, d: N) {
        let (oi, di) = (self.ensure_node(o), self.ensure_node(d));
        if self.inner.find_edge(oi, di).is_none() {
            self.inner.add_edge(oi, di, 1);
        }
    }

    /// 添加一条平行边：若 `o -> d` 已存在则重数加一。
    pub fn add_parallel_edge(&mut self, o: N, d: N) {
        let (oi, di) = (self.ensure_node(o), self.ensure_node(d));
        match self.inner.find_edge(oi, di) {
            Some(e) => self.inner[e] += 1,
            None => {
                self.inner.add_edge(oi, di, 1);
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// 边数（计入重数）
    pub fn edge_count(&self) -> usize {
        self.inner.edge_references().map(|e| *e.weight()).sum()
    }

    /// (节点数, 边数)
    pub fn size(&self) -> (usize, usize) {
        (self.node_count(), self.edge_count())
    }

    pub fn is_empty(&self) -> bool {
        self.inner.node_count() == 0
    }

    /// 按插入顺序排列的全部节点
    pub fn nodes(&self) -> impl Iterator<Item = &N> + '_ {
        self.inner.raw_nodes().iter().map(|n| &n.weight)
    }

    /// 全部边，平行边按重数重复出现。
    pub fn edges(&self) -> Vec<(&N, &N)> {
        let mut res = Vec::with_capacity(self.edge_count());
        for oi in 0..self.node_count() {
            for e in self.out_edges(oi) {
                for _ in 0..e.mult {
                    res.push((self.label(oi), self.label(e.to)));
                }
            }
        }
        res
    }

    pub fn contains_node(&self, v: &N) -> bool {
        self.ids.contains_key(v)
    }

    pub fn has_edge(&self, o: &N, d: &N) -> bool {
        self.edge_multiplicity(o, d) > 0
    }

    pub fn edge_multiplicity(&self, o: &N, d: &N) -> usize {
        match (self.id(o), self.id(d)) {
            (Some(oi), Some(di)) => self.mult_id(oi, di),
            _ => 0,
        }
    }

    pub fn successors(&self, v: &N) -> Result<Vec<&N>> {
        let i = self.require_id(v)?;
        Ok(self.succ_ids(i).map(|j| self.label(j)).collect())
    }

    /// 前驱节点，按节点插入顺序返回。
    pub fn predecessors(&self, v: &N) -> Result<Vec<&N>> {
        let i = self.require_id(v)?;
        Ok(self.labels(&self.pred_ids(i)))
    }

    /// 前驱与后继的并集：先列前驱，再补上不在前驱中的后继。
    pub fn adjacents(&self, v: &N) -> Result<Vec<&N>> {
        let i = self.require_id(v)?;
        Ok(self.labels(&self.adj_ids(i)))
    }

    /// 出度（计入重数）
    pub fn out_degree(&self, v: &N) -> Result<usize> {
        let i = self.require_id(v)?;
        Ok(self.out_degree_id(i))
    }

    /// 入度（计入重数）
    pub fn in_degree(&self, v: &N) -> Result<usize> {
        let i = self.require_id(v)?;
        Ok(self.in_degree_id(i))
    }

    /// 度 = 相邻节点（前驱 ∪ 后继）的个数
    pub fn degree(&self, v: &N) -> Result<usize> {
        let i = self.require_id(v)?;
        Ok(self.adj_ids(i).len())
    }

    /// 所有边反向后的新图，重数保持不变。
    pub fn reversed(&self) -> Self {
        let mut inner = DiGraph::with_capacity(self.node_count(), self.inner.edge_count());
        for v in self.nodes() {
            inner.add_node(v.clone());
        }
        for oi in 0..self.node_count() {
            for e in self.out_edges(oi) {
                inner.add_edge(ix(e.to), ix(oi), e.mult);
            }
        }
        Self { inner, ids: self.ids.clone() }
    }

    // ── 基于编号的内部接口 ──────────────────────────────

    fn ensure_node(&mut self, v: N) -> NodeIndex {
        if let Some(&i) = self.ids.get(&v) {
            return i;
        }
        let i = self.inner.add_node(v.clone());
        self.ids.insert(v, i);
        i
    }

    /// petgraph 的邻边链表是新边在前，这里翻转回插入顺序。
    fn out_edges(&self, i: usize) -> Vec<Edge> {
        let mut es: Vec<Edge> = self
            .inner
            .edges_directed(ix(i), Outgoing)
            .map(|e| Edge { to: e.target().index(), mult: *e.weight() })
            .collect();
        es.reverse();
        es
    }

    #[inline]
    pub(crate) fn id(&self, v: &N) -> Option<usize> {
        self.ids.get(v).map(|i| i.index())
    }

    #[inline]
    pub(crate) fn require_id(&self, v: &N) -> Result<usize> {
        self.id(v).ok_or_else(|| BioError::node_not_found(v))
    }

    #[inline]
    pub(crate) fn label(&self, i: usize) -> &N {
        &self.inner[ix(i)]
    }

    pub(crate) fn labels(&self, ids: &[usize]) -> Vec<&N> {
        ids.iter().map(|&i| self.label(i)).collect()
    }

    /// 不同的后继编号（忽略重数），按插入顺序
    pub(crate) fn succ_ids(&self, i: usize) -> impl Iterator<Item = usize> {
        self.out_edges(i).into_iter().map(|e| e.to)
    }

    pub(crate) fn pred_ids(&self, i: usize) -> Vec<usize> {
        let mut preds: Vec<usize> = self.inner.neighbors_directed(ix(i), Incoming).map(|p| p.index()).collect();
        preds.sort_unstable();
        preds
    }

    pub(crate) fn adj_ids(&self, i: usize) -> Vec<usize> {
        let mut adj = self.pred_ids(i);
        for s in self.succ_ids(i) {
            if !adj.contains(&s) {
                adj.push(s);
            }
        }
        adj
    }

    #[inline]
    pub(crate) fn mult_id(&self, oi: usize, di: usize) -> usize {
        self.inner.find_edge(ix(oi), ix(di)).map_or(0, |e| self.inner[e])
    }

    pub(crate) fn out_degree_id(&self, i: usize) -> usize {
        self.inner.edges_directed(ix(i), Outgoing).map(|e| *e.weight()).sum()
    }

    pub(crate) fn in_degree_id(&self, i: usize) -> usize {
        self.inner.edges_directed(ix(i), Incoming).map(|e| *e.weight()).sum()
    }

    /// 一次遍历得到所有节点的入度
    pub(crate) fn in_degrees(&self) -> Vec<usize> {
        let mut deg = vec![0usize; self.node_count()];
        for e in self.inner.edge_references() {
            deg[e.target().index()] += *e.weight();
        }
        deg
    }

    /// 按插入顺序导出的邻接表，供需要临时改动边集的算法使用（如欧拉路径的虚拟边）
    pub(crate) fn adjacency(&self) -> Vec<Vec<Edge>> {
        (0..self.node_count()).map(|i| self.out_edges(i)).collect()
    }
}

impl<N: NodeLabel + fmt::Display> fmt::Display for DirectedGraph<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.nodes().enumerate() {
            write!(f, "{} -> [", v)?;
            for (k, e) in self.out_edges(i).iter().enumerate() {
                if k > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", self.label(e.to))?;
                if e.mult > 1 {
                    write!(f, " x{}", e.mult)?;
                }
            }
            writeln!(f, "]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// 1 -> 2 -> 3 <-> 2, 3 -> 4 -> 2
    pub(crate) fn cyclic() -> DirectedGraph<u32> {
        DirectedGraph::from_adjacency([(1, vec![2]), (2, vec![3]), (3, vec![2, 4]), (4, vec![2])])
    }

    /// 1 -> {2, 3}, 2 -> 4, 3 -> 5
    pub(crate) fn tree() -> DirectedGraph<u32> {
        DirectedGraph::from_adjacency([(1, vec![2, 3]), (2, vec![4]), (3, vec![5]), (4, vec![]), (5, vec![])])
    }

    #[test]
    fn build_incrementally_matches_adjacency() {
        let mut g = DirectedGraph::new();
        for v in 1..=4u32 {
            g.add_vertex(v);
        }
        g.add_edge(1, 2);
        g.add_edge(2, 3);
        g.add_edge(3, 2);
        g.add_edge(3, 4);
        g.add_edge(4, 2);
        assert_eq!(g, cyclic());
        assert_eq!(g.nodes().copied().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        assert_eq!(g.edges(), vec![(&1, &2), (&2, &3), (&3, &2), (&3, &4), (&4, &2)]);
        assert_eq!(g.size(), (4, 5));
    }

    #[test]
    fn add_vertex_is_idempotent() {
        let mut a = tree();
        let b = tree();
        a.add_vertex(3);
        a.add_vertex(3);
        assert_eq!(a, b);
        a.add_edge(1, 2);
        assert_eq!(a, b);
    }

    #[test]
    fn edge_creates_missing_endpoints() {
        let mut g = DirectedGraph::new();
        g.add_edge("x", "y");
        assert!(g.contains_node(&"x"));
        assert!(g.contains_node(&"y"));
        assert!(g.has_edge(&"x", &"y"));
        assert!(!g.has_edge(&"y", &"x"));
    }

    #[test]
    fn neighbourhood_queries() {
        let g = cyclic();
        assert_eq!(g.successors(&2).unwrap(), vec![&3]);
        assert_eq!(g.predecessors(&2).unwrap(), vec![&1, &3, &4]);
        assert_eq!(g.predecessors(&1).unwrap(), Vec::<&u32>::new());
        assert_eq!(g.adjacents(&2).unwrap(), vec![&1, &3, &4]);
        assert_eq!(g.adjacents(&1).unwrap(), vec![&2]);
        assert_eq!(g.in_degree(&2).unwrap(), 3);
        assert_eq!(g.out_degree(&3).unwrap(), 2);
        assert_eq!(g.degree(&2).unwrap(), 3);

        let t = tree();
        assert_eq!(t.successors(&1).unwrap(), vec![&2, &3]);
        assert_eq!(t.successors(&4).unwrap(), Vec::<&u32>::new());
        assert_eq!(t.predecessors(&5).unwrap(), vec![&3]);
    }

    #[test]
    fn missing_node_is_an_error() {
        let g = cyclic();
        assert_eq!(g.successors(&9), Err(BioError::NodeNotFound("9".into())));
        assert!(g.in_degree(&9).is_err());
        assert!(g.degree(&9).is_err());
    }

    #[test]
    fn degrees_consistent_with_adjacents() {
        let mut g = cyclic();
        g.add_edge(4, 4);
        for &v in g.nodes() {
            let succ = g.successors(&v).unwrap();
            let pred = g.predecessors(&v).unwrap();
            let overlap = succ.iter().filter(|s| pred.contains(*s)).count();
            assert_eq!(
                g.in_degree(&v).unwrap() + g.out_degree(&v).unwrap(),
                g.degree(&v).unwrap() + overlap,
                "node {}",
                v
            );
        }
    }

    #[test]
    fn parallel_edges_count_towards_degree() {
        let mut g = DirectedGraph::new();
        g.add_parallel_edge("CA", "AT");
        g.add_parallel_edge("CA", "AT");
        g.add_parallel_edge("CA", "AT");
        g.add_edge("CA", "AT");
        assert_eq!(g.edge_multiplicity(&"CA", &"AT"), 3);
        assert_eq!(g.out_degree(&"CA").unwrap(), 3);
        assert_eq!(g.in_degree(&"AT").unwrap(), 3);
        assert_eq!(g.degree(&"AT").unwrap(), 1);
        assert_eq!(g.edges().len(), 3);
    }

    #[test]
    fn reversed_flips_every_edge() {
        let g = cyclic();
        let r = g.reversed();
        assert_eq!(r.size(), g.size());
        for (o, d) in g.edges() {
            assert!(r.has_edge(d, o));
        }
        assert_eq!(r.successors(&2).unwrap(), vec![&1, &3, &4]);
    }

    #[test]
    fn insertion_order_survives_late_edges() {
        let mut g = DirectedGraph::new();
        g.add_edge('a', 'd');
        g.add_edge('a', 'b');
        g.add_edge('c', 'b');
        g.add_parallel_edge('a', 'c');
        g.add_parallel_edge('a', 'd');
        g.add_edge('b', 'b');
        assert_eq!(g.successors(&'a').unwrap(), vec![&'d', &'b', &'c']);
        assert_eq!(g.predecessors(&'b').unwrap(), vec![&'a', &'b', &'c']);
        assert_eq!(g.edge_multiplicity(&'a', &'d'), 2);
        assert_eq!(g.in_degree(&'b').unwrap(), 3);
        assert_eq!(g.out_degree(&'b').unwrap(), 1);
        assert_eq!(g.reversed().successors(&'b').unwrap(), vec![&'a', &'b', &'c']);
    }

    #[test]
    fn display_lists_adjacency() {
        let g = cyclic();
        let text = g.to_string();
        assert!(text.starts_with("1 -> [2]\n"));
        assert!(text.contains("3 -> [2, 4]\n"));
    }
}
