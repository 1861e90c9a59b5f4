//! 欧拉回路与欧拉路径。
//!
//! 回路构建采用子环拼接：每轮从结果中已出现的节点取一条未用边，沿未用边
//! 贪心前进直到回到该节点，形成子环，再把子环插入结果中该节点第一次出现的位置。
//! 平行边按重数逐条消耗。

use log::{debug, warn};

use super::{DirectedGraph, Edge, NodeLabel};
use crate::error::Result;
use crate::util::cancel::CancelToken;

/// 在邻接表 `adj` 上构建欧拉回路，返回节点编号序列（首尾相同）。
///
/// 调用方保证每个节点入度等于出度。没有边、或者边分布在多个互不相连的
/// 部分时返回 `Ok(None)`。
fn splice_cycles(adj: &[Vec<Edge>], cancel: &CancelToken) -> Result<Option<Vec<usize>>> {
    let n = adj.len();
    let mut remaining: Vec<Vec<Edge>> = adj.to_vec();
    let mut left: usize = adj.iter().flatten().map(|e| e.mult).sum();
    if left == 0 {
        return Ok(None);
    }

    let mut res: Vec<usize> = Vec::with_capacity(left + 1);
    let mut in_res = vec![false; n];
    let mut rounds = 0usize;

    while left > 0 {
        cancel.check()?;
        let has_unused = |u: usize| remaining[u].iter().any(|e| e.mult > 0);
        let start = match (0..n).find(|&u| (res.is_empty() || in_res[u]) && has_unused(u)) {
            Some(u) => u,
            None => {
                warn!("balanced graph is not connected: {} edges unreachable from the cycle", left);
                return Ok(None);
            }
        };

        let mut cycle = vec![start];
        let mut cur = start;
        loop {
            let next = match remaining[cur].iter_mut().find(|e| e.mult > 0) {
                Some(e) => {
                    e.mult -= 1;
                    e.to
                }
                // 只在入度 != 出度时发生
                None => return Ok(None),
            };
            left -= 1;
            cycle.push(next);
            cur = next;
            if cur == start {
                break;
            }
        }

        for &u in &cycle {
            in_res[u] = true;
        }
        if res.is_empty() {
            res = cycle;
        } else if let Some(pos) = res.iter().position(|&u| u == start) {
            res.splice(pos + 1..pos + 1, cycle.into_iter().skip(1));
        }
        rounds += 1;
    }

    debug!("eulerian cycle: {} sub-cycles spliced, {} nodes", rounds, res.len());
    Ok(Some(res))
}

impl<N: NodeLabel> DirectedGraph<N> {
    pub fn is_balanced_node(&self, v: &N) -> Result<bool> {
        let i = self.require_id(v)?;
        Ok(self.in_degree_id(i) == self.out_degree_id(i))
    }

    /// 所有节点入度等于出度
    pub fn is_balanced(&self) -> bool {
        let ins = self.in_degrees();
        (0..self.node_count()).all(|i| ins[i] == self.out_degree_id(i))
    }

    /// 近平衡判定：恰好一个节点 入度-出度 = -1（路径起点），恰好一个节点 = +1
    /// （路径终点），其余节点平衡。满足时返回 `(起点, 终点)`，否则返回 `None`
    /// （包括图本身已平衡的情形）。
    pub fn check_nearly_balanced(&self) -> Option<(&N, &N)> {
        self.near_balance_ids().map(|(s, e)| (self.label(s), self.label(e)))
    }

    fn near_balance_ids(&self) -> Option<(usize, usize)> {
        let ins = self.in_degrees();
        let mut start = None;
        let mut end = None;
        for (i, &indeg) in ins.iter().enumerate() {
            let diff = indeg as isize - self.out_degree_id(i) as isize;
            match diff {
                0 => {}
                -1 if start.is_none() => start = Some(i),
                1 if end.is_none() => end = Some(i),
                _ => return None,
            }
        }
        start.zip(end)
    }

    /// 欧拉回路：每条边恰好经过一次，首尾节点相同。
    /// 图不平衡、没有边或不连通时返回 `None`。
    pub fn eulerian_cycle(&self) -> Option<Vec<&N>> {
        self.eulerian_cycle_with(&CancelToken::new()).ok().flatten()
    }

    /// 可取消版本，每拼接一个子环检查一次 `cancel`。
    pub fn eulerian_cycle_with(&self, cancel: &CancelToken) -> Result<Option<Vec<&N>>> {
        if !self.is_balanced() {
            debug!("eulerian cycle: graph is not balanced");
            return Ok(None);
        }
        Ok(splice_cycles(&self.adjacency(), cancel)?.map(|c| self.labels(&c)))
    }

    /// 欧拉路径：要求图近平衡。
    ///
    /// 临时加入虚拟边 终点 -> 起点，在增广图上求欧拉回路，再从虚拟边之后切开，
    /// 得到从起点到终点的路径。原图不被修改。
    pub fn eulerian_path(&self) -> Option<Vec<&N>> {
        self.eulerian_path_with(&CancelToken::new()).ok().flatten()
    }

    pub fn eulerian_path_with(&self, cancel: &CancelToken) -> Result<Option<Vec<&N>>> {
        let (start, end) = match self.near_balance_ids() {
            Some(pair) => pair,
            None => {
                debug!("eulerian path: graph is not nearly balanced");
                return Ok(None);
            }
        };

        let mut adj = self.adjacency();
        match adj[end].iter_mut().find(|e| e.to == start) {
            Some(e) => e.mult += 1,
            None => adj[end].push(Edge { to: start, mult: 1 }),
        }

        let cycle = match splice_cycles(&adj, cancel)? {
            Some(c) => c,
            None => return Ok(None),
        };
        let cut = match (0..cycle.len() - 1).find(|&i| cycle[i] == end && cycle[i + 1] == start) {
            Some(i) => i,
            None => return Ok(None),
        };

        let mut path = Vec::with_capacity(cycle.len() - 1);
        path.extend_from_slice(&cycle[cut + 1..]);
        path.extend_from_slice(&cycle[1..=cut]);
        Ok(Some(self.labels(&path)))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::BioError;
    use std::collections::HashMap;

    /// 检查 `walk` 恰好按重数用完 `g` 的每条边
    pub(crate) fn uses_every_edge_once<N: NodeLabel>(g: &DirectedGraph<N>, walk: &[&N]) -> bool {
        let mut budget: HashMap<(&N, &N), usize> = HashMap::new();
        for (o, d) in g.edges() {
            *budget.entry((o, d)).or_insert(0) += 1;
        }
        for pair in walk.windows(2) {
            match budget.get_mut(&(pair[0], pair[1])) {
                Some(c) if *c > 0 => *c -= 1,
                _ => return false,
            }
        }
        budget.values().all(|&c| c == 0)
    }

    fn balanced() -> DirectedGraph<u32> {
        DirectedGraph::from_adjacency([
            (1, vec![2]),
            (2, vec![3, 1]),
            (3, vec![4]),
            (4, vec![2, 5]),
            (5, vec![6]),
            (6, vec![4]),
        ])
    }

    #[test]
    fn balance_checks() {
        let g = balanced();
        assert!(g.is_balanced());
        assert!(g.is_balanced_node(&4).unwrap());
        assert!(g.is_balanced_node(&42).is_err());
        assert_eq!(g.check_nearly_balanced(), None);

        let mut h = g.clone();
        h.add_edge(6, 7);
        assert!(!h.is_balanced());
        assert!(!h.is_balanced_node(&6).unwrap());
    }

    #[test]
    fn cycle_covers_all_edges() {
        let g = balanced();
        let cycle = g.eulerian_cycle().unwrap();
        assert_eq!(cycle.len(), g.edge_count() + 1);
        assert_eq!(cycle.first(), cycle.last());
        assert!(uses_every_edge_once(&g, &cycle));
    }

    #[test]
    fn cycle_rejects_unbalanced_and_edgeless() {
        let mut g = balanced();
        g.add_edge(1, 3);
        assert_eq!(g.eulerian_cycle(), None);

        let empty: DirectedGraph<u32> = DirectedGraph::from_adjacency([(1, vec![]), (2, vec![])]);
        assert!(empty.is_balanced());
        assert_eq!(empty.eulerian_cycle(), None);
    }

    #[test]
    fn cycle_rejects_disconnected_balanced_graph() {
        let g = DirectedGraph::from_adjacency([(1, vec![2]), (2, vec![1]), (3, vec![4]), (4, vec![3])]);
        assert!(g.is_balanced());
        assert_eq!(g.eulerian_cycle(), None);
    }

    #[test]
    fn cycle_with_parallel_edges_and_self_loop() {
        let mut g = DirectedGraph::new();
        g.add_parallel_edge('a', 'b');
        g.add_parallel_edge('a', 'b');
        g.add_parallel_edge('b', 'a');
        g.add_parallel_edge('b', 'a');
        g.add_edge('b', 'b');
        let cycle = g.eulerian_cycle().unwrap();
        assert_eq!(cycle.len(), 6);
        assert!(uses_every_edge_once(&g, &cycle));
    }

    #[test]
    fn nearly_balanced_pairs() {
        let g = DirectedGraph::from_adjacency([(1, vec![2]), (2, vec![3]), (3, vec![1, 4])]);
        assert_eq!(g.check_nearly_balanced(), Some((&3, &4)));

        // 两个起点候选 -> 无法构成欧拉路径
        let h = DirectedGraph::from_adjacency([(1, vec![3]), (2, vec![3]), (3, vec![4])]);
        assert_eq!(h.check_nearly_balanced(), None);
        assert_eq!(h.eulerian_path(), None);
    }

    #[test]
    fn path_runs_from_start_to_end() {
        let g = DirectedGraph::from_adjacency([(1, vec![2]), (2, vec![3]), (3, vec![1, 4])]);
        let before = g.clone();
        let path = g.eulerian_path().unwrap();
        assert_eq!(path.first(), Some(&&3));
        assert_eq!(path.last(), Some(&&4));
        assert_eq!(path.len(), g.edge_count() + 1);
        assert!(uses_every_edge_once(&g, &path));
        assert_eq!(g, before);
    }

    #[test]
    fn path_when_real_edge_parallels_the_virtual_one() {
        // 终点 b 到起点 a 本身已有一条边
        let mut g = DirectedGraph::new();
        g.add_parallel_edge("a", "b");
        g.add_parallel_edge("a", "b");
        g.add_parallel_edge("b", "a");
        let path = g.eulerian_path().unwrap();
        assert_eq!(path, vec![&"a", &"b", &"a", &"b"]);
        assert!(uses_every_edge_once(&g, &path));
    }

    #[test]
    fn cancelled_search_reports_error() {
        let g = balanced();
        let token = CancelToken::new();
        token.cancel();
        assert_eq!(g.eulerian_cycle_with(&token), Err(BioError::Cancelled));
        let p = DirectedGraph::from_adjacency([(1, vec![2])]);
        assert_eq!(p.eulerian_path_with(&token), Err(BioError::Cancelled));
    }
}
