//! 可达性与最短路径。

use std::collections::VecDeque;
use std::fmt;

use super::{DirectedGraph, NodeLabel};
use crate::error::Result;

/// 在给定邻接表上做 BFS，返回 `s` 到 `d` 的第一条（即最短的）路径。
/// 在出队节点的邻居中一发现 `d` 就立即返回。
fn bfs_path(adj: &[Vec<usize>], s: usize, d: usize) -> Option<Vec<usize>> {
    let mut parent: Vec<Option<usize>> = vec![None; adj.len()];
    let mut seen = vec![false; adj.len()];
    seen[s] = true;
    let mut queue = VecDeque::from([s]);

    while let Some(u) = queue.pop_front() {
        for &w in &adj[u] {
            if w == d {
                let mut path = vec![d, u];
                let mut cur = u;
                while let Some(p) = parent[cur] {
                    path.push(p);
                    cur = p;
                }
                path.reverse();
                return Some(path);
            }
            if !seen[w] {
                seen[w] = true;
                parent[w] = Some(u);
                queue.push_back(w);
            }
        }
    }
    None
}

impl<N: NodeLabel> DirectedGraph<N> {
    fn forward_lists(&self) -> Vec<Vec<usize>> {
        (0..self.node_count()).map(|i| self.succ_ids(i).collect()).collect()
    }

    fn reverse_lists(&self) -> Vec<Vec<usize>> {
        let mut rev = vec![Vec::new(); self.node_count()];
        for u in 0..self.node_count() {
            for w in self.succ_ids(u) {
                rev[w].push(u);
            }
        }
        rev
    }

    /// 广度优先可达节点（不含起点本身），按层序返回。
    pub fn reachable_bfs(&self, v: &N) -> Result<Vec<&N>> {
        let start = self.require_id(v)?;
        let mut seen = vec![false; self.node_count()];
        seen[start] = true;
        let mut queue = VecDeque::from([start]);
        let mut res = Vec::new();
        while let Some(u) = queue.pop_front() {
            if u != start {
                res.push(u);
            }
            for w in self.succ_ids(u) {
                if !seen[w] {
                    seen[w] = true;
                    queue.push_back(w);
                }
            }
        }
        Ok(self.labels(&res))
    }

    /// 深度优先可达节点（不含起点本身）。
    ///
    /// 新发现的后继按邻接顺序插到待访问队列的最前面；已经在队列中的节点不会重复入队。
    pub fn reachable_dfs(&self, v: &N) -> Result<Vec<&N>> {
        let start = self.require_id(v)?;
        let mut queued = vec![false; self.node_count()];
        queued[start] = true;
        let mut pending = VecDeque::from([start]);
        let mut res = Vec::new();
        while let Some(u) = pending.pop_front() {
            if u != start {
                res.push(u);
            }
            let fresh: Vec<usize> = self.succ_ids(u).filter(|&w| !queued[w]).collect();
            for &w in fresh.iter().rev() {
                queued[w] = true;
                pending.push_front(w);
            }
        }
        Ok(self.labels(&res))
    }

    /// BFS 得到的 (节点, 距离) 列表，不含起点。
    pub fn reachable_with_dist(&self, v: &N) -> Result<Vec<(&N, usize)>> {
        let start = self.require_id(v)?;
        Ok(self
            .distances_from(start)
            .into_iter()
            .map(|(i, d)| (self.label(i), d))
            .collect())
    }

    pub(crate) fn distances_from(&self, start: usize) -> Vec<(usize, usize)> {
        let mut seen = vec![false; self.node_count()];
        seen[start] = true;
        let mut queue = VecDeque::from([(start, 0usize)]);
        let mut res = Vec::new();
        while let Some((u, dist)) = queue.pop_front() {
            if u != start {
                res.push((u, dist));
            }
            for w in self.succ_ids(u) {
                if !seen[w] {
                    seen[w] = true;
                    queue.push_back((w, dist + 1));
                }
            }
        }
        res
    }

    /// `s` 到 `d` 的最短路径。
    ///
    /// 分别在原图和反向图上从 `s` 出发做 BFS，取较短者；长度相同时取原图上的路径。
    /// 反向图上的结果沿边的反方向行走，可以连通正向搜索到不了的节点对。
    /// 两次搜索都失败时返回 `Ok(None)`；`s == d` 时路径为 `[s]`。
    pub fn shortest_path(&self, s: &N, d: &N) -> Result<Option<Vec<&N>>> {
        let si = self.require_id(s)?;
        let di = self.require_id(d)?;
        if si == di {
            return Ok(Some(vec![self.label(si)]));
        }

        let front = bfs_path(&self.forward_lists(), si, di);
        let back = bfs_path(&self.reverse_lists(), si, di);
        let best = match (front, back) {
            (Some(f), Some(b)) => Some(if f.len() <= b.len() { f } else { b }),
            (f, b) => f.or(b),
        };
        Ok(best.map(|p| self.labels(&p)))
    }

    /// 路径边数；`s == d` 时为 0，不连通时为 `None`。
    pub fn distance(&self, s: &N, d: &N) -> Result<Option<usize>> {
        Ok(self.shortest_path(s, d)?.map(|p| p.len() - 1))
    }
}

impl<N: NodeLabel + fmt::Display> DirectedGraph<N> {
    /// 以 `a -> b -> c` 形式渲染最短路径。
    pub fn shortest_path_string(&self, s: &N, d: &N) -> Result<Option<String>> {
        Ok(self.shortest_path(s, d)?.map(|p| {
            p.iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(" -> ")
        }))
    }
}
