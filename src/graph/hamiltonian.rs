//! 哈密顿路径：校验与回溯搜索。
//!
//! 搜索用显式栈模拟递归，每一帧是 (节点, 下一个待尝试的后继下标)，
//! 因此大节点集不会受调用栈深度限制。

use log::debug;

use super::{DirectedGraph, NodeLabel};
use crate::error::Result;
use crate::util::cancel::CancelToken;

impl<N: NodeLabel> DirectedGraph<N> {
    /// 非空，且每个节点都存在、相邻两节点之间都有边。
    pub fn check_if_valid_path(&self, p: &[N]) -> bool {
        if p.is_empty() || !p.iter().all(|v| self.contains_node(v)) {
            return false;
        }
        p.windows(2).all(|w| self.has_edge(&w[0], &w[1]))
    }

    /// 合法路径，长度等于节点数，且每个节点恰好出现一次。空路径不是哈密顿路径。
    pub fn check_if_hamiltonian_path(&self, p: &[N]) -> bool {
        if !self.check_if_valid_path(p) || p.len() != self.node_count() {
            return false;
        }
        let mut seen = vec![false; self.node_count()];
        for v in p {
            // check_if_valid_path 已保证节点存在
            let Some(i) = self.id(v) else { return false };
            if seen[i] {
                return false;
            }
            seen[i] = true;
        }
        true
    }

    /// 从 `start` 出发的回溯搜索，找不到时返回 `Ok(None)`。
    pub fn search_from_node(&self, start: &N) -> Result<Option<Vec<&N>>> {
        self.search_from_node_with(start, &CancelToken::new())
    }

    /// 可取消版本，每次回溯前检查 `cancel`。
    pub fn search_from_node_with(&self, start: &N, cancel: &CancelToken) -> Result<Option<Vec<&N>>> {
        let s = self.require_id(start)?;
        Ok(self.search_from_id(s, cancel)?.map(|p| self.labels(&p)))
    }

    fn search_from_id(&self, s: usize, cancel: &CancelToken) -> Result<Option<Vec<usize>>> {
        let n = self.node_count();
        let succ: Vec<Vec<usize>> = (0..n).map(|i| self.succ_ids(i).collect()).collect();
        let mut in_path = vec![false; n];
        in_path[s] = true;
        let mut stack: Vec<(usize, usize)> = vec![(s, 0)];
        let mut backtracks = 0usize;

        while stack.len() < n {
            let top = stack.len() - 1;
            let (cur, next) = stack[top];
            if next < succ[cur].len() {
                stack[top].1 += 1;
                let cand = succ[cur][next];
                if !in_path[cand] {
                    in_path[cand] = true;
                    stack.push((cand, 0));
                }
            } else if stack.len() > 1 {
                cancel.check()?;
                in_path[cur] = false;
                stack.pop();
                backtracks += 1;
            } else {
                debug!("hamiltonian search from node #{} exhausted after {} backtracks", s, backtracks);
                return Ok(None);
            }
        }

        debug!("hamiltonian path found from node #{} after {} backtracks", s, backtracks);
        Ok(Some(stack.into_iter().map(|(v, _)| v).collect()))
    }

    /// 依次从每个节点出发搜索，返回第一条找到的哈密顿路径。
    pub fn search_hamiltonian_path(&self) -> Option<Vec<&N>> {
        self.search_hamiltonian_path_with(&CancelToken::new()).ok().flatten()
    }

    pub fn search_hamiltonian_path_with(&self, cancel: &CancelToken) -> Result<Option<Vec<&N>>> {
        for s in 0..self.node_count() {
            if let Some(p) = self.search_from_id(s, cancel)? {
                return Ok(Some(self.labels(&p)));
            }
        }
        Ok(None)
    }
}
