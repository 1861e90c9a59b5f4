//! 拓扑指标：度分布、环检测、聚类系数、平均距离。
//!
//! 逐节点独立的计算（聚类系数、每个源点的 BFS 距离）用 rayon 并行，
//! 只读共享图结构，结果与顺序计算一致。

use std::collections::{BTreeMap, VecDeque};

use log::debug;
use rayon::prelude::*;

use super::{DirectedGraph, NodeLabel};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DegreeType {
    In,
    Out,
    /// 相邻节点个数（前驱 ∪ 后继）
    #[default]
    InOut,
}

/// 平均距离统计
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanDistances {
    /// 所有可达有序节点对的平均最短距离
    pub mean: f64,
    /// 可达节点对占全部有序节点对 n·(n-1) 的比例
    pub reachable_fraction: f64,
}

impl<N: NodeLabel> DirectedGraph<N> {
    fn degree_vec(&self, deg_type: DegreeType) -> Vec<usize> {
        match deg_type {
            DegreeType::Out => (0..self.node_count()).map(|i| self.out_degree_id(i)).collect(),
            DegreeType::In => self.in_degrees(),
            DegreeType::InOut => (0..self.node_count()).map(|i| self.adj_ids(i).len()).collect(),
        }
    }

    /// 每个节点的度，按节点插入顺序
    pub fn all_degrees(&self, deg_type: DegreeType) -> Vec<(&N, usize)> {
        self.nodes().zip(self.degree_vec(deg_type)).collect()
    }

    pub fn mean_degree(&self, deg_type: DegreeType) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let degs = self.degree_vec(deg_type);
        degs.iter().sum::<usize>() as f64 / degs.len() as f64
    }

    /// 度 -> 具有该度的节点比例
    pub fn prob_degree(&self, deg_type: DegreeType) -> BTreeMap<usize, f64> {
        let degs = self.degree_vec(deg_type);
        let mut res: BTreeMap<usize, f64> = BTreeMap::new();
        for &d in &degs {
            *res.entry(d).or_insert(0.0) += 1.0;
        }
        for v in res.values_mut() {
            *v /= degs.len() as f64;
        }
        res
    }

    /// 是否存在一条从 `v` 出发又回到 `v` 的路径
    pub fn node_has_cycle(&self, v: &N) -> Result<bool> {
        let start = self.require_id(v)?;
        Ok(self.id_has_cycle(start))
    }

    fn id_has_cycle(&self, start: usize) -> bool {
        let mut seen = vec![false; self.node_count()];
        seen[start] = true;
        let mut queue = VecDeque::from([start]);
        while let Some(u) = queue.pop_front() {
            for w in self.succ_ids(u) {
                if w == start {
                    return true;
                }
                if !seen[w] {
                    seen[w] = true;
                    queue.push_back(w);
                }
            }
        }
        false
    }

    pub fn has_cycle(&self) -> bool {
        (0..self.node_count()).any(|i| self.id_has_cycle(i))
    }

    /// 聚类系数：相邻节点两两之间（任一方向）有边的有序对数 / k·(k-1)，
    /// k 为相邻节点个数；k <= 1 时为 0。
    pub fn clustering_coef(&self, v: &N) -> Result<f64> {
        let i = self.require_id(v)?;
        Ok(self.clustering_coef_id(i))
    }

    fn clustering_coef_id(&self, v: usize) -> f64 {
        let adj = self.adj_ids(v);
        let k = adj.len();
        if k <= 1 {
            return 0.0;
        }
        let mut links = 0usize;
        for &a in &adj {
            for &b in &adj {
                if a != b && (self.mult_id(a, b) > 0 || self.mult_id(b, a) > 0) {
                    links += 1;
                }
            }
        }
        links as f64 / (k * (k - 1)) as f64
    }

    pub fn all_clustering_coefs(&self) -> Vec<(&N, f64)> {
        let coefs: Vec<f64> = (0..self.node_count())
            .into_par_iter()
            .map(|i| self.clustering_coef_id(i))
            .collect();
        self.nodes().zip(coefs).collect()
    }

    pub fn mean_clustering_coef(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let coefs = self.all_clustering_coefs();
        coefs.iter().map(|&(_, c)| c).sum::<f64>() / coefs.len() as f64
    }

    /// 度 -> 该度节点的平均聚类系数
    pub fn mean_clustering_perdegree(&self, deg_type: DegreeType) -> BTreeMap<usize, f64> {
        let degs = self.degree_vec(deg_type);
        let coefs = self.all_clustering_coefs();
        let mut groups: BTreeMap<usize, (f64, usize)> = BTreeMap::new();
        for (d, (_, c)) in degs.into_iter().zip(coefs) {
            let entry = groups.entry(d).or_insert((0.0, 0));
            entry.0 += c;
            entry.1 += 1;
        }
        groups.into_iter().map(|(d, (tot, n))| (d, tot / n as f64)).collect()
    }

    /// 忽略不可达节点对的平均距离，以及可达节点对的比例。
    pub fn mean_distances(&self) -> MeanDistances {
        let n = self.node_count();
        let (total, reachable) = (0..n)
            .into_par_iter()
            .map(|i| {
                let dists = self.distances_from(i);
                (dists.iter().map(|&(_, d)| d).sum::<usize>(), dists.len())
            })
            .reduce(|| (0, 0), |a, b| (a.0 + b.0, a.1 + b.1));
        debug!("mean_distances: {} reachable pairs over {} nodes", reachable, n);

        if reachable == 0 || n < 2 {
            return MeanDistances { mean: 0.0, reachable_fraction: 0.0 };
        }
        MeanDistances {
            mean: total as f64 / reachable as f64,
            reachable_fraction: reachable as f64 / (n * (n - 1)) as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{cyclic, tree};
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn degree_tables() {
        let t = tree();
        let inout: Vec<usize> = t.all_degrees(DegreeType::InOut).into_iter().map(|(_, d)| d).collect();
        assert_eq!(inout, vec![2, 2, 2, 1, 1]);
        let ins: Vec<usize> = t.all_degrees(DegreeType::In).into_iter().map(|(_, d)| d).collect();
        assert_eq!(ins, vec![0, 1, 1, 1, 1]);
        let outs: Vec<usize> = t.all_degrees(DegreeType::Out).into_iter().map(|(_, d)| d).collect();
        assert_eq!(outs, vec![2, 1, 1, 0, 0]);

        assert!(close(t.mean_degree(DegreeType::InOut), 1.6));
        let prob = t.prob_degree(DegreeType::InOut);
        assert_eq!(prob.len(), 2);
        assert!(close(prob[&2], 0.6));
        assert!(close(prob[&1], 0.4));
    }

    #[test]
    fn cycle_detection() {
        let g = cyclic();
        assert!(g.node_has_cycle(&2).unwrap());
        assert!(!g.node_has_cycle(&1).unwrap());
        assert!(g.has_cycle());
        let t = tree();
        assert!(!t.node_has_cycle(&1).unwrap());
        assert!(!t.has_cycle());
    }

    #[test]
    fn clustering() {
        let g = cyclic();
        assert!(close(g.clustering_coef(&3).unwrap(), 1.0));
        let coefs: Vec<f64> = g.all_clustering_coefs().into_iter().map(|(_, c)| c).collect();
        let expected = [0.0, 1.0 / 3.0, 1.0, 1.0];
        for (c, e) in coefs.iter().zip(expected) {
            assert!(close(*c, e), "{} != {}", c, e);
        }
        assert!(close(g.mean_clustering_coef(), 0.583_333_333_333_333_3));

        let per = g.mean_clustering_perdegree(DegreeType::InOut);
        assert!(close(per[&1], 0.0));
        assert!(close(per[&2], 1.0));
        assert!(close(per[&3], 1.0 / 3.0));
    }

    #[test]
    fn mean_distance_and_connectivity() {
        let t = tree();
        let md = t.mean_distances();
        assert!(close(md.mean, 8.0 / 6.0));
        assert!(close(md.reachable_fraction, 0.3));

        let single: DirectedGraph<u8> = DirectedGraph::from_adjacency([(1, vec![])]);
        assert_eq!(single.mean_distances(), MeanDistances { mean: 0.0, reachable_fraction: 0.0 });
    }
}
