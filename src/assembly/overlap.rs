use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use log::debug;

use super::{check_fragments, prefix, suffix};
use crate::error::{BioError, Result};
use crate::graph::DirectedGraph;
use crate::util::cancel::CancelToken;

/// overlap 图的节点：片段序列 + 可选的出现序号（从 1 开始，对应输入中的位置）。
///
/// 不区分重复片段时 `tag` 为 `None`，相同序列合并成一个节点。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fragment {
    pub seq: String,
    pub tag: Option<usize>,
}

impl Fragment {
    pub fn new(seq: impl Into<String>) -> Self {
        Self { seq: seq.into(), tag: None }
    }

    pub fn tagged(seq: impl Into<String>, tag: usize) -> Self {
        Self { seq: seq.into(), tag: Some(tag) }
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag {
            Some(t) => write!(f, "{}-{}", self.seq, t),
            None => write!(f, "{}", self.seq),
        }
    }
}

/// 解析 `ACC-2` 或 `ACC`。
impl FromStr for Fragment {
    type Err = BioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.rsplit_once('-') {
            Some((seq, tag)) => {
                let tag = tag
                    .parse::<usize>()
                    .map_err(|_| BioError::invalid(format!("bad fragment tag in '{}'", s)))?;
                Ok(Self::tagged(seq, tag))
            }
            None => Ok(Self::new(s)),
        }
    }
}

/// overlap 图：片段 a 的后缀等于片段 b 的前缀时连边 a -> b。
#[derive(Debug, Clone)]
pub struct OverlapGraph {
    graph: DirectedGraph<Fragment>,
    with_reps: bool,
}

impl OverlapGraph {
    /// `with_reps` 为真时每个输入片段都是独立节点（按位置编号），
    /// 否则重复片段合并。
    pub fn new<S: AsRef<str>>(frags: &[S], with_reps: bool) -> Result<Self> {
        check_fragments(frags, 1)?;

        let nodes: Vec<Fragment> = frags
            .iter()
            .enumerate()
            .map(|(i, f)| {
                if with_reps {
                    Fragment::tagged(f.as_ref(), i + 1)
                } else {
                    Fragment::new(f.as_ref())
                }
            })
            .collect();

        let mut graph = DirectedGraph::new();
        // 序列 -> 它的所有实例（按编号），以及序列首次出现的顺序
        let mut instances: HashMap<&str, Vec<Fragment>> = HashMap::new();
        let mut distinct: Vec<&str> = Vec::new();
        for (f, node) in frags.iter().zip(&nodes) {
            graph.add_vertex(node.clone());
            let seq = f.as_ref();
            let inst = instances.entry(seq).or_insert_with(|| {
                distinct.push(seq);
                Vec::new()
            });
            if !inst.contains(node) {
                inst.push(node.clone());
            }
        }

        for (f, node) in frags.iter().zip(&nodes) {
            let suf = suffix(f.as_ref());
            for &seq2 in distinct.iter().filter(|s| prefix(s) == suf) {
                for target in &instances[seq2] {
                    graph.add_edge(node.clone(), target.clone());
                }
            }
        }

        debug!(
            "overlap graph from {} fragments (reps: {}): {} nodes, {} edges",
            frags.len(),
            with_reps,
            graph.node_count(),
            graph.edge_count()
        );
        Ok(Self { graph, with_reps })
    }

    pub fn graph(&self) -> &DirectedGraph<Fragment> {
        &self.graph
    }

    pub fn with_reps(&self) -> bool {
        self.with_reps
    }

    /// 序列为 `seq` 的全部节点，按插入顺序。
    pub fn instances(&self, seq: &str) -> Vec<&Fragment> {
        self.graph.nodes().filter(|f| f.seq == seq).collect()
    }

    /// 节点对应的片段序列；节点不在图中时返回 `None`。
    pub fn sequence_of<'a>(&self, node: &'a Fragment) -> Option<&'a str> {
        self.graph.contains_node(node).then_some(node.seq.as_str())
    }

    /// 沿哈密顿路径拼接序列。路径为空或不是哈密顿路径时报错。
    pub fn sequence_from_path(&self, path: &[Fragment]) -> Result<String> {
        if path.is_empty() {
            return Err(BioError::invalid("cannot build a sequence from an empty path"));
        }
        if !self.graph.check_if_hamiltonian_path(path) {
            return Err(BioError::invalid("path is not a hamiltonian path of the overlap graph"));
        }
        let mut seq = path[0].seq.clone();
        for f in &path[1..] {
            if let Some(c) = f.seq.chars().last() {
                seq.push(c);
            }
        }
        Ok(seq)
    }

    pub fn assemble(&self) -> Option<String> {
        self.assemble_with(&CancelToken::new()).ok().flatten()
    }

    /// 哈密顿路径搜索 + 拼接，可被 `cancel` 中断。
    pub fn assemble_with(&self, cancel: &CancelToken) -> Result<Option<String>> {
        let Some(path) = self.graph.search_hamiltonian_path_with(cancel)? else {
            return Ok(None);
        };
        let path: Vec<Fragment> = path.into_iter().cloned().collect();
        self.sequence_from_path(&path).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAGS: [&str; 15] = [
        "ATA", "ACC", "ATG", "ATT", "CAT", "CAT", "CAT", "CCA", "GCA", "GGC", "TAA", "TCA", "TGG",
        "TTC", "TTT",
    ];
    const FRAGS2: [&str; 15] = [
        "AAT", "ATC", "ATC", "ATG", "ATG", "ATG", "CAA", "CAT", "GAT", "GAT", "GAT", "TCA", "TGA",
        "TGA", "TGA",
    ];

    fn path(names: &[&str]) -> Vec<Fragment> {
        names.iter().map(|s| s.parse().unwrap()).collect()
    }

    fn expected_path() -> Vec<Fragment> {
        path(&[
            "ACC-2", "CCA-8", "CAT-5", "ATG-3", "TGG-13", "GGC-10", "GCA-9", "CAT-6", "ATT-4",
            "TTT-15", "TTC-14", "TCA-12", "CAT-7", "ATA-1", "TAA-11",
        ])
    }

    fn expected_path2() -> Vec<Fragment> {
        path(&[
            "CAA-7", "AAT-1", "ATC-2", "TCA-12", "CAT-8", "ATG-4", "TGA-13", "GAT-9", "ATG-5",
            "TGA-14", "GAT-10", "ATG-6", "TGA-15", "GAT-11", "ATC-3",
        ])
    }

    #[test]
    fn fragment_display_and_parse() {
        let f = Fragment::tagged("ACC", 2);
        assert_eq!(f.to_string(), "ACC-2");
        assert_eq!("ACC-2".parse::<Fragment>().unwrap(), f);
        assert_eq!("ACC".parse::<Fragment>().unwrap(), Fragment::new("ACC"));
        assert!("ACC-x".parse::<Fragment>().is_err());
    }

    #[test]
    fn without_reps_merges_duplicates() {
        let g = OverlapGraph::new(&FRAGS, false).unwrap();
        assert!(!g.with_reps());
        assert_eq!(g.graph().node_count(), 13);
        let cat = Fragment::new("CAT");
        let succ = g.graph().successors(&cat).unwrap();
        let names: Vec<String> = succ.iter().map(|f| f.to_string()).collect();
        assert_eq!(names, vec!["ATA", "ATG", "ATT"]);
    }

    #[test]
    fn with_reps_links_every_instance() {
        let g = OverlapGraph::new(&FRAGS, true).unwrap();
        assert_eq!(g.graph().node_count(), FRAGS.len());
        let inst: Vec<String> = g.instances("CAT").iter().map(|f| f.to_string()).collect();
        assert_eq!(inst, vec!["CAT-5", "CAT-6", "CAT-7"]);

        let gca = Fragment::tagged("GCA", 9);
        assert_eq!(g.graph().out_degree(&gca).unwrap(), 3);
        assert_eq!(g.sequence_of(&gca), Some("GCA"));
        assert_eq!(g.sequence_of(&Fragment::tagged("GCA", 99)), None);
    }

    #[test]
    fn valid_but_not_hamiltonian() {
        let g = OverlapGraph::new(&FRAGS, true).unwrap();
        let short = path(&["ACC-2", "CCA-8", "CAT-5", "ATG-3"]);
        assert!(g.graph().check_if_valid_path(&short));
        assert!(!g.graph().check_if_hamiltonian_path(&short));
        assert!(g.sequence_from_path(&short).is_err());

        let full = expected_path();
        assert!(g.graph().check_if_valid_path(&full));
        assert!(g.graph().check_if_hamiltonian_path(&full));
    }

    #[test]
    fn search_finds_reference_paths() {
        let g = OverlapGraph::new(&FRAGS, true).unwrap();
        let found: Vec<Fragment> = g.graph().search_hamiltonian_path().unwrap().into_iter().cloned().collect();
        assert_eq!(found, expected_path());
        assert_eq!(g.sequence_from_path(&found).unwrap(), "ACCATGGCATTTCATAA");

        let g2 = OverlapGraph::new(&FRAGS2, true).unwrap();
        let found2: Vec<Fragment> = g2.graph().search_hamiltonian_path().unwrap().into_iter().cloned().collect();
        assert_eq!(found2, expected_path2());
        assert_eq!(g2.sequence_from_path(&found2).unwrap(), "CAATCATGATGATGATC");
    }

    #[test]
    fn assemble_end_to_end() {
        let g = OverlapGraph::new(&FRAGS2, true).unwrap();
        assert_eq!(g.assemble().as_deref(), Some("CAATCATGATGATGATC"));

        // 两个片段之间没有任何重叠
        let g = OverlapGraph::new(&["AAA", "CCC"], true).unwrap();
        assert_eq!(g.assemble(), None);
    }

    #[test]
    fn empty_path_is_rejected() {
        let g = OverlapGraph::new(&FRAGS, true).unwrap();
        assert!(matches!(g.sequence_from_path(&[]), Err(BioError::InvalidInput(_))));
    }

    #[test]
    fn cancelled_assembly() {
        let g = OverlapGraph::new(&FRAGS, true).unwrap();
        let token = CancelToken::new();
        token.cancel();
        assert_eq!(g.assemble_with(&token), Err(BioError::Cancelled));
    }
}
