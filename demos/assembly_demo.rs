//! 演示在 library 模式下组装序列、用 BWT 查找模式、分析代谢网络。
//!
//! 运行方式：
//! ```bash
//! cargo run --example assembly_demo
//! ```

use bioalg_rust::assembly::{composition, DeBruijnGraph, OverlapGraph};
use bioalg_rust::graph::{MetabolicNetwork, NetworkKind, Reaction};
use bioalg_rust::index::bwt::BwtIndex;
use bioalg_rust::util::seq::with_sentinel;

fn main() -> anyhow::Result<()> {
    // 1. 原始序列切成 3-mer
    let orig = "CAATCATGATGATGATC";
    let frags = composition(3, orig)?;
    println!("原始序列: {}", orig);
    println!("3-mer 组成: {:?}", frags);

    // 2. de Bruijn 图 + 欧拉路径
    let db = DeBruijnGraph::from_fragments(&frags)?;
    let (n, e) = db.graph().size();
    println!("\nde Bruijn 图: {} 个节点, {} 条边", n, e);
    print!("{}", db.graph());
    match db.assemble() {
        Some(s) => println!("欧拉路径重建: {}", s),
        None => println!("欧拉路径不存在"),
    }

    // 3. overlap 图 + 哈密顿路径
    let ov = OverlapGraph::new(&frags, true)?;
    if let Some(path) = ov.graph().search_hamiltonian_path() {
        let names: Vec<String> = path.iter().map(|f| f.to_string()).collect();
        println!("\n哈密顿路径: {}", names.join(" "));
    }
    match ov.assemble() {
        Some(s) => println!("哈密顿路径重建: {}", s),
        None => println!("哈密顿路径不存在"),
    }

    // 4. BWT 索引
    let idx = BwtIndex::build(&with_sentinel(orig.as_bytes()))?;
    println!("\nBWT: {}", idx.bwt_string());
    println!("还原: {}", String::from_utf8_lossy(&idx.original_sequence()));
    for p in ["GAT", "ATC", "TTT"] {
        println!("{} 出现位置: {:?}", p, idx.find_pattern(p.as_bytes())?);
    }

    // 5. 代谢网络
    let reactions = ["R1: M1 + M2 => M3 + M4", "R2: M4 + M6 => M3", "R3: M4 + M5 <=> M6"]
        .iter()
        .map(|l| l.parse::<Reaction>())
        .collect::<Result<Vec<_>, _>>()?;
    let mrn = MetabolicNetwork::from_reactions(&reactions, NetworkKind::MetaboliteReaction, false)?;
    println!("\n代谢物-反应网络:");
    print!("{}", mrn.graph());
    println!("M1, M2 激活的反应: {:?}", mrn.active_reactions(&["M1", "M2"])?);
    println!("最终代谢物: {:?}", mrn.final_metabolites(&["M1", "M2"])?);
    let mmn = MetabolicNetwork::from_reactions(&reactions, NetworkKind::MetaboliteMetabolite, false)?;
    println!("接近中心性: {:?}", mmn.closeness_centrality());
    Ok(())
}
