//! # bioalg-rust
//!
//! 面向序列分析的图算法与全文索引。
//!
//! 本 crate 提供：
//!
//! - **有向图引擎**：BFS/DFS 可达性、最短路径、度分布、聚类系数、环检测
//! - **欧拉 / 哈密顿路径**：平衡性判定、Hierholzer 式欧拉回路、回溯式哈密顿路径搜索
//! - **序列组装**：de Bruijn 图与 overlap 图，从 k-mer 片段重建序列
//! - **代谢网络**：代谢物/反应节点类型、网络投影、中心性、可达产物
//! - **BWT 索引**：Burrows-Wheeler 变换、原序列还原、模式查找
//!
//! ## 快速示例
//!
//! ```rust,no_run
//! use bioalg_rust::assembly::{composition, DeBruijnGraph};
//! use bioalg_rust::index::bwt::BwtIndex;
//!
//! // k-mer 组装
//! let frags = composition(3, "ATGCAATGGTCTG").unwrap();
//! let g = DeBruijnGraph::from_fragments(&frags).unwrap();
//! println!("{:?}", g.assemble());
//!
//! // BWT 模式查找
//! let idx = BwtIndex::build(b"TAGACAGAGA$").unwrap();
//! let offsets = idx.find_pattern(b"AGA").unwrap();
//! println!("AGA at {:?}", offsets);
//! ```
//!
//! ## 模块说明
//!
//! - [`graph`] — 有向图及路径、度量、欧拉、哈密顿算法、代谢网络
//! - [`assembly`] — de Bruijn / overlap 组装
//! - [`index`] — 后缀数组与 BWT 索引
//! - [`io`] — FASTA、边列表、片段列表读取
//! - [`util`] — 序列工具与取消令牌
//! - [`error`] — 统一错误类型

pub mod assembly;
pub mod error;
pub mod graph;
pub mod index;
pub mod io;
pub mod util;

pub use error::{BioError, Result};
pub use graph::DirectedGraph;
