//! 文件输入：FASTA 序列、边列表与片段列表。

pub mod edges;
pub mod fasta;
