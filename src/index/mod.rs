//! 后缀数组与 BWT 索引。

pub mod bwt;
pub mod sa;
