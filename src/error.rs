use thiserror::Error;

/// 库内统一错误类型。
///
/// "无解"（没有欧拉路径、没有哈密顿路径、模式不出现、终点不可达）不是错误，
/// 这些情况以 `None` 或空结果返回；这里只描述调用方违反约定的情形。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BioError {
    /// 查询的节点不在图中
    #[error("node not found: {0}")]
    NodeNotFound(String),
    /// 输入不合法（哨兵缺失/重复、空路径、片段长度不一致等）
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// 搜索被外部取消
    #[error("search cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, BioError>;

impl BioError {
    pub(crate) fn node_not_found<N: std::fmt::Debug>(v: &N) -> Self {
        BioError::NodeNotFound(format!("{:?}", v))
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        BioError::InvalidInput(msg.into())
    }
}
