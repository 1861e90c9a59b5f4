use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{BioError, Result};

/// 协作式取消令牌。
///
/// 克隆后共享同一个标志，可以从另一个线程调用 [`CancelToken::cancel`]；
/// 长时间运行的搜索（哈密顿回溯、欧拉回路拼接）在每一步检查该标志。
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// 已取消则返回 `Err(BioError::Cancelled)`。
    #[inline]
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(BioError::Cancelled)
        } else {
            Ok(())
        }
    }
}
