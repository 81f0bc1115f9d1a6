use crate::bpe::Merge;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// 目标词表大小必须大于基础字节词表
    #[error("target vocabulary size must be > 256, got {target}")]
    InvalidTarget { target: usize },

    /// 合词规则引用了尚未定义的 token
    #[error("invalid merge rule #{index}: {merge}")]
    InvalidMerge { index: usize, merge: Merge },
}

pub type Result<T> = std::result::Result<T, Error>;
