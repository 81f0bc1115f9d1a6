#![deny(warnings)]

mod bpe;
mod error;
mod vocab;

pub use bpe::{Bpe, Merge};
pub use error::{Error, Result};

/// `utok` for token id.
#[allow(non_camel_case_types)]
pub type utok = u32;

/// 单字节词的数量，词序号 `0..256` 固定对应字节值。
pub const BASE_VOCAB_SIZE: usize = 256;
