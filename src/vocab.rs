//! 这个模块提供词表的存储，词表只增不减，已有的词内容在创建后不可修改。

use crate::{utok, BASE_VOCAB_SIZE};
use std::cmp::Reverse;

/// 词表仓库。
///
/// 所有词的字节内容保存在同一块缓存中，词序号按 `(偏移, 长度)` 索引内容。
/// 词序号连续分配，前 256 个词固定为单字节词，词序号即字节值。
#[derive(Clone, Debug)]
pub(crate) struct Vocab {
    /// 保存所有词的字节内容
    text: Vec<u8>,
    /// 按词序保存每个词在 `text` 中的位置
    slices: Vec<(usize, usize)>,
}

impl Vocab {
    /// 创建只包含 256 个单字节词的词表。
    pub fn new() -> Self {
        Self {
            text: BYTES.to_vec(),
            slices: (0..BASE_VOCAB_SIZE).map(|b| (b, 1)).collect(),
        }
    }

    /// 词表大小
    #[inline]
    pub fn len(&self) -> usize {
        self.slices.len()
    }

    /// token id -> piece
    #[inline]
    pub fn get(&self, token: utok) -> Option<&[u8]> {
        self.slices
            .get(token as usize)
            .map(|&(off, len)| &self.text[off..][..len])
    }

    /// 用两个已有词的内容拼接出一个新词，返回分配的词序号，任何一个词不存在时返回 `None`。
    ///
    /// 只检查 `second` 的内容是否紧跟在 `first` 之后，不搜索整个缓存。
    pub fn concat(&mut self, first: utok, second: utok) -> Option<utok> {
        let &(off1, len1) = self.slices.get(first as usize)?;
        let &(off2, len2) = self.slices.get(second as usize)?;
        let token = self.slices.len() as utok;

        let end = off1 + len1;
        let off = if self.text[end..].starts_with(&self.text[off2..][..len2]) {
            off1
        } else {
            let off = self.text.len();
            self.text.extend_from_within(off1..end);
            self.text.extend_from_within(off2..off2 + len2);
            off
        };
        self.slices.push((off, len1 + len2));
        Some(token)
    }

    /// 利用词表中的重复部分压缩缓存，词序号和词的内容不变。
    pub fn compress(&mut self) {
        let mut text = Vec::<u8>::with_capacity(self.text.len());
        let mut slices = vec![(0usize, 0usize); self.slices.len()];
        let mut indices = (0..self.slices.len()).collect::<Vec<_>>();
        // 对词按内容长度从长到短排序，因为短的内容有可能是长内容的子串，可以避免重复存储相同内容
        indices.sort_unstable_by_key(|&i| Reverse(self.slices[i].1));
        for i in indices {
            let (off, len) = self.slices[i];
            let piece = &self.text[off..][..len];
            // 查找子串，若存在则复用，否则将新的内容追加到缓存
            let off = memchr::memmem::find(&text, piece).unwrap_or_else(|| {
                let off = text.len();
                text.extend_from_slice(piece);
                off
            });
            slices[i] = (off, len);
        }
        self.text = text;
        self.slices = slices;
    }
}

const BYTES: [u8; 256] = {
    let mut bytes = [0u8; 256];
    let mut i = 0usize;
    while i < 256 {
        bytes[i] = i as _;
        i += 1;
    }
    bytes
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_identity() {
        let vocab = Vocab::new();
        assert_eq!(vocab.len(), 256);
        for b in 0..=255u8 {
            assert_eq!(vocab.get(b as utok), Some(&[b][..]));
        }
        assert_eq!(vocab.get(256), None);
    }

    #[test]
    fn sequential_ids() {
        let mut vocab = Vocab::new();
        assert_eq!(vocab.concat(b'a' as _, b'b' as _), Some(256));
        assert_eq!(vocab.concat(256, b'c' as _), Some(257));
        assert_eq!(vocab.len(), 258);
        assert_eq!(vocab.get(256), Some(&b"ab"[..]));
        assert_eq!(vocab.get(257), Some(&b"abc"[..]));
    }

    #[test]
    fn reuse_adjacent_content() {
        let mut vocab = Vocab::new();
        // 字节表中 'b' 紧跟在 'a' 之后
        vocab.concat(b'a' as _, b'b' as _);
        assert_eq!(vocab.text.len(), 256);
        vocab.concat(b'x' as _, b'a' as _);
        assert_eq!(vocab.text.len(), 258);
        assert_eq!(vocab.get(257), Some(&b"xa"[..]));
    }

    #[test]
    fn compress() {
        let mut vocab = Vocab::new();
        let xa = vocab.concat(b'x' as _, b'a' as _).unwrap();
        let again = vocab.concat(b'x' as _, b'a' as _).unwrap();
        let xaxa = vocab.concat(xa, again).unwrap();
        let before = (0..vocab.len() as utok)
            .map(|t| vocab.get(t).unwrap().to_vec())
            .collect::<Vec<_>>();
        let len = vocab.text.len();

        vocab.compress();
        assert!(vocab.text.len() < len);
        for (t, piece) in before.iter().enumerate() {
            assert_eq!(vocab.get(t as _), Some(&piece[..]));
        }
        assert_eq!(vocab.get(xaxa), Some(&b"xaxa"[..]));
        // 压缩后仍然可以追加
        assert_eq!(vocab.concat(xaxa, b'!' as _), Some(259));
        assert_eq!(vocab.get(259), Some(&b"xaxa!"[..]));
    }

    #[test]
    fn concat_unknown() {
        let mut vocab = Vocab::new();
        assert_eq!(vocab.concat(b'a' as _, 300), None);
        assert_eq!(vocab.len(), 256);
    }
}
