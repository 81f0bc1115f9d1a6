mod algorithm;
mod pairs;

use crate::{utok, vocab::Vocab, Error, Result, BASE_VOCAB_SIZE};
use log::{debug, info};
use pairs::PairCounter;
use std::fmt;

/// 字节对编码分词器。
///
/// 词表从 256 个单字节词开始，训练时每学到一条合词规则就追加一个新词，
/// 新词的序号按规则学习的顺序从 256 开始连续分配。
/// 编码时按学习顺序重放所有合词规则，解码时直接拼接每个词的字节内容。
#[derive(Clone, Debug)]
pub struct Bpe {
    /// 所有词的字节内容
    vocab: Vocab,
    /// 按学习顺序保存的合词规则，第 i 条规则产生的词序号为 256 + i
    merges: Vec<Merge>,
}

/// 合词规则：将相邻的 `first` `second` 替换为 `result`。
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Merge {
    pub first: utok,
    pub second: utok,
    pub result: utok,
}

impl Merge {
    #[inline]
    const fn pair(&self) -> (utok, utok) {
        (self.first, self.second)
    }
}

impl fmt::Display for Merge {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} + {} -> {}", self.first, self.second, self.result)
    }
}

impl Default for Bpe {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Bpe {
    /// 创建只包含 256 个单字节词、没有合词规则的分词器。
    pub fn new() -> Self {
        Self {
            vocab: Vocab::new(),
            merges: Vec::new(),
        }
    }

    /// 按顺序重放一组合词规则，重建分词器。
    ///
    /// 第 i 条规则产生的词序号为 256 + i，规则引用的两个词都必须在此之前已经存在。
    pub fn from_merges(merges: impl IntoIterator<Item = (utok, utok)>) -> Result<Self> {
        let mut ans = Self::new();
        for (index, (first, second)) in merges.into_iter().enumerate() {
            let result = ans.vocab.len() as utok;
            let merge = Merge {
                first,
                second,
                result,
            };
            if first >= result || second >= result {
                return Err(Error::InvalidMerge { index, merge });
            }
            ans.learn(merge);
        }
        ans.vocab.compress();
        Ok(ans)
    }

    /// 从训练文本学习合词规则，直到词表大小达到 `target_vocab_size`。
    ///
    /// 文本中已经没有相邻词对时提前停止，此时学到的规则少于要求的数量。
    pub fn train(&mut self, text: &[u8], target_vocab_size: usize) -> Result<()> {
        if target_vocab_size <= BASE_VOCAB_SIZE {
            return Err(Error::InvalidTarget {
                target: target_vocab_size,
            });
        }

        let mut tokens = bytes(text);
        // 只在开始时完整统计一次，之后随合并增量更新
        let mut pairs = PairCounter::count(&tokens);
        info!(
            "training on {} bytes, {} distinct pairs, target vocab size {target_vocab_size}",
            text.len(),
            pairs.len(),
        );

        let start = self.merges.len();
        while self.vocab_size() < target_vocab_size {
            let Some((pair, freq)) = pairs.max() else {
                break;
            };
            let merge = Merge {
                first: pair.0,
                second: pair.1,
                result: self.vocab_size() as _,
            };
            debug!("merge #{} ({freq} times): {merge}", self.merges.len());

            self.learn(merge);
            pairs.merge(&mut tokens, pair, merge.result);
        }

        self.vocab.compress();

        let learned = self.merges.len() - start;
        if self.vocab_size() < target_vocab_size {
            info!("pairs exhausted after {learned} merges, vocab size {}", self.vocab_size());
        } else {
            info!("learned {learned} merges, vocab size {}", self.vocab_size());
        }
        Ok(())
    }

    /// 将字节序列编码为词序列。
    pub fn encode(&self, text: &[u8]) -> Vec<utok> {
        let mut tokens = bytes(text);
        for merge in &self.merges {
            // 少于 2 个词时不可能再合并
            if tokens.len() < 2 {
                break;
            }
            algorithm::merge(&mut tokens, merge.pair(), merge.result);
        }
        tokens
    }

    /// 将词序列解码为字节序列，不在词表中的词被忽略。
    pub fn decode(&self, tokens: &[utok]) -> Vec<u8> {
        let mut ans = Vec::new();
        for piece in tokens.iter().filter_map(|&t| self.vocab.get(t)) {
            ans.extend_from_slice(piece);
        }
        ans
    }

    /// 词表大小
    #[inline]
    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    /// 按学习顺序排列的合词规则
    #[inline]
    pub fn merges(&self) -> &[Merge] {
        &self.merges
    }

    /// token id -> piece
    #[inline]
    pub fn token(&self, token: utok) -> Option<&[u8]> {
        self.vocab.get(token)
    }

    /// 记录一条合词规则并为其结果创建词。
    fn learn(&mut self, merge: Merge) {
        let token = self.vocab.concat(merge.first, merge.second);
        debug_assert_eq!(token, Some(merge.result));
        self.merges.push(merge);
    }
}

/// 每个字节都是一个词
#[inline]
fn bytes(text: &[u8]) -> Vec<utok> {
    text.iter().map(|&b| b as utok).collect()
}

impl fmt::Display for Bpe {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "---------------------------")?;
        writeln!(f, "vocab size: {}", self.vocab_size())?;
        writeln!(f, "---------------------------")?;
        writeln!(f, "merges:")?;
        for merge in &self.merges {
            let piece = self.vocab.get(merge.result).unwrap_or_default();
            writeln!(f, "  {:>6} | {}", merge.result, piece.escape_ascii())?;
        }
        writeln!(f, "---------------------------")
    }
}
