//! 训练时的词对频率统计。
//!
//! 统计表与训练序列同步更新：每次合并只修改合并位置附近的词对计数，不重新扫描整个序列。
//! 任何时刻表中都恰好是当前序列所有相邻词对的出现次数，计数归零的词对立即移除。

use super::algorithm::merge_with;
use crate::utok;
use ahash::AHashMap;
use std::collections::hash_map::Entry;

#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub(crate) struct PairCounter {
    counts: AHashMap<(utok, utok), usize>,
}

impl PairCounter {
    /// 扫描整个序列，从头建立统计表。
    pub fn count(tokens: &[utok]) -> Self {
        let mut ans = Self::default();
        for pair in tokens.windows(2) {
            ans.increase((pair[0], pair[1]));
        }
        ans
    }

    /// 统计表中不同词对的数量
    #[inline]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// 出现次数最多的词对及其次数，表为空时返回 `None`。
    ///
    /// 次数相同时选字典序最小的词对，使训练结果不依赖哈希表的遍历顺序。
    pub fn max(&self) -> Option<((utok, utok), usize)> {
        self.counts
            .iter()
            .map(|(&pair, &count)| (pair, count))
            .reduce(|best, item| match item.1.cmp(&best.1).then(best.0.cmp(&item.0)) {
                std::cmp::Ordering::Greater => item,
                _ => best,
            })
    }

    /// 在序列中合并 `pair`，同时更新受影响词对的计数。
    ///
    /// 对每个合并位置 `left t1 t2 right`：
    ///
    /// - `(left, t1)` 变为 `(left, merged)`；
    /// - `(t1, t2)` 减一；
    /// - `(t2, right)` 变为 `(merged, right)`。
    ///
    /// 左侧取已改写的词，因此连续的合并位置会先产生 `(merged, t1)` 再立即改为 `(merged, merged)`。
    pub fn merge(&mut self, tokens: &mut Vec<utok>, pair: (utok, utok), merged: utok) {
        let (t1, t2) = pair;
        merge_with(tokens, pair, merged, |left, right| {
            if let Some(left) = left {
                self.decrease((left, t1));
                self.increase((left, merged));
            }
            self.decrease(pair);
            if let Some(right) = right {
                self.decrease((t2, right));
                self.increase((merged, right));
            }
        })
    }

    #[inline]
    fn increase(&mut self, pair: (utok, utok)) {
        *self.counts.entry(pair).or_insert(0) += 1;
    }

    #[inline]
    fn decrease(&mut self, pair: (utok, utok)) {
        if let Entry::Occupied(mut entry) = self.counts.entry(pair) {
            match *entry.get() {
                1 => {
                    entry.remove();
                }
                _ => *entry.get_mut() -= 1,
            }
        }
    }
}
