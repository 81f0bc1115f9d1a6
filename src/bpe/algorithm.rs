use crate::utok;

/// 将序列中所有相邻的 `pair` 替换为 `merged`，不做任何统计。
///
/// 编码时按合词表顺序逐条调用。
#[inline]
pub(crate) fn merge(tokens: &mut Vec<utok>, pair: (utok, utok), merged: utok) {
    merge_with(tokens, pair, merged, |_, _| {})
}

/// 从左到右扫描一遍，原地把每个相邻的 `pair` 替换为 `merged`。
///
/// 每找到一个合并位置就调用一次 `site(left, right)`：
///
/// ```text
/// left t1 t2 right
/// ---- ----- -----
///  ↑     ↓     ↑
///  |   merged  |
///  |           原序列中 t2 之后的词
///  已改写序列中的前一个词
/// ```
///
/// 匹配后跳过两个词再继续，因此重叠的匹配（例如在 `a a a` 中合并 `a a`）
/// 在一次扫描中只合并靠左的一处。
pub(crate) fn merge_with(
    tokens: &mut Vec<utok>,
    (t1, t2): (utok, utok),
    merged: utok,
    mut site: impl FnMut(Option<utok>, Option<utok>),
) {
    let len = tokens.len();
    // 写指针不会超过读指针，读指针之后的内容总是原序列
    let mut w = 0usize;
    let mut r = 0;
    while r < len {
        if r + 1 < len && tokens[r] == t1 && tokens[r + 1] == t2 {
            let left = w.checked_sub(1).map(|i| tokens[i]);
            let right = tokens.get(r + 2).copied();
            site(left, right);
            tokens[w] = merged;
            r += 2;
        } else {
            tokens[w] = tokens[r];
            r += 1;
        }
        w += 1;
    }
    tokens.truncate(w);
}
