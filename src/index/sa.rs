use crate::error::{BioError, Result};

/// 把任意字节文本编码为稠密字母表：哨兵映射为 0，其余符号按字节序映射为 1..。
/// 这样无论哨兵的字节值是多少，它在排序中都最小。
pub fn encode_ranks(text: &[u8], sentinel: u8) -> Result<Vec<u8>> {
    let mut present = [false; 256];
    for &b in text {
        present[b as usize] = true;
    }
    let mut code = [0u8; 256];
    let mut next = 1u16;
    for b in 0..=255u8 {
        if b != sentinel && present[b as usize] {
            if next > u8::MAX as u16 {
                return Err(BioError::invalid("alphabet too large for a single-byte encoding"));
            }
            code[b as usize] = next as u8;
            next += 1;
        }
    }
    Ok(text.iter().map(|&b| if b == sentinel { 0 } else { code[b as usize] }).collect())
}

/// 循环旋转排序：返回按字典序排列的各旋转起点。
///
/// 前缀倍增，第 k 轮以 `(rank[i], rank[(i + k) % n])` 重新分级；
/// 各级互不相同或 k 覆盖全文时结束。相等的旋转（周期文本）按起点先后排列。
/// 文本含唯一且最小的哨兵时，结果就是后缀数组。
pub fn sort_rotations(text: &[u8]) -> Vec<usize> {
    let n = text.len();
    let mut order: Vec<usize> = (0..n).collect();
    let mut class: Vec<usize> = text.iter().map(|&b| usize::from(b)).collect();
    order.sort_by_key(|&i| class[i]);

    let mut k = 1usize;
    while k < n {
        let key = |i: usize| (class[i], class[(i + k) % n]);
        order.sort_by_key(|&i| key(i));
        let mut next = vec![0usize; n];
        for w in 1..n {
            next[order[w]] = next[order[w - 1]] + usize::from(key(order[w]) != key(order[w - 1]));
        }
        class = next;
        if class[order[n - 1]] == n - 1 {
            break;
        }
        k *= 2;
    }
    order
}
