//! 符号序列工具：字母表校验、规范化与反向互补。
//!
//! 图与索引模块只消费普通的字节串；这里提供把外部输入整理成这种形式的辅助函数。

use crate::error::{BioError, Result};

/// BWT 使用的默认哨兵符号
pub const SENTINEL: u8 = b'$';

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Alphabet {
    Dna,
    Rna,
    Protein,
}

impl Alphabet {
    pub fn symbols(self) -> &'static [u8] {
        match self {
            Alphabet::Dna => b"ACGT",
            Alphabet::Rna => b"ACGU",
            Alphabet::Protein => b"ACDEFGHIKLMNPQRSTVWY",
        }
    }

    #[inline]
    pub fn contains(self, b: u8) -> bool {
        self.symbols().contains(&b.to_ascii_uppercase())
    }

    /// 推断最小的可容纳该序列的字母表：DNA 优先，其次 RNA，最后蛋白质。
    pub fn detect(seq: &[u8]) -> Option<Alphabet> {
        [Alphabet::Dna, Alphabet::Rna, Alphabet::Protein]
            .into_iter()
            .find(|a| seq.iter().all(|&b| a.contains(b)))
    }
}

/// 检查序列中每个符号都属于 `alphabet`，否则报告第一个非法符号及其位置。
pub fn validate(seq: &[u8], alphabet: Alphabet) -> Result<()> {
    match seq.iter().position(|&b| !alphabet.contains(b)) {
        None => Ok(()),
        Some(i) => Err(BioError::invalid(format!(
            "symbol '{}' at offset {} is not in the {:?} alphabet",
            seq[i] as char, i, alphabet
        ))),
    }
}

/// 给定字母表时逐个校验；未给定时自动推断，推断失败返回 `None`。
pub fn resolve_alphabet(seq: &[u8], declared: Option<Alphabet>) -> Result<Option<Alphabet>> {
    match declared {
        Some(a) => validate(seq, a).map(|()| Some(a)),
        None => Ok(Alphabet::detect(seq)),
    }
}

pub fn normalize_seq(seq: &[u8]) -> Vec<u8> {
    seq.iter()
        .filter(|b| !b.is_ascii_whitespace())
        .map(u8::to_ascii_uppercase)
        .collect()
}

#[inline]
pub fn complement(base: u8) -> u8 {
    match base.to_ascii_uppercase() {
        b'A' => b'T',
        b'C' => b'G',
        b'G' => b'C',
        b'T' | b'U' => b'A',
        _ => b'N',
    }
}

pub fn revcomp(seq: &[u8]) -> Vec<u8> {
    seq.iter().rev().map(|&b| complement(b)).collect()
}

/// 在序列末尾追加哨兵，供 BWT 构建使用。
pub fn with_sentinel(seq: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(seq.len() + 1);
    out.extend_from_slice(seq);
    out.push(SENTINEL);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_alphabets() {
        assert_eq!(Alphabet::detect(b"ACGTTGCA"), Some(Alphabet::Dna));
        assert_eq!(Alphabet::detect(b"acgu"), Some(Alphabet::Rna));
        assert_eq!(Alphabet::detect(b"MKVLW"), Some(Alphabet::Protein));
        assert_eq!(Alphabet::detect(b"AC-GT"), None);
    }

    #[test]
    fn validate_reports_offset() {
        assert!(validate(b"ACGT", Alphabet::Dna).is_ok());
        let err = validate(b"ACXT", Alphabet::Dna).unwrap_err();
        match err {
            BioError::InvalidInput(msg) => assert!(msg.contains("offset 2"), "{}", msg),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn declared_alphabet_is_enforced() {
        assert_eq!(resolve_alphabet(b"ACGU", Some(Alphabet::Rna)).unwrap(), Some(Alphabet::Rna));
        assert!(resolve_alphabet(b"ACGU", Some(Alphabet::Dna)).is_err());
        assert_eq!(resolve_alphabet(b"ACGT", None).unwrap(), Some(Alphabet::Dna));
        assert_eq!(resolve_alphabet(b"AC-GT", None).unwrap(), None);
    }

    #[test]
    fn revcomp_and_normalize() {
        assert_eq!(revcomp(b"ATGCN"), b"NGCAT");
        assert_eq!(revcomp(b"AUG"), b"CAT");
        assert_eq!(complement(b'g'), b'C');
        assert_eq!(normalize_seq(b"ac g\nt"), b"ACGT");
    }

    #[test]
    fn sentinel_appended() {
        assert_eq!(with_sentinel(b"TAG"), b"TAG$");
    }
}
