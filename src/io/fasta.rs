use anyhow::{Context, Result};
use std::io::BufRead;

/// 一条 FASTA 记录。序列保留原始大小写，只去掉空白。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    pub id: String,
    pub desc: Option<String>,
    pub seq: Vec<u8>,
}

/// 逐条读取 FASTA。`;` 开头的行视为注释，首个 header 之前的内容被忽略。
pub struct FastaReader<R: BufRead> {
    reader: R,
    line: String,
    pending: Option<String>,
    eof: bool,
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, line: String::new(), pending: None, eof: false }
    }

    /// 读一行到内部缓冲，返回 false 表示到达文件末尾
    fn fill_line(&mut self) -> Result<bool> {
        self.line.clear();
        let n = self.reader.read_line(&mut self.line).context("failed to read FASTA line")?;
        if n == 0 {
            self.eof = true;
        }
        Ok(n > 0)
    }

    fn take_header(&self) -> Option<String> {
        self.line.strip_prefix('>').map(|h| h.trim().to_string())
    }

    pub fn next_record(&mut self) -> Result<Option<FastaRecord>> {
        let header = match self.pending.take() {
            Some(h) => h,
            None => loop {
                if self.eof || !self.fill_line()? {
                    return Ok(None);
                }
                if let Some(h) = self.take_header() {
                    break h;
                }
            },
        };

        let (id, desc) = match header.split_once(char::is_whitespace) {
            Some((id, rest)) => {
                let rest = rest.trim();
                (id.to_string(), (!rest.is_empty()).then(|| rest.to_string()))
            }
            None => (header, None),
        };

        let mut seq = Vec::new();
        while !self.eof && self.fill_line()? {
            if let Some(h) = self.take_header() {
                self.pending = Some(h);
                break;
            }
            if self.line.starts_with(';') {
                continue;
            }
            seq.extend(self.line.bytes().filter(|b| !b.is_ascii_whitespace()));
        }

        Ok(Some(FastaRecord { id, desc, seq }))
    }
}

impl<R: BufRead> Iterator for FastaReader<R> {
    type Item = Result<FastaRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

/// 打开并读取整份 FASTA 文件。
pub fn read_fasta_file(path: &str) -> Result<Vec<FastaRecord>> {
    let fh = std::fs::File::open(path).with_context(|| format!("cannot open FASTA '{}'", path))?;
    FastaReader::new(std::io::BufReader::new(fh)).collect()
}
