//! Transparent decompression of input files
//!
//! Compressed inputs are recognised by magic bytes, not by extension:
//! gzip (1F 8B 08) and zstd (28 B5 2F FD). Anything else is read as plain
//! text.

use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Chain, Cursor, Read};
use std::path::Path;

type Prefixed = Chain<Cursor<Vec<u8>>, File>;

const GZIP_MAGIC: [u8; 3] = [0x1F, 0x8B, 0x08];
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// Line source for one input file
pub enum InputReader {
    Gzip(BufReader<MultiGzDecoder<Prefixed>>),
    Zstd(BufReader<zstd::Decoder<'static, BufReader<Prefixed>>>),
    Plain(BufReader<Prefixed>),
}

impl std::fmt::Debug for InputReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            InputReader::Gzip(_) => "gzip",
            InputReader::Zstd(_) => "zstd",
            InputReader::Plain(_) => "plain",
        };
        write!(f, "InputReader::{}", kind)
    }
}

impl InputReader {
    pub fn compression(&self) -> &'static str {
        match self {
            InputReader::Gzip(_) => "gzip",
            InputReader::Zstd(_) => "zstd",
            InputReader::Plain(_) => "none",
        }
    }
}

impl Read for InputReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            InputReader::Gzip(reader) => reader.read(buf),
            InputReader::Zstd(reader) => reader.read(buf),
            InputReader::Plain(reader) => reader.read(buf),
        }
    }
}

impl BufRead for InputReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match self {
            InputReader::Gzip(reader) => reader.fill_buf(),
            InputReader::Zstd(reader) => reader.fill_buf(),
            InputReader::Plain(reader) => reader.fill_buf(),
        }
    }

    fn consume(&mut self, amt: usize) {
        match self {
            InputReader::Gzip(reader) => reader.consume(amt),
            InputReader::Zstd(reader) => reader.consume(amt),
            InputReader::Plain(reader) => reader.consume(amt),
        }
    }
}

/// Open an input file, decompressing it when it starts with a known magic
pub fn open_input(path: &Path) -> io::Result<InputReader> {
    let is_zip = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
    if is_zip {
        return Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "ZIP archives are not supported, only gzip and zstd; extract the file first",
        ));
    }

    let mut file = File::open(path)?;
    let mut head = [0u8; 4];
    let n = read_head(&mut file, &mut head)?;

    // Put the sniffed bytes back in front of the stream
    let chained = Cursor::new(head[..n].to_vec()).chain(file);

    if n >= 3 && head[..3] == GZIP_MAGIC {
        Ok(InputReader::Gzip(BufReader::new(MultiGzDecoder::new(chained))))
    } else if n == 4 && head == ZSTD_MAGIC {
        let decoder = zstd::Decoder::new(chained)?;
        Ok(InputReader::Zstd(BufReader::new(decoder)))
    } else {
        Ok(InputReader::Plain(BufReader::new(chained)))
    }
}

/// Fill `head` unless the file is shorter; a single `read` may return less
fn read_head(file: &mut File, head: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < head.len() {
        match file.read(&mut head[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn read_all(path: &Path) -> (String, &'static str) {
        let mut reader = open_input(path).unwrap();
        let mut content = String::new();
        reader.read_to_string(&mut content).unwrap();
        (content, reader.compression())
    }

    #[test]
    fn test_plain_file_passthrough() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "HEADER").unwrap();
        writeln!(temp_file, "row 1").unwrap();
        temp_file.flush().unwrap();

        let (content, kind) = read_all(temp_file.path());
        assert_eq!(content, "HEADER\nrow 1\n");
        assert_eq!(kind, "none");
    }

    #[test]
    fn test_tiny_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"a").unwrap();
        temp_file.flush().unwrap();

        let (content, _) = read_all(temp_file.path());
        assert_eq!(content, "a");
    }

    #[test]
    fn test_gzip_detected_by_magic() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"HEADER\n1;2;3\n").unwrap();
        let compressed = encoder.finish().unwrap();

        // No .gz extension on purpose
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(&compressed).unwrap();
        temp_file.flush().unwrap();

        let (content, kind) = read_all(temp_file.path());
        assert_eq!(content, "HEADER\n1;2;3\n");
        assert_eq!(kind, "gzip");
    }

    #[test]
    fn test_zstd_detected_by_magic() {
        let compressed = zstd::encode_all(&b"HEADER\nrow\n"[..], 0).unwrap();
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(&compressed).unwrap();
        temp_file.flush().unwrap();

        let (content, kind) = read_all(temp_file.path());
        assert_eq!(content, "HEADER\nrow\n");
        assert_eq!(kind, "zstd");
    }

    #[test]
    fn test_zip_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = dir.path().join("input.zip");
        std::fs::write(&zip_path, b"PK fake").unwrap();

        let err = open_input(&zip_path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
        assert!(err.to_string().contains("ZIP archives are not supported"));
    }

    #[test]
    fn test_missing_file() {
        let err = open_input(Path::new("/nonexistent/docsum/input.csv")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
