use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use flate2::bufread::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::info;

use crate::error::SwarmRunResult;
use crate::progress::format_bytes;

const GZ_EXTENSION: &str = "gz";

#[must_use]
pub fn is_gzip_path(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == GZ_EXTENSION)
}

/// Replaces `path` with `path.gz`, returning the new path.
pub fn gzip_file(path: &Path) -> SwarmRunResult<PathBuf> {
    let start_time = Instant::now();
    let mut gz_name = path.as_os_str().to_owned();
    gz_name.push(".");
    gz_name.push(GZ_EXTENSION);
    let gz_path = PathBuf::from(gz_name);

    let mut reader = BufReader::new(File::open(path)?);
    let mut encoder = GzEncoder::new(
        BufWriter::new(File::create(&gz_path)?),
        Compression::default(),
    );
    let bytes = io::copy(&mut reader, &mut encoder)?;
    encoder.finish()?.flush()?;
    fs::remove_file(path)?;

    info!(
        "Compressed {} ({}) in {:.2}s",
        gz_path.display(),
        format_bytes(bytes),
        start_time.elapsed().as_secs_f32()
    );
    Ok(gz_path)
}

/// Replaces `path.gz` with its decompressed content at `path`. Concatenated
/// gzip members are decoded as one stream.
pub fn gunzip_file(gz_path: &Path) -> SwarmRunResult<PathBuf> {
    let path = gz_path.with_extension("");

    let mut decoder = MultiGzDecoder::new(BufReader::new(File::open(gz_path)?));
    let mut writer = BufWriter::new(File::create(&path)?);
    let bytes = io::copy(&mut decoder, &mut writer)?;
    writer.flush()?;
    fs::remove_file(gz_path)?;

    info!(
        "Decompressed {} ({})",
        path.display(),
        format_bytes(bytes)
    );
    Ok(path)
}

/// Opens a file for reading, transparently decoding it when named `*.gz`.
pub fn open_maybe_gz(path: &Path) -> io::Result<Box<dyn BufRead>> {
    let file = BufReader::new(File::open(path)?);
    let reader: Box<dyn BufRead> = if is_gzip_path(path) {
        Box::new(BufReader::new(MultiGzDecoder::new(file)))
    } else {
        Box::new(file)
    };

    Ok(reader)
}

/// Number of lines in a (possibly gzipped) text file. A trailing line without
/// a newline is counted.
pub fn count_lines(path: &Path) -> io::Result<usize> {
    let mut reader = open_maybe_gz(path)?;
    let mut buf = [0u8; 64 * 1024];
    let mut lines = 0;
    let mut last = b'\n';
    let mut empty = true;

    loop {
        let read = reader.read(&mut buf)?;
        if read == 0 {
            break;
        }
        empty = false;
        lines += buf[..read].iter().filter(|&&b| b == b'\n').count();
        last = buf[read - 1];
    }

    if !empty && last != b'\n' {
        lines += 1;
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Write;

    use flate2::write::GzEncoder;
    use flate2::Compression;

    use crate::compression::{count_lines, gunzip_file, gzip_file, is_gzip_path};

    #[test]
    fn test_is_gzip_path() {
        assert!(is_gzip_path("reads.fastq.gz".as_ref()));
        assert!(!is_gzip_path("reads.fastq".as_ref()));
        assert!(!is_gzip_path("gz".as_ref()));
    }

    #[test]
    fn test_gzip_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("S1.swarm.csv");
        fs::write(&path, "a,b\nc,d\n").unwrap();

        let gz_path = gzip_file(&path).unwrap();

        assert_eq!(gz_path, dir.path().join("S1.swarm.csv.gz"));
        assert!(!path.exists());
        assert_eq!(count_lines(&gz_path).unwrap(), 2);
    }

    #[test]
    fn test_gunzip_multiple_members() {
        let dir = tempfile::tempdir().unwrap();
        let gz_path = dir.path().join("reads.fasta.gz");
        let mut data = Vec::new();
        for chunk in [">a\nACGT\n", ">b\nGGCC\n"] {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
            encoder.write_all(chunk.as_bytes()).unwrap();
            data.extend(encoder.finish().unwrap());
        }
        fs::write(&gz_path, data).unwrap();

        let path = gunzip_file(&gz_path).unwrap();

        assert_eq!(path, dir.path().join("reads.fasta"));
        assert!(!gz_path.exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), ">a\nACGT\n>b\nGGCC\n");
    }

    #[test]
    fn test_count_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lines.txt");

        fs::write(&path, "").unwrap();
        assert_eq!(count_lines(&path).unwrap(), 0);

        fs::write(&path, "one\ntwo\n").unwrap();
        assert_eq!(count_lines(&path).unwrap(), 2);

        fs::write(&path, "one\ntwo").unwrap();
        assert_eq!(count_lines(&path).unwrap(), 2);
    }
}
