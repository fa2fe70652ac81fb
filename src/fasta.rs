//! FASTA input and output.
//!
//! Reading goes through needletail, which also accepts FASTQ and gzipped
//! input. Writing is plain FASTA wrapped at [`LINE_WIDTH`] columns.

use crate::contig::Contig;
use crate::error::{Result, ScaffoldError};
use needletail::errors::{ParseError, ParseErrorKind};
use needletail::{parse_fastx_file, parse_fastx_reader, FastxReader};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

/// Bases per line in written FASTA.
pub const LINE_WIDTH: usize = 80;

/// Reads every record of a FASTA/FASTQ file.
///
/// Ids are cut at the first whitespace and sequences upper-cased. An empty
/// file has no records.
pub fn read_sequences(path: &Path) -> Result<Vec<(String, Vec<u8>)>> {
    if !path.exists() {
        return Err(ScaffoldError::FileNotFound(path.to_path_buf()));
    }
    collect_records(parse_fastx_file(path))
}

/// Same as [`read_sequences`], from any reader.
pub fn read_sequences_from<R: Read + Send>(reader: R) -> Result<Vec<(String, Vec<u8>)>> {
    collect_records(parse_fastx_reader(reader))
}

fn collect_records<'a>(
    reader: std::result::Result<Box<dyn FastxReader + 'a>, ParseError>,
) -> Result<Vec<(String, Vec<u8>)>> {
    let mut reader = match reader {
        Ok(reader) => reader,
        Err(e) if matches!(e.kind, ParseErrorKind::EmptyFile) => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut records = Vec::new();
    while let Some(record) = reader.next() {
        let record = record?;
        records.push(normalize(record.id(), &record.seq()));
    }
    Ok(records)
}

fn normalize(id: &[u8], seq: &[u8]) -> (String, Vec<u8>) {
    let id = String::from_utf8_lossy(id);
    let id = id.split_whitespace().next().unwrap_or_default().to_string();
    (id, seq.to_ascii_uppercase())
}

/// Loads a draft assembly as contigs, in file order.
pub fn read_contigs(path: &Path) -> Result<Vec<Contig>> {
    let contigs: Vec<Contig> = read_sequences(path)?
        .into_iter()
        .map(|(id, seq)| Contig::new(id, seq))
        .collect();

    if contigs.is_empty() {
        return Err(ScaffoldError::EmptyDraft);
    }
    Ok(contigs)
}

/// Writes `(id, sequence)` records to `path`, replacing any existing file.
pub fn write_fasta<'a, I>(path: &Path, records: I) -> Result<()>
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    let mut writer = BufWriter::new(File::create(path)?);
    write_records(&mut writer, records)?;
    writer.flush()?;
    Ok(())
}

/// Writes `(id, sequence)` records to any writer.
pub fn write_records<'a, W, I>(writer: &mut W, records: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    for (id, seq) in records {
        writeln!(writer, ">{id}")?;
        for line in seq.chunks(LINE_WIDTH) {
            writer.write_all(line)?;
            writer.write_all(b"\n")?;
        }
    }
    Ok(())
}
