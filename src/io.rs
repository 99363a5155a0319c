//! Parsers for the Simple-FASTA and Simple-FASTQ formats.
//!
//! Both formats are line based. Whitespace around sequence lines is
//! stripped and records are yielded in input order.

use std::io::BufRead;

use crate::Error;

/// A named reference sequence from a Simple-FASTA stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    pub name: String,
    pub sequence: Vec<u8>,
}

/// A named read from a Simple-FASTQ stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastqRecord {
    pub name: String,
    pub sequence: Vec<u8>,
}

/// Parses `>`-headed records. All sequence lines up to the next header are
/// concatenated; lines before the first header are ignored.
pub fn read_fasta(reader: impl BufRead) -> Result<Vec<FastaRecord>, Error> {
    let mut records: Vec<FastaRecord> = Vec::new();

    for line in reader.lines() {
        let line = line?;

        if let Some(name) = line.strip_prefix('>') {
            records.push(FastaRecord {
                name: name.trim().to_owned(),
                sequence: Vec::new(),
            });
        } else if let Some(record) = records.last_mut() {
            record.sequence.extend(line.trim().bytes());
        }
    }

    Ok(records)
}

/// Parses `@`-headed records. Only the first line after a header is
/// interpreted as the read sequence, further continuation lines (separators,
/// quality strings) are ignored.
pub fn read_fastq(reader: impl BufRead) -> Result<Vec<FastqRecord>, Error> {
    let mut records: Vec<FastqRecord> = Vec::new();
    let mut sequence_seen = false;

    for line in reader.lines() {
        let line = line?;

        if let Some(name) = line.strip_prefix('@') {
            records.push(FastqRecord {
                name: name.trim().to_owned(),
                sequence: Vec::new(),
            });
            sequence_seen = false;
        } else if let Some(record) = records.last_mut()
            && !sequence_seen
        {
            record.sequence.extend(line.trim().bytes());
            sequence_seen = true;
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fasta_records_concatenate_their_sequence_lines() {
        let input = b">chromosome1\nacgt\n  acg  \n>chromosome2\n\nttt\n".as_slice();

        let records = read_fasta(input).unwrap();

        assert_eq!(
            records,
            vec![
                FastaRecord {
                    name: "chromosome1".to_owned(),
                    sequence: b"acgtacg".to_vec(),
                },
                FastaRecord {
                    name: "chromosome2".to_owned(),
                    sequence: b"ttt".to_vec(),
                },
            ]
        );
    }

    #[test]
    fn fasta_ignores_lines_before_the_first_header() {
        let records = read_fasta(b"junk\n>r\nac\n".as_slice()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sequence, b"ac");
    }

    #[test]
    fn fastq_reads_only_the_first_continuation_line() {
        let input = b"@read1\nacgt\n+\n!!!!\n@read2\ntttt\n".as_slice();

        let records = read_fastq(input).unwrap();

        assert_eq!(
            records,
            vec![
                FastqRecord {
                    name: "read1".to_owned(),
                    sequence: b"acgt".to_vec(),
                },
                FastqRecord {
                    name: "read2".to_owned(),
                    sequence: b"tttt".to_vec(),
                },
            ]
        );
    }

    #[test]
    fn fastq_header_without_sequence_yields_an_empty_read() {
        let records = read_fastq(b"@lonely\n".as_slice()).unwrap();

        assert_eq!(records.len(), 1);
        assert!(records[0].sequence.is_empty());
    }
}
