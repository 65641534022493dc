//! C3 — Record Splitter: given the science byte stream and the record
//! length from the mode table, yields `(ancillary, echo, index)` triples
//! until EOF. A short tail is fatal (`Error::TruncatedScienceStream`).

use std::fs::File;
use std::io::Read;

use crate::error::{Error, Result};

const ANCILLARY_LEN: usize = 186;

/// Splits a science file into fixed-length records, each itself split into
/// its 186-byte ancillary header and its echo payload.
pub struct RecordSplitter {
    file: File,
    record_length: usize,
    index: usize,
}

impl RecordSplitter {
    pub fn open(file: File, record_length: usize) -> Self {
        RecordSplitter {
            file,
            record_length,
            index: 0,
        }
    }

    /// Reads the next record, or `None` at a clean EOF (zero bytes read).
    ///
    /// Returns `Error::TruncatedScienceStream` if a nonzero but incomplete
    /// record is read at the tail of the stream.
    pub fn next_record(&mut self) -> Result<Option<(Vec<u8>, Vec<u8>, usize)>> {
        let mut buf = vec![0u8; self.record_length];
        let mut got = 0usize;
        loop {
            match self.file.read(&mut buf[got..])? {
                0 => break,
                n => got += n,
            }
            if got == self.record_length {
                break;
            }
        }

        if got == 0 {
            return Ok(None);
        }
        if got != self.record_length {
            return Err(Error::TruncatedScienceStream {
                record_index: self.index,
                expected: self.record_length,
                got,
            });
        }

        let ancillary = buf[..ANCILLARY_LEN].to_vec();
        let echo = buf[ANCILLARY_LEN..].to_vec();
        let index = self.index;
        self.index += 1;
        Ok(Some((ancillary, echo, index)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(data: &[u8]) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(data).unwrap();
        f
    }

    #[test]
    fn yields_contiguous_zero_based_indices() {
        let record_len = 1986;
        let data = vec![0u8; record_len * 3];
        let tempfile = write_temp(&data);
        let mut splitter = RecordSplitter::open(File::open(tempfile.path()).unwrap(), record_len);

        for expected_index in 0..3 {
            let (anc, echo, idx) = splitter.next_record().unwrap().unwrap();
            assert_eq!(idx, expected_index);
            assert_eq!(anc.len(), 186);
            assert_eq!(echo.len(), record_len - 186);
        }
        assert!(splitter.next_record().unwrap().is_none());
    }

    #[test]
    fn short_tail_is_fatal() {
        let record_len = 200;
        let data = vec![0u8; record_len + 50];
        let tempfile = write_temp(&data);
        let mut splitter = RecordSplitter::open(File::open(tempfile.path()).unwrap(), record_len);

        assert!(splitter.next_record().unwrap().is_some());
        let err = splitter.next_record().unwrap_err();
        assert!(matches!(err, Error::TruncatedScienceStream { got: 50, .. }));
    }

    #[test]
    fn splits_ancillary_and_echo_at_186() {
        let record_len = 1986;
        let mut data = vec![0u8; record_len];
        data[185] = 0xAB; // last ancillary byte
        data[186] = 0xCD; // first echo byte
        let tempfile = write_temp(&data);
        let mut splitter = RecordSplitter::open(File::open(tempfile.path()).unwrap(), record_len);

        let (anc, echo, _idx) = splitter.next_record().unwrap().unwrap();
        assert_eq!(anc.len(), 186);
        assert_eq!(echo.len(), record_len - 186);
        assert_eq!(anc[185], 0xAB);
        assert_eq!(echo[0], 0xCD);
    }
}
