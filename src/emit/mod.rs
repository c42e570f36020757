//! Row batching into sealed chunk files.
//!
//! The emitter accumulates rows until the threshold is reached, then seals
//! the buffer through a [`ChunkSink`] and starts a fresh one with the next
//! sequence number. [`RowEmitter::finish`] seals whatever is left, so a
//! partial final chunk is always written.

use crate::domain::Row;
use anyhow::Result;
use std::path::PathBuf;

pub mod sink;

pub use sink::{chunk_file_name, DirectorySink};

/// Destination for sealed chunks.
pub trait ChunkSink {
    /// Persist one chunk and return where it went.
    fn write_chunk(&mut self, sequence: usize, rows: &[Row]) -> Result<PathBuf>;
}

impl<S: ChunkSink + ?Sized> ChunkSink for &mut S {
    fn write_chunk(&mut self, sequence: usize, rows: &[Row]) -> Result<PathBuf> {
        (**self).write_chunk(sequence, rows)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedChunk {
    pub sequence: usize,
    pub rows: usize,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitterState {
    Accumulating,
    Sealing,
}

pub struct RowEmitter<S: ChunkSink> {
    sink: S,
    threshold: usize,
    buffer: Vec<Row>,
    next_sequence: usize,
    state: EmitterState,
    sealed: Vec<SealedChunk>,
}

impl<S: ChunkSink> RowEmitter<S> {
    /// A threshold of 0 is treated as 1.
    pub fn new(sink: S, threshold: usize) -> Self {
        let threshold = threshold.max(1);
        Self {
            sink,
            threshold,
            buffer: Vec::with_capacity(threshold),
            next_sequence: 0,
            state: EmitterState::Accumulating,
            sealed: Vec::new(),
        }
    }

    pub fn state(&self) -> EmitterState {
        self.state
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn sealed(&self) -> &[SealedChunk] {
        &self.sealed
    }

    /// Buffer a row, sealing when the threshold is reached.
    pub fn push(&mut self, row: Row) -> Result<Option<SealedChunk>> {
        self.buffer.push(row);
        if self.buffer.len() >= self.threshold {
            return self.seal().map(Some);
        }
        Ok(None)
    }

    pub fn extend<I: IntoIterator<Item = Row>>(&mut self, rows: I) -> Result<()> {
        for row in rows {
            self.push(row)?;
        }
        Ok(())
    }

    /// Seal the remaining rows, if any, and return every chunk written.
    pub fn finish(mut self) -> Result<Vec<SealedChunk>> {
        if !self.buffer.is_empty() {
            self.seal()?;
        }
        Ok(self.sealed)
    }

    fn seal(&mut self) -> Result<SealedChunk> {
        self.state = EmitterState::Sealing;
        let sequence = self.next_sequence;
        // On failure the buffer stays intact and the state stays Sealing
        let path = self.sink.write_chunk(sequence, &self.buffer)?;
        let chunk = SealedChunk { sequence, rows: self.buffer.len(), path };
        tracing::info!("Sealed chunk {} with {} rows", sequence, chunk.rows);

        self.buffer.clear();
        self.next_sequence += 1;
        self.state = EmitterState::Accumulating;
        self.sealed.push(chunk.clone());
        Ok(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FileRecord;

    /// Keeps chunks in memory.
    #[derive(Default)]
    struct MemorySink {
        chunks: Vec<(usize, Vec<Row>)>,
    }

    impl ChunkSink for MemorySink {
        fn write_chunk(&mut self, sequence: usize, rows: &[Row]) -> Result<PathBuf> {
            self.chunks.push((sequence, rows.to_vec()));
            Ok(PathBuf::from(format!("mem/{sequence}")))
        }
    }

    struct FailingSink;

    impl ChunkSink for FailingSink {
        fn write_chunk(&mut self, _sequence: usize, _rows: &[Row]) -> Result<PathBuf> {
            anyhow::bail!("disk full")
        }
    }

    fn row(i: usize) -> Row {
        Row::File(FileRecord {
            repo_id: "demo".into(),
            file_path: format!("f{i}.py"),
            content: i.to_string(),
        })
    }

    #[test]
    fn test_25_rows_threshold_10() {
        let mut sink = MemorySink::default();
        let mut emitter = RowEmitter::new(&mut sink, 10);
        emitter.extend((0..25).map(row)).unwrap();
        assert_eq!(emitter.buffered(), 5);
        let sealed = emitter.finish().unwrap();

        let sizes: Vec<usize> = sealed.iter().map(|c| c.rows).collect();
        assert_eq!(sizes, vec![10, 10, 5]);
        let sequences: Vec<usize> = sealed.iter().map(|c| c.sequence).collect();
        assert_eq!(sequences, vec![0, 1, 2]);
        assert_eq!(sink.chunks.len(), 3);
    }

    #[test]
    fn test_chunk_count_and_order_for_many_sizes() {
        for threshold in 1..=7 {
            for total in 0..=30 {
                let mut sink = MemorySink::default();
                let mut emitter = RowEmitter::new(&mut sink, threshold);
                emitter.extend((0..total).map(row)).unwrap();
                let sealed = emitter.finish().unwrap();

                assert_eq!(sealed.len(), total.div_ceil(threshold));
                let flattened: Vec<Row> =
                    sink.chunks.iter().flat_map(|(_, rows)| rows.clone()).collect();
                assert_eq!(flattened, (0..total).map(row).collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn test_push_reports_seal() {
        let mut emitter = RowEmitter::new(MemorySink::default(), 2);
        assert!(emitter.push(row(0)).unwrap().is_none());
        assert_eq!(emitter.state(), EmitterState::Accumulating);
        let sealed = emitter.push(row(1)).unwrap().expect("sealed");
        assert_eq!(sealed.rows, 2);
        assert_eq!(sealed.path, PathBuf::from("mem/0"));
        assert_eq!(emitter.buffered(), 0);
        assert_eq!(emitter.sealed().len(), 1);
    }

    #[test]
    fn test_zero_rows_emit_nothing() {
        let emitter = RowEmitter::new(MemorySink::default(), 10);
        assert!(emitter.finish().unwrap().is_empty());
    }

    #[test]
    fn test_sink_failure_keeps_rows() {
        let mut emitter = RowEmitter::new(FailingSink, 1);
        assert!(emitter.push(row(0)).is_err());
        assert_eq!(emitter.state(), EmitterState::Sealing);
        assert_eq!(emitter.buffered(), 1);
    }
}
