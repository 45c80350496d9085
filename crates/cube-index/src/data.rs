//! Cube data-file access.

use crate::{CubeError, CubeResult};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Single-slot cache over the currently open data file.
///
/// Consecutive records usually share a data file; the slot keeps it open
/// across them and swaps when the name changes. Dropping the slot (or the
/// probe call unwinding through an error) closes whatever is open, so the
/// file is closed exactly once on every exit path.
#[derive(Debug, Default)]
pub struct DataFileSlot {
    open: Option<(PathBuf, File)>,
}

impl DataFileSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn close(&mut self) {
        self.open = None;
    }

    fn get_or_open(&mut self, path: &Path) -> CubeResult<&mut File> {
        let cached = matches!(&self.open, Some((p, _)) if p == path);
        if !cached {
            debug!(file = %path.display(), "opening cube data file");
            let file = File::open(path)?;
            self.open = Some((path.to_path_buf(), file));
        }
        Ok(&mut self.open.as_mut().unwrap().1)
    }

    /// Read `count` packed 32-bit floats at `offset`, honouring the
    /// per-record byte order.
    pub fn read_floats(
        &mut self,
        path: &Path,
        offset: u64,
        count: usize,
        big_endian: bool,
    ) -> CubeResult<Vec<f64>> {
        let file = self.get_or_open(path)?;
        file.seek(SeekFrom::Start(offset))?;

        let mut buf = vec![0u8; count * 4];
        file.read_exact(&mut buf).map_err(|e| {
            CubeError::Invalid(format!(
                "data file {} short at offset {}: {}",
                path.display(),
                offset,
                e
            ))
        })?;

        let mut values = Vec::with_capacity(count);
        for chunk in buf.chunks_exact(4) {
            let raw = [chunk[0], chunk[1], chunk[2], chunk[3]];
            let v = if big_endian {
                f32::from_be_bytes(raw)
            } else {
                f32::from_le_bytes(raw)
            };
            values.push(v as f64);
        }
        Ok(values)
    }
}
