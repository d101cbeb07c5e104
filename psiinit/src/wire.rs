// Flat little-endian byte layout for broadcasting parsed tables and error
// records. Integers are 8 bytes whatever the platform's usize, so the image
// is the same on every rank of an MPI job.

use crate::error::{PsiInitError, Result};
use dwmpi::CommData;

#[derive(Default)]
pub(crate) struct WireWriter {
    buf: Vec<u8>,
}

impl WireWriter {
    pub fn new() -> WireWriter {
        WireWriter::default()
    }

    pub fn put_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn put_usize(&mut self, v: usize) {
        v.put(&mut self.buf);
    }

    pub fn put_str(&mut self, s: &str) {
        self.put_usize(s.len());
        self.buf.extend_from_slice(s.as_bytes());
    }

    pub fn put_f64s(&mut self, v: &[f64]) {
        self.put_usize(v.len());
        dwmpi::encode_slice(v, &mut self.buf);
    }

    /// Error tag followed by its message.
    pub fn put_error(&mut self, e: &PsiInitError) {
        let (tag, payload) = e.to_wire();

        self.put_u8(tag);
        self.put_str(&payload);
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

pub(crate) struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> WireReader<'a> {
        WireReader { buf, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(n).filter(|&e| e <= self.buf.len());

        match end {
            Some(end) => {
                let s = &self.buf[self.pos..end];
                self.pos = end;
                Ok(s)
            }

            None => Err(PsiInitError::Comm(format!(
                "broadcast payload truncated at byte {} of {}",
                self.pos,
                self.buf.len()
            ))),
        }
    }

    pub fn get_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn get_usize(&mut self) -> Result<usize> {
        Ok(usize::get(self.take(usize::NBYTES)?))
    }

    pub fn get_str(&mut self) -> Result<String> {
        let n = self.get_usize()?;
        let bytes = self.take(n)?;

        String::from_utf8(bytes.to_vec())
            .map_err(|_| PsiInitError::Comm("broadcast string is not utf-8".to_string()))
    }

    pub fn get_error(&mut self) -> Result<PsiInitError> {
        let tag = self.get_u8()?;
        let payload = self.get_str()?;

        Ok(PsiInitError::from_wire(tag, payload))
    }

    pub fn get_f64s(&mut self) -> Result<Vec<f64>> {
        let n = self.get_usize()?;
        let nbytes = n
            .checked_mul(f64::NBYTES)
            .ok_or_else(|| PsiInitError::Comm("broadcast array length overflows".to_string()))?;

        let bytes = self.take(nbytes)?;

        let mut v = vec![0.0; n];
        dwmpi::decode_slice(bytes, &mut v)?;

        Ok(v)
    }

    pub fn is_empty(&self) -> bool {
        self.pos == self.buf.len()
    }
}
