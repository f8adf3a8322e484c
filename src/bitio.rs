// Bit-granular I/O over byte streams.
//
// Bits are packed most-significant-bit first: the first bit written to a
// byte lands in position 7, the first bit read from a byte comes from
// position 7. Two writers sit on top of that packing:
//
//   - `write_bits` / `write_code` push literal bit sequences in order
//   - `write_value` pushes the low `len` bits of an integer, LSB first
//
// `BitReader::read_value` is the mirror of `write_value`. The final partial
// byte is zero-padded when the writer is closed; the reader has no notion of
// padding and hands pad bits back like any other bit.

use std::io::{self, Read, Write};

use thiserror::Error;

const BITS_IN_BYTE: u8 = 8;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum BitIoError {
    /// No unread bits remain in the underlying stream.
    #[error("unexpected end of bit stream")]
    EndOfStream,

    /// The underlying reader or writer failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

// ---------------------------------------------------------------------------
// BitReader
// ---------------------------------------------------------------------------

/// Reads a byte stream as a sequence of bits, MSB first.
pub struct BitReader<R: Read> {
    inner: R,
    current: u8,
    /// Unread bits left in `current` (0..=8).
    remaining: u8,
    bytes_read: u64,
}

impl<R: Read> BitReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            current: 0,
            remaining: 0,
            bytes_read: 0,
        }
    }

    /// Read the next bit.
    ///
    /// Fails with [`BitIoError::EndOfStream`] once every byte of the
    /// underlying stream has been consumed.
    pub fn next_bit(&mut self) -> Result<bool, BitIoError> {
        if self.remaining == 0 {
            self.refill()?;
        }
        self.remaining -= 1;
        Ok((self.current >> self.remaining) & 1 == 1)
    }

    /// Read `n` bits in stream order.
    pub fn next_bits(&mut self, n: usize) -> Result<Vec<bool>, BitIoError> {
        let mut bits = Vec::with_capacity(n);
        for _ in 0..n {
            bits.push(self.next_bit()?);
        }
        Ok(bits)
    }

    /// Read an unsigned integer of `len` bits written by
    /// [`BitWriter::write_value`] (least-significant bit first).
    pub fn read_value(&mut self, len: u32) -> Result<u64, BitIoError> {
        debug_assert!(len <= 64);
        let mut value = 0u64;
        for bit in 0..len {
            if self.next_bit()? {
                value |= 1 << bit;
            }
        }
        Ok(value)
    }

    /// Number of whole bytes pulled from the underlying reader.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Release the underlying reader. Unread bits are discarded.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn refill(&mut self) -> Result<(), BitIoError> {
        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => return Err(BitIoError::EndOfStream),
                Ok(_) => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        self.current = byte[0];
        self.remaining = BITS_IN_BYTE;
        self.bytes_read += 1;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// BitWriter
// ---------------------------------------------------------------------------

/// Packs bits into bytes, MSB first, and forwards every completed byte to
/// the underlying writer.
///
/// The pending partial byte is zero-padded and flushed exactly once: by
/// [`close`](Self::close), by [`finish`](Self::finish), or on drop if neither
/// was called. Errors on the drop path are ignored, like `BufWriter`.
pub struct BitWriter<W: Write> {
    inner: Option<W>,
    pending: u8,
    /// Bits held in `pending` (0..8).
    pending_len: u8,
    bits_written: u64,
    closed: bool,
}

impl<W: Write> BitWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner: Some(inner),
            pending: 0,
            pending_len: 0,
            bits_written: 0,
            closed: false,
        }
    }

    /// Append one bit.
    pub fn write_bit(&mut self, bit: bool) -> Result<(), BitIoError> {
        debug_assert!(!self.closed, "write after close");
        self.pending |= u8::from(bit) << (BITS_IN_BYTE - 1 - self.pending_len);
        self.pending_len += 1;
        self.bits_written += 1;
        if self.pending_len == BITS_IN_BYTE {
            self.flush_pending()?;
        }
        Ok(())
    }

    /// Append a literal bit sequence in order.
    pub fn write_bits(&mut self, bits: &[bool]) -> Result<(), BitIoError> {
        for &bit in bits {
            self.write_bit(bit)?;
        }
        Ok(())
    }

    /// Append the low `len` bits of `value`, least-significant bit first.
    pub fn write_value(&mut self, value: u64, len: u32) -> Result<(), BitIoError> {
        debug_assert!(len <= 64);
        for bit in 0..len {
            self.write_bit((value >> bit) & 1 == 1)?;
        }
        Ok(())
    }

    /// Append the low `len` bits of a code value, most-significant bit first.
    pub fn write_code(&mut self, value: u128, len: u32) -> Result<(), BitIoError> {
        for bit in (0..len).rev() {
            self.write_bit((value >> bit) & 1 == 1)?;
        }
        Ok(())
    }

    /// Total bits appended so far, padding excluded.
    pub fn bits_written(&self) -> u64 {
        self.bits_written
    }

    /// Pad the partial byte with zeros, flush it and the underlying writer.
    ///
    /// Calling `close` more than once is a no-op.
    pub fn close(&mut self) -> Result<(), BitIoError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if self.pending_len > 0 {
            self.flush_pending()?;
        }
        if let Some(inner) = self.inner.as_mut() {
            inner.flush()?;
        }
        Ok(())
    }

    /// Close the writer and hand back the underlying sink.
    pub fn finish(mut self) -> Result<W, BitIoError> {
        self.close()?;
        self.inner
            .take()
            .ok_or_else(|| io::Error::other("bit writer already released").into())
    }

    fn flush_pending(&mut self) -> Result<(), BitIoError> {
        let byte = self.pending;
        self.pending = 0;
        self.pending_len = 0;
        match self.inner.as_mut() {
            Some(inner) => inner.write_all(&[byte]).map_err(BitIoError::from),
            None => Err(io::Error::other("bit writer already released").into()),
        }
    }
}

impl<W: Write> Drop for BitWriter<W> {
    fn drop(&mut self) {
        if !self.closed && self.inner.is_some() {
            let _ = self.close();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
