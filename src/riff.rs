//! Minimal RIFF/WAVE chunk walker.
//!
//! Walks top-level chunks in file order. The caller decides per chunk id
//! whether to read the payload or skip it; either way the stream is left at
//! the next chunk header, including the RIFF pad byte after odd-sized
//! payloads. Duration comes from the `fmt ` byte rate and the `data` size,
//! so one pass over one open handle is enough.

use byteorder::{LittleEndian, ReadBytesExt};
use log::debug;
use std::io::{self, Read};
use std::time::Duration;

use crate::errors::DecodeError;

pub const FMT_ID: [u8; 4] = *b"fmt ";
pub const DATA_ID: [u8; 4] = *b"data";
pub const LIST_ID: [u8; 4] = *b"LIST";
pub const UNID_ID: [u8; 4] = *b"unid";

#[derive(Debug, Clone, Copy)]
pub struct ChunkHeader {
    pub id: [u8; 4],
    pub size: u32,
}

#[derive(Debug, Clone, Copy)]
struct WaveFmt {
    avg_bytes_per_sec: u32,
}

pub struct WaveReader<R> {
    inner: R,
    fmt: Option<WaveFmt>,
    data_size: Option<u32>,
}

impl<R: Read> WaveReader<R> {
    pub fn new(inner: R) -> Self {
        WaveReader {
            inner,
            fmt: None,
            data_size: None,
        }
    }

    /// Reads the 12-byte outer envelope. Anything short of `RIFF....WAVE`
    /// is an error; the caller reports it as a malformed header.
    pub fn parse_headers(&mut self) -> io::Result<()> {
        let mut outer = [0u8; 12];
        self.inner.read_exact(&mut outer)?;
        if &outer[0..4] != b"RIFF" || &outer[8..12] != b"WAVE" {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "missing RIFF/WAVE envelope",
            ));
        }
        Ok(())
    }

    /// Next chunk header, or None at a clean end of stream. EOF in the
    /// middle of a header is an error.
    pub fn next_chunk(&mut self) -> io::Result<Option<ChunkHeader>> {
        let mut id = [0u8; 4];
        match self.inner.read_exact(&mut id) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e),
        }
        let size = self.inner.read_u32::<LittleEndian>()?;
        if id == DATA_ID {
            self.data_size = Some(size);
        }
        Ok(Some(ChunkHeader { id, size }))
    }

    /// Whole payload plus the pad byte. Grows with the bytes actually
    /// present, so a lying size field fails with UnexpectedEof instead of a
    /// giant allocation.
    pub fn read_payload(&mut self, header: &ChunkHeader) -> io::Result<Vec<u8>> {
        let want = u64::from(header.size);
        let mut buf = Vec::new();
        self.inner.by_ref().take(want).read_to_end(&mut buf)?;
        if (buf.len() as u64) < want {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("chunk declares {} bytes, got {}", want, buf.len()),
            ));
        }
        self.skip_pad(header)?;
        Ok(buf)
    }

    /// Discards the payload and pad byte. A truncated tail chunk just ends
    /// the stream; the next `next_chunk` reports a clean end.
    pub fn skip_payload(&mut self, header: &ChunkHeader) -> io::Result<()> {
        let len = u64::from(header.size) + u64::from(header.size & 1);
        io::copy(&mut self.inner.by_ref().take(len), &mut io::sink())?;
        Ok(())
    }

    fn skip_pad(&mut self, header: &ChunkHeader) -> io::Result<()> {
        if header.size % 2 == 1 {
            let mut pad = [0u8; 1];
            match self.inner.read_exact(&mut pad) {
                // Final chunks in the wild sometimes omit the pad byte.
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(()),
                other => return other,
            }
        }
        Ok(())
    }

    /// Decodes the 16-byte PCM descriptor of the `fmt ` chunk and remembers
    /// the byte rate for `duration`.
    pub fn decode_wav_fmt(&mut self, header: &ChunkHeader) -> io::Result<()> {
        if header.id != FMT_ID {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "not a fmt chunk",
            ));
        }
        if header.size < 16 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("fmt chunk is {} bytes, expected at least 16", header.size),
            ));
        }
        let payload = self.read_payload(header)?;
        let mut r = payload.as_slice();
        let audio_format = r.read_u16::<LittleEndian>()?;
        let num_channels = r.read_u16::<LittleEndian>()?;
        let sample_rate = r.read_u32::<LittleEndian>()?;
        let avg_bytes_per_sec = r.read_u32::<LittleEndian>()?;
        let block_align = r.read_u16::<LittleEndian>()?;
        let bits_per_sample = r.read_u16::<LittleEndian>()?;
        debug!(
            "fmt: format={} channels={} rate={} byte_rate={} align={} bits={}",
            audio_format, num_channels, sample_rate, avg_bytes_per_sec, block_align, bits_per_sample
        );
        self.fmt = Some(WaveFmt { avg_bytes_per_sec });
        Ok(())
    }

    /// Audio duration: data size over fmt byte rate.
    pub fn duration(&self) -> Result<Duration, DecodeError> {
        let fmt = self
            .fmt
            .as_ref()
            .ok_or_else(|| DecodeError::Duration("no fmt chunk before data".into()))?;
        let data_size = self
            .data_size
            .ok_or_else(|| DecodeError::Duration("no data chunk in stream".into()))?;
        if fmt.avg_bytes_per_sec == 0 {
            return Err(DecodeError::Duration("fmt declares a zero byte rate".into()));
        }
        Ok(Duration::from_secs_f64(
            f64::from(data_size) / f64::from(fmt.avg_bytes_per_sec),
        ))
    }
}
