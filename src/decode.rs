//! Top-level recording decoder: one pass over the container, both metadata
//! chunks, duration, cross-fill.

use log::{debug, trace};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use crate::errors::DecodeError;
use crate::info::decode_list_chunk;
use crate::model::Recording;
use crate::riff::{WaveReader, DATA_ID, FMT_ID, LIST_ID, UNID_ID};
use crate::unid::decode_unid_chunk;

/// Decodes one scanner WAV file into a `Recording`.
pub fn decode_recording(path: &Path) -> Result<Recording, DecodeError> {
    let file = File::open(path).map_err(|e| DecodeError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    decode_stream(BufReader::new(file), path)
}

fn decode_stream<R: Read>(reader: R, path: &Path) -> Result<Recording, DecodeError> {
    let io_err = |e: io::Error| DecodeError::Io {
        path: path.to_path_buf(),
        source: e,
    };

    let mut rec = Recording {
        file: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        ..Default::default()
    };

    let mut wav = WaveReader::new(reader);
    wav.parse_headers()
        .map_err(|_| DecodeError::MalformedHeader {
            path: path.to_path_buf(),
        })?;

    loop {
        let header = match wav.next_chunk().map_err(io_err)? {
            Some(h) => h,
            None => break,
        };
        trace!(
            "chunk {:?} ({} bytes)",
            String::from_utf8_lossy(&header.id),
            header.size
        );
        match header.id {
            FMT_ID => wav.decode_wav_fmt(&header).map_err(io_err)?,
            // Nothing after the PCM payload carries radio metadata.
            DATA_ID => break,
            LIST_ID => {
                let payload = wav.read_payload(&header).map_err(|e| match e.kind() {
                    io::ErrorKind::UnexpectedEof => DecodeError::MalformedListChunk(format!(
                        "declared {} bytes but the stream ended early",
                        header.size
                    )),
                    _ => io_err(e),
                })?;
                rec.public = Some(decode_list_chunk(&payload)?);
            }
            UNID_ID => {
                let payload = wav.read_payload(&header).map_err(|e| match e.kind() {
                    io::ErrorKind::UnexpectedEof => DecodeError::MalformedUnidChunk(format!(
                        "declared {} bytes but the stream ended early",
                        header.size
                    )),
                    _ => io_err(e),
                })?;
                rec.private = Some(decode_unid_chunk(&header, &payload)?);
            }
            _ => wav.skip_payload(&header).map_err(io_err)?,
        }
    }

    rec.duration = wav.duration()?;
    reconcile(&mut rec);
    debug!(
        "decoded {}: duration {:?}, public={}, private={}",
        rec.file,
        rec.duration,
        rec.public.is_some(),
        rec.private.is_some()
    );
    Ok(rec)
}

/// Fills the fields present in both regions from whichever side has them.
/// One direction per field, applied once; never turns a non-empty field
/// empty.
fn reconcile(rec: &mut Recording) {
    let (Some(public), Some(private)) = (rec.public.as_mut(), rec.private.as_mut()) else {
        return;
    };

    if public.tgid_or_freq.is_empty() && !private.metadata.tgid.is_empty() {
        public.tgid_or_freq = private.metadata.tgid.clone();
    } else if private.metadata.tgid.is_empty() && !public.tgid_or_freq.is_empty() {
        private.metadata.tgid = public.tgid_or_freq.clone();
    }

    if public.unit_id.is_empty() && !private.metadata.unit_id.is_empty() {
        public.unit_id = private.metadata.unit_id.clone();
    } else if private.metadata.unit_id.is_empty() && !public.unit_id.is_empty() {
        private.metadata.unit_id = public.unit_id.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn chunk(id: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(id);
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(payload);
        if payload.len() % 2 == 1 {
            out.push(0);
        }
        out
    }

    fn envelope(chunks: &[Vec<u8>]) -> Vec<u8> {
        let body: Vec<u8> = chunks.concat();
        let mut out = Vec::new();
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&((body.len() + 4) as u32).to_le_bytes());
        out.extend_from_slice(b"WAVE");
        out.extend_from_slice(&body);
        out
    }

    fn pcm_fmt() -> Vec<u8> {
        let mut f = Vec::new();
        f.extend_from_slice(&1u16.to_le_bytes());
        f.extend_from_slice(&1u16.to_le_bytes());
        f.extend_from_slice(&8000u32.to_le_bytes());
        f.extend_from_slice(&16000u32.to_le_bytes()); // byte rate
        f.extend_from_slice(&2u16.to_le_bytes());
        f.extend_from_slice(&16u16.to_le_bytes());
        f
    }

    fn info_payload(tags: &[(&[u8; 4], &[u8])]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"INFO");
        for (id, value) in tags {
            out.extend_from_slice(*id);
            out.extend_from_slice(&(value.len() as u32).to_le_bytes());
            out.extend_from_slice(value);
        }
        out
    }

    /// A unid payload with the given Metadata template head; systems and
    /// channels are left at their defaults.
    fn unid_payload(metadata_head: &[&str]) -> Vec<u8> {
        let mut payload = vec![0u8; 2048];
        let joined = metadata_head.join("\x00");
        payload[608..608 + joined.len()].copy_from_slice(joined.as_bytes());
        payload
    }

    /// fmt + optional metadata chunks + a 32000-byte data chunk (2 seconds
    /// at the fixture byte rate).
    fn wav_fixture(extra: &[Vec<u8>]) -> Vec<u8> {
        let mut chunks = vec![chunk(b"fmt ", &pcm_fmt())];
        chunks.extend_from_slice(extra);
        chunks.push(chunk(b"data", &[0u8; 32000]));
        envelope(&chunks)
    }

    fn decode_bytes(bytes: Vec<u8>) -> Result<Recording, DecodeError> {
        decode_stream(Cursor::new(bytes), Path::new("fixtures/test.wav"))
    }

    #[test]
    fn minimal_list_info_only() {
        let list = info_payload(&[(b"IART", b"Test System\x00"), (b"ICRD", b"20200620223802\x00")]);
        let rec = decode_bytes(wav_fixture(&[chunk(b"LIST", &list)])).unwrap();

        assert_eq!(rec.file, "test.wav");
        assert_eq!(rec.duration, Duration::from_secs(2));
        let public = rec.public.expect("LIST chunk present");
        assert_eq!(public.system, "Test System");
        use chrono::TimeZone;
        let expected = chrono::Local.with_ymd_and_hms(2020, 6, 20, 22, 38, 2).unwrap();
        assert_eq!(public.timestamp, Some(expected));
        assert!(rec.private.is_none());
    }

    #[test]
    fn unit_id_prefix_stripping() {
        let list = info_payload(&[(b"ITCH", b"UID:12345\x00")]);
        let rec = decode_bytes(wav_fixture(&[chunk(b"LIST", &list)])).unwrap();
        assert_eq!(rec.public.unwrap().unit_id, "12345");
    }

    #[test]
    fn malformed_timestamp_fails_the_file() {
        let list = info_payload(&[(b"ICRD", b"not-a-date\x00")]);
        let err = decode_bytes(wav_fixture(&[chunk(b"LIST", &list)])).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedTimestamp { .. }));
    }

    #[test]
    fn reconciliation_private_to_public() {
        let list = info_payload(&[(b"IART", b"Sys\x00")]);
        let unid = unid_payload(&["TGID:4321"]);
        let rec = decode_bytes(wav_fixture(&[chunk(b"LIST", &list), chunk(b"unid", &unid)]))
            .unwrap();
        assert_eq!(rec.public.as_ref().unwrap().tgid_or_freq, "4321");
        assert_eq!(rec.private.as_ref().unwrap().metadata.tgid, "4321");
    }

    #[test]
    fn reconciliation_public_to_private() {
        let list = info_payload(&[(b"ICMT", b"8765\x00"), (b"ITCH", b"UID:42\x00")]);
        let unid = unid_payload(&[]);
        let rec = decode_bytes(wav_fixture(&[chunk(b"LIST", &list), chunk(b"unid", &unid)]))
            .unwrap();
        let private = rec.private.as_ref().unwrap();
        assert_eq!(private.metadata.tgid, "8765");
        assert_eq!(private.metadata.unit_id, "42");
    }

    #[test]
    fn reconciliation_biconditional_and_no_regression() {
        // Both sides populated and different: neither is overwritten.
        let list = info_payload(&[(b"ICMT", b"1111\x00")]);
        let unid = unid_payload(&["TGID:2222"]);
        let rec = decode_bytes(wav_fixture(&[chunk(b"LIST", &list), chunk(b"unid", &unid)]))
            .unwrap();
        let public = rec.public.as_ref().unwrap();
        let private = rec.private.as_ref().unwrap();
        assert_eq!(public.tgid_or_freq, "1111");
        assert_eq!(private.metadata.tgid, "2222");

        // Both sides empty: both stay empty.
        let rec = decode_bytes(wav_fixture(&[
            chunk(b"LIST", &info_payload(&[])),
            chunk(b"unid", &unid_payload(&[])),
        ]))
        .unwrap();
        let public = rec.public.as_ref().unwrap();
        let private = rec.private.as_ref().unwrap();
        assert_eq!(
            public.tgid_or_freq.is_empty(),
            private.metadata.tgid.is_empty()
        );
        assert_eq!(public.unit_id.is_empty(), private.metadata.unit_id.is_empty());
    }

    #[test]
    fn chunks_after_data_are_not_read() {
        // A malformed LIST after data must not matter.
        let mut bytes = wav_fixture(&[]);
        bytes.extend_from_slice(&chunk(b"LIST", b"INFOIART\xFF\xFF\xFF\xFF"));
        let rec = decode_bytes(bytes).unwrap();
        assert!(rec.public.is_none());
        assert_eq!(rec.duration, Duration::from_secs(2));
    }

    #[test]
    fn unknown_chunks_are_skipped() {
        let rec = decode_bytes(wav_fixture(&[chunk(b"JUNK", b"payload bytes")])).unwrap();
        assert!(rec.public.is_none());
        assert!(rec.private.is_none());
    }

    #[test]
    fn truncated_unid_chunk_is_malformed() {
        let err = decode_bytes(wav_fixture(&[chunk(b"unid", &[0u8; 100])])).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedUnidChunk(_)));
    }

    #[test]
    fn missing_envelope_is_a_malformed_header() {
        let err = decode_bytes(b"not a wav at all".to_vec()).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedHeader { .. }));

        let err = decode_bytes(Vec::new()).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedHeader { .. }));
    }

    #[test]
    fn decode_is_a_pure_function_of_the_bytes() {
        let list = info_payload(&[(b"IART", b"Sys\x00"), (b"ICMT", b"1234\x00")]);
        let unid = unid_payload(&["TGID:1234"]);
        let bytes = wav_fixture(&[chunk(b"LIST", &list), chunk(b"unid", &unid)]);
        let a = decode_bytes(bytes.clone()).unwrap();
        let b = decode_bytes(bytes).unwrap();
        assert_eq!(a, b);
        assert!(a.duration >= Duration::ZERO);
    }

    static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

    fn temp_wav(bytes: &[u8]) -> std::path::PathBuf {
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::SeqCst);
        let mut path = std::env::temp_dir();
        path.push(format!(
            "scanwav_test_{}_{}.wav",
            std::process::id(),
            counter
        ));
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn decode_recording_reads_from_disk() {
        let list = info_payload(&[(b"IART", b"Disk System\x00")]);
        let path = temp_wav(&wav_fixture(&[chunk(b"LIST", &list)]));
        let rec = decode_recording(&path).unwrap();
        assert_eq!(rec.file, path.file_name().unwrap().to_string_lossy());
        assert_eq!(rec.public.unwrap().system, "Disk System");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = decode_recording(Path::new("fixtures/definitely-missing.wav")).unwrap_err();
        assert!(matches!(err, DecodeError::Io { .. }));
    }
}
