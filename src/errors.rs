use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: missing or truncated RIFF/WAVE header")]
    MalformedHeader { path: PathBuf },
    #[error("malformed LIST chunk: {0}")]
    MalformedListChunk(String),
    #[error("malformed unid chunk: {0}")]
    MalformedUnidChunk(String),
    #[error("malformed ICRD timestamp {value:?}: {reason}")]
    MalformedTimestamp { value: String, reason: String },
    #[error("{record} {field}: cannot parse {value:?}: {reason}")]
    FieldParse {
        record: &'static str,
        field: &'static str,
        value: String,
        reason: String,
    },
    #[error("cannot compute audio duration: {0}")]
    Duration(String),
    #[error("output error: {0}")]
    Output(String),
}

impl DecodeError {
    /// Shorthand for the per-field failures raised inside the unid
    /// sub-record decoders.
    pub fn field(
        record: &'static str,
        field: &'static str,
        value: &str,
        reason: impl ToString,
    ) -> Self {
        DecodeError::FieldParse {
            record,
            field,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}
