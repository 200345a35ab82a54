mod binfmt;
mod cli;
mod csv_out;
mod decode;
mod errors;
mod fields;
mod info;
mod model;
mod riff;
mod unid;

use crate::errors::DecodeError;
use env_logger::Env;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

fn setup_logging(level: &str) {
    let env = Env::default().filter_or("RUST_LOG", match level {
        "essential" => "info",
        "debug" => "debug",
        "trace" => "trace",
        "warn" => "warn",
        "error" => "error",
        _ => "info",
    });
    env_logger::Builder::from_env(env).init();
}

fn is_wav(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("wav"))
}

/// Expands the input arguments into a sorted list of WAV files. Directories
/// are walked recursively; plain files are taken as given.
fn collect_wavs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, DecodeError> {
    let mut wavs = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input) {
                let e = entry.map_err(|e| {
                    DecodeError::Output(format!("walking {}: {}", input.display(), e))
                })?;
                if e.file_type().is_file() && is_wav(e.path()) {
                    wavs.push(e.into_path());
                }
            }
        } else {
            wavs.push(input.clone());
        }
    }
    wavs.sort_unstable();
    Ok(wavs)
}

fn main() -> Result<(), DecodeError> {
    let args = cli::parse_cli();
    setup_logging(&args.log_level);

    let wavs = collect_wavs(&args.inputs)?;
    info!("Decoding {} WAV files", wavs.len());

    let mut recordings = Vec::new();
    for path in &wavs {
        debug!("Reading file {}", path.display());
        match decode::decode_recording(path) {
            Ok(rec) => recordings.push(rec),
            Err(e) if args.continue_on_error => {
                warn!("Skipping {}: {}", path.display(), e);
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        "Writing {} records to {}",
        recordings.len(),
        args.out.display()
    );
    csv_out::write_csv(&recordings, &args.out)?;

    info!("Done.");
    Ok(())
}
