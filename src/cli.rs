use argparse::{ArgumentParser, Collect, Store, StoreFalse, StoreTrue};
use std::path::PathBuf;

pub struct CliArgs {
    pub inputs: Vec<PathBuf>,
    pub out: PathBuf,
    pub continue_on_error: bool,
    pub log_level: String,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            inputs: vec![],
            out: PathBuf::from("recordings.csv"),
            continue_on_error: true,
            log_level: "essential".into(),
        }
    }
}

pub fn parse_cli() -> CliArgs {
    let mut args = CliArgs::default();
    {
        let mut ap = ArgumentParser::new();
        ap.set_description("Uniden scanner WAV metadata -> CSV decoder");
        ap.refer(&mut args.inputs)
            .add_argument("inputs", Collect, "WAV files or directories of recordings");
        ap.refer(&mut args.out)
            .add_option(&["-o", "--out"], Store, "Output CSV path");
        ap.refer(&mut args.continue_on_error)
            .add_option(
                &["--continue-on-error"],
                StoreTrue,
                "Log undecodable files and keep going (default)",
            )
            .add_option(
                &["--stop-on-error"],
                StoreFalse,
                "Abort on the first undecodable file",
            );
        ap.refer(&mut args.log_level)
            .add_option(&["--log"], Store, "Log level (essential|debug|trace|warn|error)");
        ap.parse_args_or_exit();
    }
    args
}
