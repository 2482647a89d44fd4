use crate::types::*;
use clap::{ArgAction, Parser};
use encoding_rs::Encoding;
use std::num::NonZeroUsize;
use std::path::PathBuf;

fn parse_encoding(label: &str) -> Result<&'static Encoding, String> {
    Encoding::for_label(label.as_bytes()).ok_or_else(|| format!("Unknown encoding: {}", label))
}

/// Convert plain-text and subtitle files in a directory to one text encoding
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Arg {
    /// Directory to scan. Results are written to <DIR>/processed
    #[arg(default_value = "./")]
    pub dir: PathBuf,
    #[arg(short, long, default_value = "UTF-8", value_parser = parse_encoding)]
    /// Target text encoding
    pub encoding: &'static Encoding,
    #[arg(long, action = ArgAction::SetTrue)]
    /// Copy files already in the target encoding into the output directory
    pub copy: bool,
    #[cfg(feature = "archive")]
    #[arg(long, action = ArgAction::SetTrue)]
    /// Bundle processed files into processed/archive.zip
    pub compress: bool,
    #[cfg(feature = "archive")]
    #[arg(long, action = ArgAction::SetTrue)]
    /// Delete processed files after the archive is written. Only used with --compress
    pub cleanup: bool,
    #[arg(long, action = ArgAction::SetTrue)]
    /// Replace characters the target encoding can not represent instead of failing the file
    pub lossy: bool,
    #[arg(short, long)]
    /// Number of conversion workers. Defaults to the number of CPUs
    pub jobs: Option<NonZeroUsize>,
    #[arg(short, long, action = ArgAction::SetTrue)]
    /// Do not show a progress bar
    pub quiet: bool,
    #[arg(short, long, action = ArgAction::SetTrue)]
    /// Log more details. RUST_LOG overrides this
    pub verbose: bool,
}

impl Arg {
    pub fn run_options(&self) -> RunOptions {
        let mut options = RunOptions::new(&self.dir, self.encoding);
        options.copy_unchanged = self.copy;
        #[cfg(feature = "archive")]
        {
            options.compress = self.compress;
            options.cleanup_after_compress = self.cleanup;
        }
        options.lossy = self.lossy;
        if let Some(jobs) = self.jobs {
            options.jobs = jobs.get();
        }
        options
    }
}

pub fn parse_args() -> Arg {
    Arg::parse()
}

#[test]
fn test_defaults() {
    let arg = Arg::try_parse_from(["subenc"]).unwrap();
    let options = arg.run_options();
    assert_eq!(options.source_dir, PathBuf::from("./"));
    assert_eq!(options.output_dir, PathBuf::from("./").join(OUTPUT_DIR_NAME));
    assert_eq!(options.target_encoding, encoding_rs::UTF_8);
    assert!(!options.copy_unchanged);
    assert!(!options.compress);
    assert!(!options.lossy);
    assert!(options.jobs >= 1);
}

#[test]
fn test_flags() {
    let arg = Arg::try_parse_from(["subenc", "subs", "-e", "ISO-8859-1", "--copy", "-j", "3"])
        .unwrap();
    let options = arg.run_options();
    assert_eq!(options.source_dir, PathBuf::from("subs"));
    assert_eq!(options.target_encoding, encoding_rs::WINDOWS_1252);
    assert!(options.copy_unchanged);
    assert_eq!(options.jobs, 3);
    assert!(Arg::try_parse_from(["subenc", "-e", "no-such-encoding"]).is_err());
    assert!(Arg::try_parse_from(["subenc", "-j", "0"]).is_err());
}

#[cfg(feature = "archive")]
#[test]
fn test_archive_flags() {
    let arg = Arg::try_parse_from(["subenc", "--compress", "--cleanup"]).unwrap();
    let options = arg.run_options();
    assert!(options.compress);
    assert!(options.cleanup_after_compress);
}
