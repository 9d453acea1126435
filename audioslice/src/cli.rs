use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, Command};

use audioslice_core::ARCHIVE_NAME;

pub fn build_cli() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about("Split an audio file into segments bundled as a zip archive")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("start")
                .long("start")
                .value_name("SECONDS")
                .help("Start of the excerpt to extract, in seconds")
                .value_parser(value_parser!(f64)),
        )
        .arg(
            Arg::new("end")
                .long("end")
                .value_name("SECONDS")
                .help("End of the excerpt to extract, in seconds")
                .value_parser(value_parser!(f64)),
        )
        .arg(
            Arg::new("count")
                .short('c')
                .long("count")
                .value_name("N")
                .help("Number of equal-length segments to split into")
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("ARCHIVE")
                .help("Path of the generated archive")
                .default_value(ARCHIVE_NAME)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("threads")
                .long("threads")
                .value_name("N")
                .help("Bound the number of encoding threads")
                .value_parser(value_parser!(NonZeroUsize)),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Preview the archive entries without encoding anything")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("file_path")
                .value_name("FILE_PATH")
                .help("Path to the input audio file")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
}
