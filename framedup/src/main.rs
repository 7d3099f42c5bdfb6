use std::{ffi::OsString, path::PathBuf};

use clap::Parser;
use color_eyre::eyre::{self, Context};
use framedup_common::{
    bin_common::{
        init::{init_eyre, init_logger},
        termination,
    },
    compare::Strategy,
    engine::{Deduplicator, Options},
    events::LogSink,
    materialize::Mode,
    utils::{cancel::CancelToken, fsutils::read_optional_file, percent::Threshold},
};

#[derive(Parser, Debug)]
#[command()]
/// Removes visually redundant frames from extracted frame sequences.
///
/// The input directory is expected to hold `segment_<start>_<end>`
/// directories with `frame_<number>.<ext>` files inside, as written by the
/// extraction stage.
struct Cli {
    /// Directory with the extracted segment directories
    #[arg(long, short = 's')]
    input_dir: PathBuf,

    /// Where to place the deduplicated frames (modes 2 and 3)
    #[arg(long, short = 'd')]
    output_dir: Option<PathBuf>,

    /// 1 = delete duplicates in place, 2 = copy kept frames to the output
    /// directory, 3 = like 2 but also remove the original segments
    #[arg(long, short = 'm', default_value_t = 1)]
    mode: u8,

    /// Dissimilarity tolerance, bigger removes more
    #[arg(long, short = 't', default_value_t = Threshold::DEFAULT)]
    threshold: Threshold,

    /// How frames are compared
    #[arg(long, short = 'a', value_enum, default_value_t = Strategy::Hash)]
    algorithm: Strategy,

    /// A file to additionally write the logs to
    #[arg(long)]
    logfile: Option<PathBuf>,
}

fn cli_arguments() -> eyre::Result<Cli> {
    const ARGS_FILE: &str = ".frameduprc";
    let mut args: Vec<OsString> = std::env::args_os().collect();

    if args.len() == 1 {
        if let Some(flags) = read_optional_file(ARGS_FILE)
            .wrap_err_with(|| format!("Could not read config file at: {ARGS_FILE}"))?
        {
            args.extend(
                flags
                    .split_whitespace()
                    .map(|s| std::ffi::OsStr::new(s).to_owned()),
            );
        }
    }

    Ok(Cli::parse_from(args))
}

fn main() -> eyre::Result<()> {
    init_eyre()?;
    let cli = cli_arguments()?;
    init_logger(cli.logfile.as_deref())?;

    log::debug!("CLI arguments: {cli:#?}");

    let mode = Mode::try_from(cli.mode).wrap_err("unsupported mode")?;

    let cancel = CancelToken::new();
    termination::install_signal_cancel(&cancel)
        .wrap_err("failed to install the signal handlers")?;

    let options = Options {
        mode,
        threshold: cli.threshold,
        strategy: cli.algorithm,
    };
    let sink = LogSink;
    let dedup = Deduplicator::new(
        &cli.input_dir,
        cli.output_dir.as_deref(),
        options,
        cancel,
        &sink,
    );

    let summary = dedup.run().wrap_err("deduplication failed")?;

    if summary.cancelled {
        log::warn!("stopped early, the result on disk is partial but consistent");
    }
    log::info!(
        "{} segments, {} frames seen, {} kept, {} removed",
        summary.segments,
        summary.frames_seen,
        summary.frames_kept,
        summary.frames_removed
    );

    Ok(())
}
