use std::path::Path;

use color_eyre::{
    config::{HookBuilder, Theme},
    eyre::{self, Context},
};
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

pub fn init_eyre() -> eyre::Result<()> {
    let theme = if std::io::IsTerminal::is_terminal(&std::io::stderr()) {
        Theme::dark()
    } else {
        Theme::new()
    };

    HookBuilder::default()
        .theme(theme)
        .install()
        .wrap_err("failed to install the eyre hooks")
}

pub fn init_logger(logfile: Option<&Path>) -> eyre::Result<()> {
    let config = ConfigBuilder::new()
        .set_target_level(log::LevelFilter::Error)
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];

    if let Some(logfile) = logfile {
        let file = std::fs::File::create(logfile)
            .wrap_err_with(|| format!("failed to open the log file at: {logfile:?}"))?;
        loggers.push(WriteLogger::new(log::LevelFilter::Debug, config, file));
    }

    CombinedLogger::init(loggers).wrap_err("failed to set the logger")
}
