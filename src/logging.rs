use log::LevelFilter;
use std::io;

const LOG_FILE: &str = "/tmp/archinst.log";

/// Initialize logging with the fern logger.
///
/// Messages at `stderr_level` and above are written to the terminal, while every
/// debug message is kept in the log files for post-mortem inspection.
pub fn log(stderr_level: LevelFilter) -> Result<(), fern::InitError> {
    let mut files = fern::Dispatch::new().level(LevelFilter::Debug);

    match fern::log_file(LOG_FILE) {
        Ok(log) => files = files.chain(log),
        Err(why) => eprintln!("failed to create log file at {}: {}", LOG_FILE, why),
    }

    // If the home directory exists, add a log there as well.
    if let Some(home) = dirs::home_dir() {
        match fern::log_file(&home.join("archinst.log")) {
            Ok(log) => files = files.chain(log),
            Err(why) => eprintln!("failed to set up logging for the home directory: {}", why),
        }
    }

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} archinst{}] {}",
                record.level(),
                match (record.file(), record.line()) {
                    (Some(file), Some(line)) => format!(":{}:{}", file, line),
                    _ => "".into(),
                },
                message
            ))
        })
        .level(LevelFilter::Debug)
        .chain(fern::Dispatch::new().level(stderr_level).chain(io::stderr()))
        .chain(files)
        .apply()?;

    Ok(())
}
