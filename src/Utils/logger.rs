use log::LevelFilter;
use simplelog::{ColorChoice, Config, SimpleLogger, TermLogger, TerminalMode};

/// Installs a terminal logger at the given level. Falls back to a plain stdout logger
/// when no terminal is attached. Calling it again after a logger is installed does nothing.
pub fn init_logger(level: LevelFilter) {
    if TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .is_err()
    {
        let _ = SimpleLogger::init(level, Config::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logger_twice() {
        init_logger(LevelFilter::Info);
        init_logger(LevelFilter::Debug);
        log::info!("logger initialised twice without panicking");
    }
}
