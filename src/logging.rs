use log::LevelFilter;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

/// Install the global logger. `RUST_LOG` selects env_logger and its filter
/// syntax; otherwise a terminal logger at `level`.
pub fn init(level: LevelFilter) {
    if std::env::var_os("RUST_LOG").is_some() {
        if env_logger::try_init().is_err() {
            eprintln!("logger already initialised");
        }
        return;
    }
    let config = ConfigBuilder::new()
        .set_target_level(LevelFilter::Debug)
        .set_thread_level(LevelFilter::Trace)
        .build();
    if TermLogger::init(level, config, TerminalMode::Mixed, ColorChoice::Auto).is_err() {
        eprintln!("logger already initialised");
    }
}
