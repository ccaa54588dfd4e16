use env_logger::{Builder, Env};
use log::LevelFilter;

/// Initializes the global logger.
///
/// `RUST_LOG` wins when set. Otherwise `verbose` selects debug output and
/// the default is info.
pub fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let env = Env::default().default_filter_or(level.to_string());
    let mut builder = Builder::from_env(env);

    // A second call finds a logger already installed; that is fine.
    let _ = builder.try_init();
}
