use chrono::Local;
use env_logger::{Builder, Env};
use log::{self, LevelFilter};
use std::io::Write;
use yansi::Paint;

/// Initializes console logging at the given level
///
/// `RUST_LOG` still wins when set, so individual modules (for example
/// `org_activity_audit::github=debug`) can be turned up without a rebuild.
/// Calling this twice is harmless; the second call is ignored.
pub fn init(level: LevelFilter) {
    let env = Env::default()
        .filter_or("RUST_LOG", level.to_string().to_lowercase())
        .write_style_or("RUST_LOG_STYLE", "auto");

    let _ = Builder::from_env(env)
        .format(|buf, record| writeln!(buf, "{}", format_log(record)))
        .try_init();
}

/// Formats a log record as `[time] LEVEL [target] message`
pub fn format_log(record: &log::Record) -> String {
    let level = match record.level() {
        log::Level::Error => Paint::red("ERROR").bold(),
        log::Level::Warn => Paint::yellow("WARN ").bold(),
        log::Level::Info => Paint::cyan("INFO ").bold(),
        log::Level::Debug => Paint::blue("DEBUG").bold(),
        log::Level::Trace => Paint::new("TRACE"),
    };

    let timestamp = Local::now().format("%H:%M:%S%.3f");
    let target = record
        .module_path()
        .unwrap_or_else(|| record.target())
        .trim_start_matches("org_activity_audit::");

    format!("[{}] {} [{}] {}", timestamp, level, target, record.args())
}

/// Parses a log level name, falling back to `Info` for anything unknown
pub fn parse_log_level(level: &str) -> LevelFilter {
    match level.trim().to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" | "warning" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}
