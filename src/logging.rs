use crate::config;
use once_cell::sync::Lazy;
pub use slog::*;

fn wrap<D: Drain<Err = Never, Ok = ()> + Send + 'static>(drain: D) -> Fuse<slog_async::Async> {
    slog_async::Async::default(slog_envlogger::new(drain)).fuse()
}

// An explicit LOG_FORMAT wins. Without one, production mode logs JSON
// and every other mode logs for a terminal.
fn log_format(mode: &str) -> String {
    config::get("LOG_FORMAT").unwrap_or_else(|_| {
        if mode == "production" {
            "json".to_string()
        } else {
            "term".to_string()
        }
    })
}

pub static DEFAULT: Lazy<Logger> = Lazy::new(|| {
    let mk_term = || {
        slog_term::FullFormat::new(slog_term::TermDecorator::new().build())
            .build()
            .fuse()
    };

    let mk_json = || slog_json::Json::default(std::io::stdout()).fuse();

    let frontend = config::frontend();
    let drain = match log_format(&frontend.react_app_mode).as_str() {
        "json" => wrap(mk_json()),
        _ => wrap(mk_term()),
    };

    Logger::root(
        drain,
        o!(
            "version" => env!("CARGO_PKG_VERSION"),
            "mode" => frontend.react_app_mode,
        ),
    )
});
