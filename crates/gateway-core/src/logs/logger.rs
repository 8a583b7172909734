//! Logger configuration, grounded on `kairos-rs::logs::logger`'s
//! column-aligned text formatter. Adds a `LOG_FORMAT=json` mode (spec §12)
//! for deployments that feed logs into an aggregator instead of a
//! terminal.

use std::env;
use std::io::Write;

use chrono::Local;
use env_logger::Builder;
use log::LevelFilter;

const LEVEL_FIELD_WIDTH: usize = 8;
const FILE_LINE_FIELD_WIDTH: usize = 22;

fn visible_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut visible = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == 0x1b {
            i += 1;
            if i < bytes.len() && bytes[i] == b'[' {
                i += 1;
            }
            while i < bytes.len() {
                let b = bytes[i];
                i += 1;
                if b == b'm' {
                    break;
                }
            }
        } else {
            let first = bytes[i];
            let width = if first < 0x80 {
                1
            } else if first >> 5 == 0b110 {
                2
            } else if first >> 4 == 0b1110 {
                3
            } else if first >> 3 == 0b11110 {
                4
            } else {
                1
            };
            visible += 1;
            i += width;
        }
    }
    visible
}

fn level_filter_from_env() -> LevelFilter {
    match env::var("LOG_LEVEL").ok().as_deref() {
        Some("error") => LevelFilter::Error,
        Some("warn") => LevelFilter::Warn,
        Some("info") => LevelFilter::Info,
        Some("debug") => LevelFilter::Debug,
        Some("trace") => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

/// Initializes the global logger. `RUST_LOG` still takes precedence if
/// set (via `env_logger`'s own parsing through `Builder::new()`'s default
/// behavior of reading it when `filter_level` isn't overridden more
/// specifically), otherwise `LOG_LEVEL` from spec §12 sets the baseline.
pub fn configure() {
    let no_color = env::var("NO_COLOR").is_ok();
    let json_format = env::var("LOG_FORMAT").map(|v| v == "json").unwrap_or(false);
    let level = level_filter_from_env();

    let mut builder = Builder::new();
    if json_format {
        builder.format(move |buf, record| {
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"target\":\"{}\",\"message\":{}}}",
                Local::now().to_rfc3339(),
                record.level(),
                record.target(),
                serde_json::to_string(&record.args().to_string()).unwrap_or_default(),
            )
        });
    } else {
        builder.format(move |buf, record| {
            let level = record.level();
            let level_plain = level.to_string();

            let (prefix, colored_level, suffix) = if no_color {
                (String::new(), level_plain.clone(), String::new())
            } else {
                let prefix = "\x1b[1m".to_string();
                let colored = match level {
                    log::Level::Error => format!("\x1b[31m{level_plain}\x1b[39m"),
                    log::Level::Warn => format!("\x1b[33m{level_plain}\x1b[39m"),
                    log::Level::Info => format!("\x1b[32m{level_plain}\x1b[39m"),
                    log::Level::Debug => format!("\x1b[34m{level_plain}\x1b[39m"),
                    log::Level::Trace => format!("\x1b[35m{level_plain}\x1b[39m"),
                };
                (prefix, colored, "\x1b[0m".to_string())
            };

            let level_display = format!("[{colored_level}]");
            let level_vis_len = visible_len(&level_display);
            let level_padding = if level_vis_len >= LEVEL_FIELD_WIDTH {
                1
            } else {
                LEVEL_FIELD_WIDTH - level_vis_len
            };

            let file = record.file().unwrap_or("unknown");
            let line = record.line().unwrap_or(0);
            let file_line = format!("{file}:{line}");
            let file_line_vis_len = visible_len(&file_line);
            let file_line_padding = if file_line_vis_len >= FILE_LINE_FIELD_WIDTH {
                1
            } else {
                FILE_LINE_FIELD_WIDTH - file_line_vis_len
            };

            writeln!(
                buf,
                "{}{} | {}{}| {}{}| {}{}",
                prefix,
                Local::now().format("%b %d %y %I:%M:%S %p"),
                level_display,
                " ".repeat(level_padding),
                file_line,
                " ".repeat(file_line_padding),
                record.args(),
                suffix,
            )
        });
    }

    builder.filter_level(level).init();
    log::set_max_level(LevelFilter::Trace);
}
