use crate::config::{LoggingConfig, Section};
use std::{
    io::{IsTerminal, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::{level_filters::LevelFilter, Level};
use tracing_subscriber::{filter::Targets, fmt, layer::SubscriberExt, Layer, Registry};

use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};

fn parse_tracing_level(s: &str) -> Option<Level> {
    match s.to_ascii_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        "off" | "none" => None,
        _ => Some(Level::INFO),
    }
}

// -------- rotating writer --------

#[derive(Clone)]
struct RotWriter(Arc<Mutex<FileRotate<AppendTimestamp>>>);

impl<'a> fmt::MakeWriter<'a> for RotWriter {
    type Writer = RotWriterHandle;
    fn make_writer(&'a self) -> Self::Writer {
        RotWriterHandle(self.0.clone())
    }
}

#[derive(Clone)]
struct RotWriterHandle(Arc<Mutex<FileRotate<AppendTimestamp>>>);

impl Write for RotWriterHandle {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0.lock().unwrap().flush()
    }
}

/// Resolve a log file path against `base_dir` (usually server.home_dir).
fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

fn create_rotating_writer(section: &Section, base_dir: &Path) -> Option<RotWriter> {
    if section.file.trim().is_empty() {
        return None;
    }

    let log_path = resolve_log_path(&section.file, base_dir);
    if let Some(parent) = log_path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("Failed to create log dir {}: {}", parent.display(), e);
            return None;
        }
    }

    let max_bytes = section.max_size_mb.unwrap_or(100) as usize * 1024 * 1024;
    let rot = FileRotate::new(
        log_path,
        AppendTimestamp::default(FileLimit::Age(chrono::Duration::days(1))),
        ContentLimit::BytesSurpassed(max_bytes),
        Compression::None,
        #[cfg(unix)]
        None,
    );

    Some(RotWriter(Arc::new(Mutex::new(rot))))
}

// -------- public init --------

/// Initialize logging from configuration.
///
/// The "default" section drives the catch-all console level and file sink;
/// any other key is treated as a target prefix (crate/module name) with its
/// own levels and optional dedicated file.
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    // Bridge `log` → `tracing` before installing the subscriber.
    let _ = tracing_log::LogTracer::init();

    let default_section = cfg.get("default");
    let subsystems: Vec<(&String, &Section)> =
        cfg.iter().filter(|(k, _)| k.as_str() != "default").collect();

    // Console: one layer, default level plus per-subsystem overrides.
    let default_console = default_section
        .and_then(|s| parse_tracing_level(&s.console_level))
        .map(LevelFilter::from_level)
        .unwrap_or(LevelFilter::OFF);

    let mut console_targets = Targets::new().with_default(default_console);
    for (name, section) in &subsystems {
        let level = parse_tracing_level(&section.console_level)
            .map(LevelFilter::from_level)
            .unwrap_or(LevelFilter::OFF);
        console_targets = console_targets.with_target(name.as_str(), level);
    }

    let ansi = std::io::stdout().is_terminal();
    let console_layer = fmt::layer()
        .with_ansi(ansi)
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(console_targets);

    let mut layers = vec![console_layer.boxed()];

    // Default file sink: everything at file_level, minus subsystems with their own file.
    if let Some(section) = default_section {
        if let (Some(writer), Some(level)) = (
            create_rotating_writer(section, base_dir),
            parse_tracing_level(&section.file_level),
        ) {
            let mut targets = Targets::new().with_default(LevelFilter::from_level(level));
            for (name, sub) in &subsystems {
                if !sub.file.trim().is_empty() {
                    targets = targets.with_target(name.as_str(), LevelFilter::OFF);
                }
            }
            let layer = fmt::layer()
                .json()
                .with_ansi(false)
                .with_target(true)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_writer(writer)
                .with_filter(targets);
            layers.push(layer.boxed());
        }
    }

    // One dedicated file sink per subsystem section that configures one.
    for (name, section) in &subsystems {
        if let (Some(writer), Some(level)) = (
            create_rotating_writer(section, base_dir),
            parse_tracing_level(&section.file_level),
        ) {
            let targets = Targets::new()
                .with_default(LevelFilter::OFF)
                .with_target(name.as_str(), LevelFilter::from_level(level));
            let layer = fmt::layer()
                .json()
                .with_ansi(false)
                .with_target(true)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_writer(writer)
                .with_filter(targets);
            layers.push(layer.boxed());
        }
    }

    let _ = tracing::subscriber::set_global_default(Registry::default().with(layers));
}
