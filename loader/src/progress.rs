//! Progress narration for the load pipeline.
//!
//! Thin wrappers over stdout/stderr so every module narrates with the
//! same prefixes. Progress goes to stdout; warnings and errors carry
//! their own markers, with errors routed to stderr.

/// A single narration entry.
#[derive(Debug, Clone, Copy)]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

fn emit(level: Level, message: &str) {
    match level {
        Level::Info => println!("{}", message),
        Level::Success => println!("✅ {}", message),
        Level::Warning => println!("⚠️  {}", message),
        Level::Error => eprintln!("❌ {}", message),
    }
}

pub fn log_info(msg: impl AsRef<str>) {
    emit(Level::Info, msg.as_ref());
}

pub fn log_success(msg: impl AsRef<str>) {
    emit(Level::Success, msg.as_ref());
}

pub fn log_warning(msg: impl AsRef<str>) {
    emit(Level::Warning, msg.as_ref());
}

pub fn log_error(msg: impl AsRef<str>) {
    emit(Level::Error, msg.as_ref());
}
