//! Logger module
//!
//! Provides logging utilities for the message board server including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Message write path events (stored messages, geolocation outcomes)
//! - Error and warning logging with a configurable minimum level

mod format;
pub mod writer;

pub use format::AccessLogEntry;
pub use writer::Level;

use crate::config::Config;
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::set_level(Level::parse(&config.logging.level));
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info("Message board server started");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Messages endpoint: {}", config.routes.messages_path));
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    write_info(&format!(
        "Store: {:?} ({})",
        config.store.backend, config.store.path
    ));
    if config.geolocation.enabled {
        write_info(&format!("Geolocation: {}", config.geolocation.base_url));
    } else {
        write_info("Geolocation: disabled");
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_server_stop(reason: &str) {
    write_info(&format!("[Shutdown] {reason}, no longer accepting connections"));
}

pub fn log_info(message: &str) {
    if writer::enabled(Level::Info) {
        write_info(&format!("[INFO] {message}"));
    }
}

pub fn log_debug(message: &str) {
    if writer::enabled(Level::Debug) {
        write_info(&format!("[DEBUG] {message}"));
    }
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    log_debug(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    log_error(&format!("Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    if writer::enabled(Level::Error) {
        write_error(&format!("[ERROR] {message}"));
    }
}

pub fn log_warning(message: &str) {
    if writer::enabled(Level::Warn) {
        write_error(&format!("[WARN] {message}"));
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    match writer::get() {
        Some(w) => w.write_access(&entry.format(format)),
        None => println!("{}", entry.format(format)),
    }
}

pub fn log_message_stored(user: &str, id: &str, len: usize) {
    log_info(&format!("[Message] Stored {id} for {user} ({len} bytes)"));
}

pub fn log_location(user: &str, ip: &str, country_code: &str, country_name: Option<&str>) {
    match country_name {
        Some(name) => log_info(&format!(
            "[Geo] {user} at {ip} located in {country_code} ({name})"
        )),
        None => log_info(&format!("[Geo] {user} at {ip} located in {country_code}")),
    }
}
