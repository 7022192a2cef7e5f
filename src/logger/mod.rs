//! Logger module
//!
//! Provides logging utilities for the solve server including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Solve outcome, error and warning logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
        &config.logging.level,
    )
}

/// Write to info log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
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

/// Write to access log specifically
fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info("Cube solve server started");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("  - POST http://{addr}/solve"));
    if config.health.enabled {
        write_info(&format!(
            "  - GET  http://{addr}{} / {}",
            config.health.liveness_path, config.health.readiness_path
        ));
    }
    write_info(&format!("Solver command: {}", config.solver.command));
    if config.solver.timeout_ms > 0 {
        write_info(&format!("Solver timeout: {} ms", config.solver.timeout_ms));
    }
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_signal_received(name: &str) {
    write_info(&format!("\n[Signal] {name} received, shutting down"));
}

pub fn log_server_stop(open_connections: usize) {
    write_info(&format!(
        "[Shutdown] No longer accepting connections, closing {open_connections} open"
    ));
}

pub fn log_forced_exit(name: &str) {
    write_error(&format!("[Signal] {name} received again, exiting immediately"));
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write_info(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

pub fn log_solve_success(moves: usize, already_solved: bool) {
    if already_solved {
        write_info("[Solve] Cube already solved");
    } else {
        write_info(&format!("[Solve] Solution found: {moves} moves"));
    }
}

pub fn log_solve_failure(message: &str) {
    write_error(&format!("[Solve] Rejected: {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}
