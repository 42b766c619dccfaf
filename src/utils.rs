use colored::*;
use std::sync::atomic::{AtomicBool, Ordering};

/// Debug mode flag - controls whether debug output is visible
static DEBUG_MODE: AtomicBool = AtomicBool::new(false);

/// Project prefix for all log messages
const PROJECT_PREFIX: &str = "[YGN]";

/// Characters that must not appear in recipe or image names.
pub const FORBIDDEN_NAME_CHARS: &[char] = &[
    '?', '!', '@', '#', '$', '%', '^', '&', '*', ' ', ';', '<', '>', '|', '"', '\x07', '\x08',
    '\x0c', '\n', '\r', '\t', '\x0b',
];

/// Set debug mode
pub fn set_debug_mode(enabled: bool) {
    DEBUG_MODE.store(enabled, Ordering::Relaxed);
}

/// Check if debug mode is enabled
pub fn is_debug_mode() -> bool {
    DEBUG_MODE.load(Ordering::Relaxed)
}

/// Return true if the name is non-empty and free of forbidden characters.
pub fn is_proper_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(FORBIDDEN_NAME_CHARS)
}

// ---------------------------------------------------------
// Semantic Styles - Simple one-line color functions
// ---------------------------------------------------------

pub fn style_success(msg: &str) -> String { msg.green().to_string() }
pub fn style_warning(msg: &str) -> String { msg.yellow().to_string() }
pub fn style_note(msg: &str) -> String { msg.magenta().to_string() }
pub fn style_debug(msg: &str) -> String { msg.bright_black().to_string() }
pub fn style_command(cmd: &str) -> String { cmd.bright_black().to_string() }
pub fn style_action(act: &str) -> String { act.yellow().to_string() }
pub fn style_name(name: &str) -> String { name.yellow().to_string() }
pub fn style_path(path: &str) -> String { path.blue().bold().to_string() }

// ---------------------------------------------------------
// Log Printers - Simplified implementations
// ---------------------------------------------------------

pub fn print_message(msg: &str) {
    println!("{} {}", PROJECT_PREFIX, msg);
}

pub fn print_success(msg: &str) {
    println!("{}{} {}", PROJECT_PREFIX, style_success("[PASS]"), msg);
}

pub fn print_warning(msg: &str) {
    eprintln!("{}{} {}", PROJECT_PREFIX, style_warning("[WARN]"), msg);
}

pub fn print_note(msg: &str) {
    println!("{}{} {}", PROJECT_PREFIX, style_note("[NOTE]"), msg);
}

pub fn print_debug(msg: &str) {
    if is_debug_mode() {
        eprintln!("{}{} {}", PROJECT_PREFIX, style_debug("[DBG] "), msg);
    }
}
