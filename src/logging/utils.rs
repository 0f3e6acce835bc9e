//! Log file location and ANSI handling.
use std::path::PathBuf;

/// Remove ANSI escape sequences so console-styled messages read cleanly in
/// the log file.
///
/// A CSI sequence (`ESC [` ... final byte in `@`..=`~`) is dropped whole;
/// any other escape drops itself and the character after it.
pub(super) fn strip_ansi(s: &str) -> String {
    let mut parts = s.split('\x1b');
    let mut out = parts.next().unwrap_or_default().to_string();
    for part in parts {
        let mut chars = part.chars();
        match chars.next() {
            Some('[') => {
                let rest = chars
                    .as_str()
                    .split_once(|c: char| ('@'..='~').contains(&c))
                    .map_or("", |(_, rest)| rest);
                out.push_str(rest);
            }
            Some(_) => out.push_str(chars.as_str()),
            None => {}
        }
    }
    out
}

/// Directory holding per-command log files: `$XDG_CACHE_HOME/carthage`,
/// falling back to `~/.cache/carthage`.
pub(super) fn log_dir() -> PathBuf {
    let cache = std::env::var_os("XDG_CACHE_HOME").map_or_else(
        || {
            std::env::var_os("HOME")
                .or_else(|| std::env::var_os("USERPROFILE"))
                .map_or_else(|| PathBuf::from("."), PathBuf::from)
                .join(".cache")
        },
        PathBuf::from,
    );
    cache.join("carthage")
}

/// Log file for one subcommand, e.g. `apply.log`.
pub(super) fn log_file_path(command: &str) -> PathBuf {
    log_dir().join(format!("{command}.log"))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn strip_ansi_removes_colors() {
        assert_eq!(strip_ansi("\x1b[31mERROR\x1b[0m conf: boom"), "ERROR conf: boom");
        assert_eq!(strip_ansi("\x1b[1;34m==>\x1b[0m \x1b[1mPlanning\x1b[0m"), "==> Planning");
        assert_eq!(strip_ansi("no codes here"), "no codes here");
    }

    #[test]
    fn strip_ansi_handles_other_escapes() {
        assert_eq!(strip_ansi("\x1b[2Jhello"), "hello");
        assert_eq!(strip_ansi("\x1bMtext"), "text");
        assert_eq!(strip_ansi("cut\x1b[31"), "cut");
        assert_eq!(strip_ansi("tail\x1b"), "tail");
    }

    #[test]
    fn strip_ansi_keeps_tree_glyphs() {
        assert_eq!(strip_ansi("  │ └─c ✓"), "  │ └─c ✓");
    }

    #[test]
    fn log_file_is_named_after_command() {
        let path = log_file_path("apply");
        assert!(path.ends_with("carthage/apply.log"));
    }
}
