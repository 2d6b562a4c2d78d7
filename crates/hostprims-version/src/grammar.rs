//! Grammars for the text printed by each family's version command.
//!
//! Pure functions: raw command output in, normalized version out.

use std::sync::OnceLock;

use regex::Regex;

/// `<name> <build> ... [... X.Y.Z...]`, e.g. `Microsoft Windows [Version 10.0.19045.3803]`.
fn windows_ver_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:[\w ]+) (?:[\w.]+) .*\[.* ([0-9.]+)\]$").expect("windows ver regex")
    })
}

/// `X.Y.Z-<suffix>`, e.g. `5.15.0-76-generic`.
fn linux_release_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([0-9]+\.[0-9]+\.[0-9]+)-.*").expect("linux release regex"))
}

/// Parse the output of `cmd /c ver`.
///
/// Keeps exactly the first three components of the bracketed version.
/// Returns `None` when the output does not match or has fewer than three
/// components.
pub fn parse_windows_ver(output: &str) -> Option<String> {
    let caps = windows_ver_regex().captures(output.trim())?;
    let full = caps.get(1)?.as_str();

    let parts: Vec<&str> = full.split('.').take(3).collect();
    if parts.len() < 3 || parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    Some(parts.join("."))
}

/// Parse the output of `sw_vers -productVersion`. Trimmed, never reformatted.
pub fn parse_macos_product_version(output: &str) -> Option<String> {
    let version = output.trim();
    if version.is_empty() {
        None
    } else {
        Some(version.to_string())
    }
}

/// Parse the output of `uname -r`.
///
/// Only the dotted triple directly followed by a hyphen counts; a bare
/// `5.15.0` does not match.
pub fn parse_linux_release(output: &str) -> Option<String> {
    linux_release_regex()
        .captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_ver_bracketed_version() {
        assert_eq!(
            parse_windows_ver("Microsoft Windows [Version 10.0.19041]").as_deref(),
            Some("10.0.19041")
        );
    }

    #[test]
    fn windows_ver_keeps_first_three_components() {
        assert_eq!(
            parse_windows_ver("\r\nMicrosoft Windows [Version 10.0.19045.3803]\r\n").as_deref(),
            Some("10.0.19045")
        );
    }

    #[test]
    fn windows_ver_localized_label() {
        assert_eq!(
            parse_windows_ver("Microsoft Windows [Versión 10.0.22631.2861]").as_deref(),
            Some("10.0.22631")
        );
    }

    #[test]
    fn windows_ver_rejects_unstructured_output() {
        assert_eq!(parse_windows_ver(""), None);
        assert_eq!(parse_windows_ver("'ver' is not recognized"), None);
        assert_eq!(parse_windows_ver("Microsoft Windows [Version 10.0]"), None);
    }

    #[test]
    fn windows_ver_requires_ascii_digits() {
        assert_eq!(
            parse_windows_ver("Microsoft Windows [Version \u{0661}\u{0660}.0.19041]"),
            None
        );
    }

    #[test]
    fn macos_trims_only() {
        assert_eq!(
            parse_macos_product_version("12.4\n").as_deref(),
            Some("12.4")
        );
        assert_eq!(
            parse_macos_product_version("  14.2.1  ").as_deref(),
            Some("14.2.1")
        );
        assert_eq!(parse_macos_product_version(" \n"), None);
    }

    #[test]
    fn linux_release_prefix_before_hyphen() {
        assert_eq!(
            parse_linux_release("5.15.0-76-generic").as_deref(),
            Some("5.15.0")
        );
        assert_eq!(
            parse_linux_release("6.8.0-1-amd64\n").as_deref(),
            Some("6.8.0")
        );
    }

    #[test]
    fn linux_release_without_suffix_is_none() {
        assert_eq!(parse_linux_release("5.15.0"), None);
        assert_eq!(parse_linux_release(""), None);
    }
}
