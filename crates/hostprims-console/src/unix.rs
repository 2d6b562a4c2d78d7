//! Unix console setup: adopt a UTF-8 locale.

use std::ffi::CString;

use tracing::{debug, warn};

use crate::{CodePages, ConsoleGuard, UTF8_LOCALES};

pub fn setup_impl() -> ConsoleGuard {
    let locale = adopt_utf8_locale();
    ConsoleGuard {
        saved: None,
        locale,
    }
}

pub fn restore_impl(_pages: CodePages) {}

pub fn current_code_pages_impl() -> Option<CodePages> {
    None
}

fn adopt_utf8_locale() -> Option<&'static str> {
    for name in UTF8_LOCALES {
        let Ok(c_name) = CString::new(name) else {
            continue;
        };
        // SAFETY: c_name is a valid NUL-terminated string. setlocale copies it.
        let accepted = unsafe { !libc::setlocale(libc::LC_ALL, c_name.as_ptr()).is_null() };
        if accepted {
            debug!(locale = name, "Adopted UTF-8 locale");
            std::env::set_var("LC_ALL", name);
            return Some(name);
        }
    }
    warn!("No UTF-8 locale available; leaving locale unchanged");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn adopted_locale_is_exported() {
        let guard = setup_impl();
        if let Some(name) = guard.locale() {
            assert!(UTF8_LOCALES.contains(&name));
            assert_eq!(std::env::var("LC_ALL").as_deref(), Ok(name));
        }
    }

    #[test]
    fn no_code_pages_on_unix() {
        assert!(current_code_pages_impl().is_none());
    }
}
