//! Turns rendered names into filenames every supported filesystem accepts.

use crate::constants::MAX_FILENAME_LENGTH;
use crate::constants::filesystem::{
    DARWIN_BLACKLIST, UNIX_BLACKLIST, WINDOWS_BLACKLIST, WINDOWS_RESERVED_NAMES,
};
use regex::Regex;

/// Splits a filename into base and extension using a configurable rule.
#[derive(Debug, Clone)]
pub struct ExtensionPattern {
    regex: Regex,
}

impl ExtensionPattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    /// Returns `(base, extension)`; the extension is empty when the rule does
    /// not match. `base + extension` always equals the input.
    #[must_use]
    pub fn split<'a>(&self, filename: &'a str) -> (&'a str, &'a str) {
        match self.regex.find(filename) {
            Some(m) => filename.split_at(m.start()),
            None => (filename, ""),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Darwin,
    Unix,
}

impl Platform {
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::Darwin
        } else {
            Self::Unix
        }
    }

    const fn blacklist(self) -> &'static str {
        match self {
            Self::Windows => WINDOWS_BLACKLIST,
            Self::Darwin => DARWIN_BLACKLIST,
            Self::Unix => UNIX_BLACKLIST,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SanitizeOptions {
    pub normalize_unicode: bool,
    pub windows_safe: bool,
    pub custom_blacklist: String,
    pub replace_with: String,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            normalize_unicode: false,
            windows_safe: false,
            custom_blacklist: String::new(),
            replace_with: "_".to_string(),
        }
    }
}

/// Sanitises `name` for the host filesystem.
#[must_use]
pub fn make_valid_filename(
    name: &str,
    extension: &ExtensionPattern,
    options: &SanitizeOptions,
) -> String {
    make_valid_filename_for(Platform::current(), name, extension, options)
}

/// Sanitises `name` as if running on `platform`. `windows_safe` forces
/// Windows rules regardless of `platform`.
#[must_use]
pub fn make_valid_filename_for(
    platform: Platform,
    name: &str,
    extension: &ExtensionPattern,
    options: &SanitizeOptions,
) -> String {
    let platform = if options.windows_safe {
        Platform::Windows
    } else {
        platform
    };

    let name = if name.starts_with('.') {
        format!("_{name}")
    } else {
        name.to_string()
    };

    let (base, ext) = extension.split(&name);
    let mut ext = ext.to_string();

    let mut base: String = base
        .chars()
        .filter(|&c| c != '\0')
        .map(|c| {
            if platform.blacklist().contains(c) || options.custom_blacklist.contains(c) {
                options.replace_with.clone()
            } else {
                c.to_string()
            }
        })
        .collect();

    base.truncate(base.trim_end().len());

    if platform == Platform::Windows
        && WINDOWS_RESERVED_NAMES
            .iter()
            .any(|reserved| reserved.eq_ignore_ascii_case(&base))
    {
        base.insert(0, '_');
    }

    if options.normalize_unicode {
        base = deunicode::deunicode_with_tofu(&base, "");
    }

    let base_len = base.chars().count();
    let ext_len = ext.chars().count();
    if base_len + ext_len > MAX_FILENAME_LENGTH {
        if ext_len > base_len {
            ext = ext
                .chars()
                .take(MAX_FILENAME_LENGTH.saturating_sub(base_len))
                .collect();
        } else {
            base = base
                .chars()
                .take(MAX_FILENAME_LENGTH.saturating_sub(ext_len))
                .collect();
        }
    }

    base + &ext
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_EXTENSION_PATTERN;

    fn ext() -> ExtensionPattern {
        ExtensionPattern::new(DEFAULT_EXTENSION_PATTERN).unwrap()
    }

    fn clean(platform: Platform, name: &str) -> String {
        make_valid_filename_for(platform, name, &ext(), &SanitizeOptions::default())
    }

    #[test]
    fn test_split_extension() {
        let pattern = ext();
        assert_eq!(pattern.split("show.s01e01.avi"), ("show.s01e01", ".avi"));
        assert_eq!(pattern.split("no extension"), ("no extension", ""));
    }

    #[test]
    fn test_hidden_file_prefixed() {
        assert_eq!(clean(Platform::Unix, ".hidden.avi"), "_.hidden.avi");
    }

    #[test]
    fn test_platform_blacklists() {
        assert_eq!(clean(Platform::Unix, "a/b:c.avi"), "a_b:c.avi");
        assert_eq!(clean(Platform::Darwin, "a/b:c.avi"), "a_b_c.avi");
        assert_eq!(clean(Platform::Windows, "a?b*c<d>.avi"), "a_b_c_d_.avi");
    }

    #[test]
    fn test_windows_safe_forces_windows_rules() {
        let options = SanitizeOptions {
            windows_safe: true,
            ..SanitizeOptions::default()
        };
        assert_eq!(
            make_valid_filename_for(Platform::Unix, "what?.avi", &ext(), &options),
            "what_.avi"
        );
    }

    #[test]
    fn test_custom_blacklist_and_replacement() {
        let options = SanitizeOptions {
            custom_blacklist: ".".to_string(),
            ..SanitizeOptions::default()
        };
        assert_eq!(
            make_valid_filename_for(Platform::Unix, "T.est.avi", &ext(), &options),
            "T_est.avi"
        );

        let options = SanitizeOptions {
            custom_blacklist: "e".to_string(),
            replace_with: "+".to_string(),
            ..SanitizeOptions::default()
        };
        assert_eq!(
            make_valid_filename_for(Platform::Unix, "Test.avi", &ext(), &options),
            "T+st.avi"
        );
    }

    #[test]
    fn test_nul_and_trailing_whitespace() {
        assert_eq!(clean(Platform::Unix, "te\0st   .avi"), "test.avi");
    }

    #[test]
    fn test_reserved_device_names() {
        assert_eq!(clean(Platform::Windows, "con.avi"), "_con.avi");
        assert_eq!(clean(Platform::Windows, "LPT1"), "_LPT1");
        assert_eq!(clean(Platform::Unix, "con.avi"), "con.avi");
    }

    #[test]
    fn test_unicode_folding() {
        let options = SanitizeOptions {
            normalize_unicode: true,
            ..SanitizeOptions::default()
        };
        assert_eq!(
            make_valid_filename_for(Platform::Unix, "Carnivàle.avi", &ext(), &options),
            "Carnivale.avi"
        );
    }

    #[test]
    fn test_truncates_base_first() {
        let long = format!("{}.avi", "a".repeat(300));
        let out = clean(Platform::Unix, &long);
        assert_eq!(out.chars().count(), MAX_FILENAME_LENGTH);
        assert!(out.ends_with(".avi"));
    }

    #[test]
    fn test_truncates_extension_when_longer() {
        let long = format!("a.{}", "b".repeat(300));
        let out = clean(Platform::Unix, &long);
        assert_eq!(out.chars().count(), MAX_FILENAME_LENGTH);
        assert!(out.starts_with("a."));
    }
}
