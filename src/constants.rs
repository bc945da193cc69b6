pub const MAX_FILENAME_LENGTH: usize = 254;

pub const DEFAULT_EXTENSION_PATTERN: &str = r"(\.[a-zA-Z0-9]+)$";

pub const CONFIG_DIR_NAME: &str = "renamarr";

pub mod parsing {

    /// Ranges spanning more than this many episodes are treated as a
    /// misdetection (usually a resolution or year) and collapse to the start.
    pub const EPISODE_RANGE_LIMIT: i64 = 5;

    /// Two-digit years below this pivot are 20xx, the rest 19xx.
    pub const TWO_DIGIT_YEAR_PIVOT: i32 = 50;
}

pub mod filesystem {

    pub const WINDOWS_BLACKLIST: &str = "\\/:*?\"<>|";

    pub const DARWIN_BLACKLIST: &str = "/:";

    pub const UNIX_BLACKLIST: &str = "/";

    pub const WINDOWS_RESERVED_NAMES: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6",
        "COM7", "COM8", "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8",
        "LPT9",
    ];
}

pub mod metadata {
    use std::time::Duration;

    pub const TVMAZE_API: &str = "https://api.tvmaze.com";

    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub const USER_AGENT: &str = concat!("renamarr/", env!("CARGO_PKG_VERSION"));
}
