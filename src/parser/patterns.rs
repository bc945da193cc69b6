//! The built-in filename patterns, most specific first.
//!
//! Patterns are written in the regex crate's extended syntax: whitespace is
//! insignificant (literal spaces are spelled `\x20`), and a match must start at
//! the beginning of the filename. Recognised groups are `seriesname`,
//! `seasonnumber`, `episodenumber`, `episodenumber1..N`,
//! `episodenumberstart`/`episodenumberend`, `year`/`month`/`day`, `group` and
//! `crc`.

use regex::{Regex, RegexBuilder};

const DEFAULT_PATTERNS: &[&str] = &[
    // [group] Show - 01-02 [crc].ext
    r"\[(?P<group>.+?)\]\x20?
    (?P<seriesname>.*?)\x20?[-_]\x20?
    (?P<episodenumberstart>\d+)
    (?:[-_]\d+)*
    [-_](?P<episodenumberend>\d+)
    (?:.*\[(?P<crc>.+?)\])?
    [^/]*$",
    // [group] Show - 01 [crc].ext
    r"\[(?P<group>.+?)\]\x20?
    (?P<seriesname>.*)
    \x20?[-_]\x20?
    (?P<episodenumber>\d+)
    (?:.*\[(?P<crc>.+?)\])?
    [^/]*$",
    // show.s01e23.s01e24
    r"(?:(?P<seriesname>.+?)[\x20._\-])?
    [Ss](?P<seasonnumber>[0-9]+)
    [.\-\x20]?
    [Ee](?P<episodenumberstart>[0-9]+)
    (?:[.\-\x20]+[Ss][0-9]+[.\-\x20]?[Ee][0-9]+)*
    [.\-\x20]+[Ss][0-9]+[.\-\x20]?[Ee](?P<episodenumberend>[0-9]+)
    [^/]*$",
    // show.s01e23e24
    r"(?:(?P<seriesname>.+?)[\x20._\-])?
    [Ss](?P<seasonnumber>[0-9]+)
    [.\-\x20]?
    [Ee](?P<episodenumberstart>[0-9]+)
    (?:[.\-\x20]?[Ee][0-9]+)*
    [.\-\x20]?[Ee](?P<episodenumberend>[0-9]+)
    [^/]*$",
    // show.1x23.1x24
    r"(?:(?P<seriesname>.+?)[\x20._\-])?
    (?P<seasonnumber>[0-9]+)
    [xX](?P<episodenumberstart>[0-9]+)
    (?:[\x20._\-]+[0-9]+[xX][0-9]+)*
    [\x20._\-]+[0-9]+[xX](?P<episodenumberend>[0-9]+)
    [^/]*$",
    // show.1x23x24
    r"(?:(?P<seriesname>.+?)[\x20._\-])?
    (?P<seasonnumber>[0-9]+)
    [xX](?P<episodenumberstart>[0-9]+)
    (?:[xX][0-9]+)*
    [xX](?P<episodenumberend>[0-9]+)
    [^/]*$",
    // show.s01e23-24
    r"(?:(?P<seriesname>.+?)[\x20._\-])?
    [Ss](?P<seasonnumber>[0-9]+)
    [.\-\x20]?
    [Ee](?P<episodenumberstart>[0-9]+)
    (?:-[Ee]?[0-9]+)*
    -[Ee]?(?P<episodenumberend>[0-9]+)
    [.\-\x20]
    [^/]*$",
    // show.1x23-24
    r"(?:(?P<seriesname>.+?)[\x20._\-])?
    (?P<seasonnumber>[0-9]+)
    [xX](?P<episodenumberstart>[0-9]+)
    (?:[\-+][0-9]+)*
    [\-+](?P<episodenumberend>[0-9]+)
    (?:[.\-+\x20].*|$)",
    // show.[1x09-11]
    r"(?P<seriesname>.+?)[\x20._\-]
    \[?
    (?P<seasonnumber>[0-9]+)
    [xX]
    (?P<episodenumberstart>[0-9]+)
    (?:[\-+][0-9]+)*
    [\-+]
    (?P<episodenumberend>[0-9]+)
    \]
    [^/]*$",
    // show - [012]
    r"(?:(?P<seriesname>.+?)[\x20._\-])?
    \[
    (?P<episodenumber>[0-9]+)
    \]
    [^/]*$",
    // show.s0101
    r"(?P<seriesname>.+?)[\x20._\-]
    [Ss](?P<seasonnumber>[0-9]{2})
    [.\-\x20]?
    (?P<episodenumber>[0-9]{2})
    [^0-9]*$",
    // show.1x09
    r"(?:(?P<seriesname>.+?)[\x20._\-])?
    \[?
    (?P<seasonnumber>[0-9]+)
    [xX]
    (?P<episodenumber>[0-9]+)
    \]?
    [^/]*$",
    // show.s01.e01, show.s01_e01
    r"(?:(?P<seriesname>.+?)[\x20._\-])?
    \[?
    [Ss](?P<seasonnumber>[0-9]+)\x20?[._\-\x20]?\x20?
    [Ee]?(?P<episodenumber>[0-9]+)
    \]?
    [^/]*$",
    // show.2010.01.02
    r"(?:(?P<seriesname>.+?)[\x20._\-])?
    (?P<year>\d{4})
    [\x20._\-]
    (?P<month>\d{2})
    [\x20._\-]
    (?P<day>\d{2})
    [^/]*$",
    // show - [01.09]
    r"(?P<seriesname>.+?)
    [\x20._\-]?
    \[
    (?P<seasonnumber>[0-9]+?)
    [.]
    (?P<episodenumber>[0-9]+?)
    \]
    [\x20._\-]?
    [^/]*$",
    // show - S2 E 02
    r"(?P<seriesname>.+?)\x20?[\x20._\-]\x20?
    [Ss](?P<seasonnumber>[0-9]+)[.\-\x20]?
    [Ee]?\x20?(?P<episodenumber>[0-9]+)
    [^/]*$",
    // show - Episode 9999 [S 12 - Ep 131]
    r"(?P<seriesname>.+)
    \x20-\x20
    [Ee]pisode\x20\d+
    \x20
    \[
    [sS]\x20?(?P<seasonnumber>\d+)
    (?:\x20|\x20-\x20|-)
    (?:[eE]|[eE]p)\x20?(?P<episodenumber>\d+)
    \]
    .*$",
    // show name 2 of 6
    r"(?P<seriesname>.+?)
    [\x20._\-]
    (?P<episodenumber>[0-9]+)
    of
    [\x20._\-]?
    \d+
    (?:[._\x20-]|$|[^/]*$)",
    // show.part.1.and.part.2
    r"(?i)
    (?P<seriesname>.+?)
    [\x20._\-]
    (?:part|pt)?[._\x20-]
    (?P<episodenumberstart>[0-9]+)
    (?:
        [\x20._-](?:and|&|to)
        [\x20._-](?:part|pt)?
        [\x20._-](?:[0-9]+)
    )*
    [\x20._-](?:and|&|to)
    [\x20._-]?(?:part|pt)?
    [\x20._-](?P<episodenumberend>[0-9]+)
    [._\x20-][^/]*$",
    // show.part1
    r"(?P<seriesname>.+?)
    [\x20._\-]
    [Pp]art\x20(?P<episodenumber>[0-9]+)
    [._\x20-][^/]*$",
    // show Season 01 Episode 20
    r"(?P<seriesname>.+?)\x20?
    [Ss]eason\x20?(?P<seasonnumber>[0-9]+)\x20?
    [Ee]pisode\x20?(?P<episodenumber>[0-9]+)
    [^/]*$",
    // show.103
    r"(?P<seriesname>.+)[\x20._\-]
    (?P<seasonnumber>[0-9])
    (?P<episodenumber>[0-9]{2})
    [._\x20-][^/]*$",
    // show.0103
    r"(?P<seriesname>.+)[\x20._\-]
    (?P<seasonnumber>[0-9]{2})
    (?P<episodenumber>[0-9]{2,3})
    [._\x20-][^/]*$",
    // show.e123
    r"(?P<seriesname>.+?)
    [\x20._\-]
    [Ee](?P<episodenumber>[0-9]+)
    [._\x20-][^/]*$",
];

#[must_use]
pub fn default_patterns() -> Vec<String> {
    DEFAULT_PATTERNS.iter().map(|p| (*p).to_string()).collect()
}

/// Compiles a filename pattern in extended syntax, anchored at the start.
pub fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(&format!("^(?:{pattern}\n)"))
        .ignore_whitespace(true)
        .build()
}
