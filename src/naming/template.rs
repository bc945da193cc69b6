//! printf-style interpolation for filename and destination templates.
//!
//! Supports `%(field)s`, `%(field)d`, width/flag modifiers such as `%(field)02d`,
//! the bare positional form (`%02d`) used for single episode numbers, and `%%`.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Number(i64),
    Null,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Number(i64::from(value))
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Named values available to a template.
pub type FieldMap = BTreeMap<String, Value>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Template {template:?} references unknown field '{field}'")]
    UnknownField { field: String, template: String },

    #[error("Field '{field}' cannot be formatted as a number: {value:?}")]
    NotANumber { field: String, value: String },

    #[error("Malformed placeholder at offset {offset} in template {template:?}")]
    Malformed { offset: usize, template: String },
}

enum Args<'a> {
    Named(&'a FieldMap),
    Single(&'a Value),
}

/// Renders `template` against a map of named fields.
pub fn render(template: &str, fields: &FieldMap) -> Result<String, TemplateError> {
    interpolate(template, &Args::Named(fields))
}

/// Renders a template holding a single positional placeholder such as `%02d`.
pub fn render_single(template: &str, value: &Value) -> Result<String, TemplateError> {
    interpolate(template, &Args::Single(value))
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^%(?:\((?P<key>[^)]*)\))?(?P<flags>[-+ 0#]*)(?P<width>[0-9]*)(?:\.(?P<precision>[0-9]+))?(?P<conv>[sdir%])",
        )
        .expect("Invalid regex pattern defined in code")
    })
}

fn interpolate(template: &str, args: &Args<'_>) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let placeholder = &rest[pos..];
        let offset = template.len() - placeholder.len();

        let malformed = || TemplateError::Malformed {
            offset,
            template: template.to_string(),
        };

        let caps = placeholder_regex()
            .captures(placeholder)
            .ok_or_else(malformed)?;
        let consumed = caps.get(0).map_or(1, |m| m.end());

        if &caps["conv"] == "%" {
            out.push('%');
        } else {
            let key = caps.name("key").map(|m| m.as_str());
            let value = match (args, key) {
                (Args::Named(fields), Some(key)) => {
                    fields
                        .get(key)
                        .ok_or_else(|| TemplateError::UnknownField {
                            field: key.to_string(),
                            template: template.to_string(),
                        })?
                }
                (Args::Single(value), None) => *value,
                (Args::Single(_), Some(key)) => {
                    return Err(TemplateError::UnknownField {
                        field: key.to_string(),
                        template: template.to_string(),
                    });
                }
                (Args::Named(_), None) => return Err(malformed()),
            };

            let spec = FormatSpec::from_captures(&caps);
            out.push_str(&spec.apply(key.unwrap_or("0"), value)?);
        }

        rest = &placeholder[consumed..];
    }

    out.push_str(rest);
    Ok(out)
}

struct FormatSpec {
    left_align: bool,
    zero_pad: bool,
    sign: Option<char>,
    width: usize,
    precision: Option<usize>,
    numeric: bool,
}

impl FormatSpec {
    fn from_captures(caps: &regex::Captures<'_>) -> Self {
        let flags = caps.name("flags").map_or("", |m| m.as_str());
        let sign = if flags.contains('+') {
            Some('+')
        } else if flags.contains(' ') {
            Some(' ')
        } else {
            None
        };

        Self {
            left_align: flags.contains('-'),
            zero_pad: flags.contains('0'),
            sign,
            width: caps
                .name("width")
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0),
            precision: caps.name("precision").and_then(|m| m.as_str().parse().ok()),
            numeric: matches!(&caps["conv"], "d" | "i"),
        }
    }

    fn apply(&self, field: &str, value: &Value) -> Result<String, TemplateError> {
        if self.numeric {
            let number = match value {
                Value::Number(n) => *n,
                Value::Text(text) => {
                    text.trim()
                        .parse::<i64>()
                        .map_err(|_| TemplateError::NotANumber {
                            field: field.to_string(),
                            value: text.clone(),
                        })?
                }
                Value::Null => {
                    return Err(TemplateError::NotANumber {
                        field: field.to_string(),
                        value: "null".to_string(),
                    });
                }
            };
            Ok(self.format_number(number))
        } else {
            let mut text = match value {
                Value::Text(text) => text.clone(),
                Value::Number(n) => n.to_string(),
                Value::Null => String::new(),
            };
            if let Some(precision) = self.precision {
                text = text.chars().take(precision).collect();
            }
            Ok(self.pad(String::new(), text, ' '))
        }
    }

    fn format_number(&self, number: i64) -> String {
        let sign = if number < 0 {
            "-".to_string()
        } else {
            self.sign.map(String::from).unwrap_or_default()
        };

        let mut digits = number.unsigned_abs().to_string();
        if let Some(precision) = self.precision
            && digits.len() < precision
        {
            digits = format!("{}{digits}", "0".repeat(precision - digits.len()));
        }

        let fill = if self.zero_pad && !self.left_align {
            '0'
        } else {
            ' '
        };
        self.pad(sign, digits, fill)
    }

    fn pad(&self, prefix: String, body: String, fill: char) -> String {
        let len = prefix.chars().count() + body.chars().count();
        if len >= self.width {
            return prefix + &body;
        }

        let padding: String = std::iter::repeat_n(fill, self.width - len).collect();
        if self.left_align {
            prefix + &body + &padding
        } else if fill == '0' {
            prefix + &padding + &body
        } else {
            padding + &prefix + &body
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, Value)]) -> FieldMap {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_named_fields() {
        let map = fields(&[
            ("seriesname", Value::from("Scrubs")),
            ("seasonno", Value::from(1u32)),
            ("episode", Value::from("01")),
        ]);
        let out = render("%(seriesname)s - [%(seasonno)02dx%(episode)s]", &map).unwrap();
        assert_eq!(out, "Scrubs - [01x01]");
    }

    #[test]
    fn test_text_formatted_as_number() {
        let map = fields(&[("episode", Value::from("7"))]);
        assert_eq!(render("%(episode)02d", &map).unwrap(), "07");
    }

    #[test]
    fn test_positional_single_value() {
        assert_eq!(render_single("%02d", &Value::from(3u32)).unwrap(), "03");
        assert_eq!(render_single("%d", &Value::from(120u32)).unwrap(), "120");
        assert_eq!(render_single("E%03d", &Value::from(5u32)).unwrap(), "E005");
    }

    #[test]
    fn test_literal_percent() {
        let map = fields(&[("n", Value::from(50u32))]);
        assert_eq!(render("%(n)d%%", &map).unwrap(), "50%");
    }

    #[test]
    fn test_padding_and_alignment() {
        let map = fields(&[("x", Value::from("ab")), ("n", Value::from(-4i64))]);
        assert_eq!(render("[%(x)4s]", &map).unwrap(), "[  ab]");
        assert_eq!(render("[%(x)-4s]", &map).unwrap(), "[ab  ]");
        assert_eq!(render("[%(n)03d]", &map).unwrap(), "[-04]");
        assert_eq!(render("[%(x).1s]", &map).unwrap(), "[a]");
    }

    #[test]
    fn test_null_renders_empty() {
        let map = fields(&[("episodename", Value::Null)]);
        assert_eq!(render("<%(episodename)s>", &map).unwrap(), "<>");
        assert!(matches!(
            render("%(episodename)d", &map),
            Err(TemplateError::NotANumber { .. })
        ));
    }

    #[test]
    fn test_unknown_field_is_error() {
        let err = render("%(missing)s", &FieldMap::new()).unwrap_err();
        assert!(matches!(err, TemplateError::UnknownField { ref field, .. } if field == "missing"));
    }

    #[test]
    fn test_malformed_placeholder() {
        let map = fields(&[("a", Value::from("x"))]);
        assert!(matches!(
            render("%(a)q", &map),
            Err(TemplateError::Malformed { offset: 0, .. })
        ));
        assert!(matches!(
            render("abc %d", &map),
            Err(TemplateError::Malformed { offset: 4, .. })
        ));
    }
}
