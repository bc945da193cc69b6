use crate::config::ReplacementRule;
use crate::library::sanitize::ExtensionPattern;
use regex::Regex;

#[derive(Debug, Clone)]
enum Matcher {
    Literal(String),
    Pattern(Regex),
}

#[derive(Debug, Clone)]
struct CompiledRule {
    matcher: Matcher,
    replacement: String,
    with_extension: bool,
}

/// An ordered list of find/replace rules applied to filenames or paths.
///
/// Regex replacements use `$1` / `${name}` group references. Unless a rule sets
/// `with_extension`, the extension is split off before the rule runs and
/// reattached afterwards.
#[derive(Debug, Clone, Default)]
pub struct Replacements {
    rules: Vec<CompiledRule>,
}

impl Replacements {
    pub fn compile(rules: &[ReplacementRule]) -> Result<Self, regex::Error> {
        let rules = rules
            .iter()
            .map(|rule| {
                let matcher = if rule.is_regex {
                    Matcher::Pattern(Regex::new(&rule.pattern)?)
                } else {
                    Matcher::Literal(rule.pattern.clone())
                };
                Ok(CompiledRule {
                    matcher,
                    replacement: rule.replacement.clone(),
                    with_extension: rule.with_extension,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;

        Ok(Self { rules })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    #[must_use]
    pub fn apply(&self, text: &str, extension: &ExtensionPattern) -> String {
        let mut current = text.to_string();

        for rule in &self.rules {
            let (target, ext) = if rule.with_extension {
                (current.as_str(), "")
            } else {
                extension.split(&current)
            };

            let replaced = match &rule.matcher {
                Matcher::Literal(needle) if needle.is_empty() => target.to_string(),
                Matcher::Literal(needle) => target.replace(needle.as_str(), &rule.replacement),
                Matcher::Pattern(re) => re.replace_all(target, rule.replacement.as_str()).into_owned(),
            };

            current = replaced + ext;
        }

        current
    }
}
