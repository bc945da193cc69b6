const SMALL_WORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "but", "by", "en", "for", "if", "in", "of", "on", "or", "the",
    "to", "v", "vs", "via",
];

/// Capitalises each lowercase word, leaving small words alone except at the
/// start and leaving words that already carry capitals or start with a
/// non-letter untouched.
#[must_use]
pub fn titlecase(text: &str) -> String {
    let mut seen_word = false;

    text.split(' ')
        .map(|word| {
            if word.is_empty() {
                return word.to_string();
            }
            let first = !seen_word;
            seen_word = true;
            capitalise_word(word, first)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalise_word(word: &str, first: bool) -> String {
    let mut chars = word.chars();
    let Some(head) = chars.next() else {
        return String::new();
    };

    if !head.is_lowercase() || word.chars().any(char::is_uppercase) {
        return word.to_string();
    }

    let bare = word.trim_end_matches(|c: char| !c.is_alphanumeric());
    if !first && SMALL_WORDS.contains(&bare) {
        return word.to_string();
    }

    head.to_uppercase().chain(chars).collect()
}
