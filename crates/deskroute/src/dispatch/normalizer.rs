/// Greeting and closing formulas carrying no routing signal.
///
/// Longer phrases come before the phrases they contain.
const BOILERPLATE_PHRASES: &[&str] = &[
    "to whom it may concern",
    "dear sir or madam",
    "dear sir",
    "dear madam",
    "respected sir",
    "respected madam",
    "i am writing to",
    "i would like to",
    "yours sincerely",
    "yours faithfully",
    "yours truly",
    "thanking you",
    "thank you",
    "with regards",
    "regards",
    "kindly",
    "please",
    "greetings",
    "hello",
];

/// Case-folds `text` and strips every boilerplate phrase.
///
/// Removal is literal substring removal, so a phrase inside a longer word goes too
/// ("hello" in "othello"). It repeats until nothing listed remains, which keeps
/// `normalize(normalize(x)) == normalize(x)`. Whitespace is left as is.
pub fn normalize(text: &str) -> String {
    let mut normalized = text.to_lowercase();

    loop {
        let mut changed = false;
        for phrase in BOILERPLATE_PHRASES {
            if normalized.contains(phrase) {
                normalized = normalized.replace(phrase, "");
                changed = true;
            }
        }

        if !changed {
            return normalized;
        }
    }
}
