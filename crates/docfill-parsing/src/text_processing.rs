use once_cell::sync::Lazy;
use regex::Regex;

/// Expand common typographic ligatures found in PDFs.
pub fn expand_ligatures(text: &str) -> String {
    text.replace('\u{FB00}', "ff")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl")
        .replace(['\u{FB05}', '\u{FB06}'], "st")
}

/// Layout profile, used by the anchored-pattern extractors.
///
/// Line endings and form feeds become `\n`, non-breaking spaces become plain
/// spaces, ligatures are expanded and trailing whitespace is trimmed from
/// every line. Line boundaries and blank lines are preserved, since several
/// patterns key on them.
pub fn for_layout(text: &str) -> String {
    let text = text
        .replace("\r\n", "\n")
        .replace(['\r', '\u{000C}'], "\n")
        .replace(['\u{00A0}', '\u{202F}'], " ");
    let text = expand_ligatures(&text);

    text.split('\n')
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Search profile, used by the fuzzy line locator.
///
/// Each line has its whitespace runs collapsed to one space; blank lines are
/// dropped.
pub fn for_search(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collapse every whitespace run, newlines included, to one space.
pub fn flatten(text: &str) -> String {
    static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
    WS_RE.replace_all(text.trim(), " ").into_owned()
}

/// Group 1 of the first match of `re`, trimmed. Empty captures count as absent.
pub(crate) fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|v| !v.is_empty())
}
