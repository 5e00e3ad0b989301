//! Fuzzy line location for labels in noisy OCR text.
//!
//! OCR output rarely reproduces a label character-for-character, so fields on
//! ID cards and bank statements are found by partial similarity instead of an
//! anchored pattern. Scores are on a 0–100 scale.

/// Default minimum score a line must exceed to count as a match.
pub const DEFAULT_THRESHOLD: f64 = 80.0;

fn ratio(a: &[char], b: &[char]) -> f64 {
    rapidfuzz::fuzz::ratio(a.iter().copied(), b.iter().copied())
}

/// Best similarity between the shorter string and any same-length window of
/// the longer one, scaled to 0–100.
///
/// Windows that run off either edge of the longer string are scored too, so a
/// label cut off at the start or end of a line still registers.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    if shorter.is_empty() {
        return 0.0;
    }

    let m = shorter.len();
    let n = longer.len();
    let mut best: f64 = 0.0;

    for end in 1..m.min(n) {
        best = best.max(ratio(&shorter, &longer[..end]));
    }
    for start in 0..=(n - m) {
        best = best.max(ratio(&shorter, &longer[start..start + m]));
        if best >= 1.0 {
            return 100.0;
        }
    }
    for start in (n - m + 1)..n {
        best = best.max(ratio(&shorter, &longer[start..]));
    }

    best * 100.0
}

/// Score `line` against `label`, sliding the label across the line.
///
/// A line shorter than the label is compared whole, so a stray OCR fragment
/// that happens to occur inside the label does not score as a perfect hit.
pub fn label_score(line: &str, label: &str) -> f64 {
    if line.chars().count() < label.chars().count() {
        let line: Vec<char> = line.chars().collect();
        let label: Vec<char> = label.chars().collect();
        return ratio(&line, &label) * 100.0;
    }
    partial_ratio(line, label)
}

/// Find the line of `text` that best matches `label`, case-insensitively.
///
/// Returns the first line achieving the maximum score, and only when that
/// score is strictly greater than `threshold`.
pub fn locate<'a>(text: &'a str, label: &str, threshold: f64) -> Option<&'a str> {
    let label = label.trim().to_lowercase();
    if label.is_empty() {
        return None;
    }

    let mut best: Option<(&str, f64)> = None;
    for line in text.split('\n') {
        let score = label_score(&line.to_lowercase(), &label);
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((line, score));
        }
    }

    best.filter(|(_, score)| *score > threshold)
        .map(|(line, _)| line)
}

/// Try each synonym in order and return the line for the first one that
/// clears the threshold.
pub fn locate_any<'a, S: AsRef<str>>(
    text: &'a str,
    labels: &[S],
    threshold: f64,
) -> Option<&'a str> {
    labels
        .iter()
        .find_map(|label| locate(text, label.as_ref(), threshold))
}

/// The part of a `Label : value` line after the first colon, or the whole
/// line when it has no colon.
pub fn value_after_colon(line: &str) -> &str {
    match line.split_once(':') {
        Some((_, value)) => value.trim(),
        None => line.trim(),
    }
}
