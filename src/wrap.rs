/// Greedy word wrap. `measure` reports the rendered width of a candidate line in
/// whatever unit `max_width` uses (pixels for a canvas, columns for a terminal).
///
/// Words are never split: a word wider than `max_width` sits alone on its own,
/// overflowing line.
pub fn wrap<M, W>(text: &str, measure: M, max_width: W) -> Vec<String>
where
    M: Fn(&str) -> W,
    W: PartialOrd,
{
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{current} {word}");
        if measure(&candidate) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_owned()));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Character-count wrap for terminals and the wasm export.
pub fn wrap_chars(text: &str, max_chars: usize) -> Vec<String> {
    wrap(text, |s| s.chars().count(), max_chars)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words_of(lines: &[String]) -> Vec<String> {
        lines.join(" ").split(' ').map(str::to_owned).collect()
    }

    #[test]
    fn wraps_greedily() {
        let lines = wrap_chars("Why did the bicycle fall over? It was two-tired!", 16);
        assert_eq!(lines, vec!["Why did the", "bicycle fall", "over? It was", "two-tired!"]);
    }

    #[test]
    fn long_word_overflows_alone() {
        let lines = wrap_chars("a supercalifragilistic b", 5);
        assert_eq!(lines, vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn empty_and_whitespace_yield_no_lines() {
        assert!(wrap_chars("", 10).is_empty());
        assert!(wrap_chars("   \t ", 10).is_empty());
    }

    #[test]
    fn preserves_word_sequence_and_fits() {
        let text = "What do you call a boomerang that doesn't come back? A stick! \
                    Why don't eggs tell jokes? They'd crack each other up!";
        let original: Vec<String> = text.split_whitespace().map(str::to_owned).collect();
        for width in 1..60 {
            let lines = wrap_chars(text, width);
            assert_eq!(words_of(&lines), original, "width {width}");
            for line in &lines {
                let fits = line.chars().count() <= width;
                let single_word = !line.contains(' ');
                assert!(fits || single_word, "line {line:?} too wide at {width}");
            }
        }
    }

    #[test]
    fn uses_caller_measure() {
        // every char is 10 "pixels"
        let lines = wrap("ab cd ef", |s: &str| s.len() as f32 * 10.0, 50.0);
        assert_eq!(lines, vec!["ab cd", "ef"]);
    }
}
