//! Split long markdown into size-bounded chunks.
//!
//! Lines are packed greedily. A line longer than the limit is packed word
//! by word instead, and a single word longer than the limit is cut to the
//! limit (the tail is dropped). Sizes are in characters.

/// Every returned chunk has at most `max_chars` characters. Text that
/// already fits comes back as a single chunk.
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    if char_len(text) <= max_chars {
        return vec![text.to_string()];
    }

    let mut acc = Accumulator::new(max_chars);
    for line in text.split('\n') {
        if char_len(line) <= max_chars {
            acc.push(line, '\n');
            continue;
        }
        acc.flush();
        for word in line.split(' ') {
            if char_len(word) <= max_chars {
                acc.push(word, ' ');
            } else {
                acc.flush();
                acc.emit(word.chars().take(max_chars).collect());
            }
        }
        acc.flush();
    }
    acc.finish()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

struct Accumulator {
    max_chars: usize,
    current: Option<(String, usize)>,
    chunks: Vec<String>,
}

impl Accumulator {
    fn new(max_chars: usize) -> Self {
        Self {
            max_chars,
            current: None,
            chunks: Vec::new(),
        }
    }

    /// Append `piece` to the open chunk joined by `sep`, or start a new
    /// chunk when it would not fit.
    fn push(&mut self, piece: &str, sep: char) {
        let piece_len = char_len(piece);
        match &mut self.current {
            Some((buf, len)) if *len + 1 + piece_len <= self.max_chars => {
                buf.push(sep);
                buf.push_str(piece);
                *len += 1 + piece_len;
            }
            _ => {
                self.flush();
                self.current = Some((piece.to_string(), piece_len));
            }
        }
    }

    fn flush(&mut self) {
        if let Some((buf, _)) = self.current.take() {
            self.chunks.push(buf);
        }
    }

    fn emit(&mut self, chunk: String) {
        self.chunks.push(chunk);
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_short_text_single_chunk() {
        assert_eq!(split_message("hello", 10), vec!["hello"]);
        let exact = "x".repeat(10);
        assert_eq!(split_message(&exact, 10), vec![exact.clone()]);
        assert_eq!(split_message("", 10), vec![""]);
    }

    #[test]
    fn test_lines_packed_and_lossless() {
        let text = "line one\nline two\nline three\n\nline five";
        let chunks = split_message(text, 18);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= 18));
        assert_eq!(chunks.join("\n"), text);
        assert_eq!(chunks[0], "line one\nline two");
    }

    fn random_text(rng: &mut StdRng, max_line: usize) -> String {
        const WORDS: &[&str] = &["fix", "é", "refactor", "-", "", "parser", "日本", "x"];
        let lines = rng.gen_range(0..30);
        let mut out = Vec::with_capacity(lines);
        for _ in 0..lines {
            let mut line = String::new();
            for _ in 0..rng.gen_range(0..12) {
                let word = WORDS[rng.gen_range(0..WORDS.len())];
                let next = if line.is_empty() { word.to_string() } else { format!("{line} {word}") };
                if next.chars().count() > max_line {
                    break;
                }
                line = next;
            }
            out.push(line);
        }
        out.join("\n")
    }

    #[test]
    fn test_generated_inputs_bounded_and_lossless() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..2_000 {
            let max = rng.gen_range(1..60);
            let text = random_text(&mut rng, max);
            let chunks = split_message(&text, max);
            assert!(chunks.iter().all(|c| c.chars().count() <= max), "{text:?} / {max}");
            assert_eq!(chunks.join("\n"), text, "max {max}");
        }
    }

    #[test]
    fn test_generated_long_lines_stay_bounded() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1_000 {
            let max = rng.gen_range(1..40);
            let text = random_text(&mut rng, max * 4);
            let chunks = split_message(&text, max);
            assert!(!chunks.is_empty());
            assert!(chunks.iter().all(|c| c.chars().count() <= max), "{text:?} / {max}");
        }
    }

    #[test]
    fn test_long_line_split_on_spaces() {
        let text = "alpha beta gamma delta epsilon";
        let chunks = split_message(text, 12);
        assert_eq!(chunks, vec!["alpha beta", "gamma delta", "epsilon"]);
    }

    #[test]
    fn test_oversized_word_truncated() {
        let word = "a".repeat(25);
        let text = format!("short\n{} tail", word);
        let chunks = split_message(&text, 10);
        assert_eq!(chunks, vec!["short".to_string(), "a".repeat(10), "tail".to_string()]);
    }

    #[test]
    fn test_bound_holds_for_markdown_summary() {
        let mut text = String::new();
        for i in 0..200 {
            text.push_str(&format!("- bullet {} with some words about a change\n", i));
        }
        text.push_str(&"word ".repeat(1_000));
        let chunks = split_message(&text, 2900);
        assert!(chunks.len() > 2);
        assert!(chunks.iter().all(|c| c.chars().count() <= 2900));
    }

    #[test]
    fn test_multibyte_counted_in_chars() {
        let text = "é".repeat(8);
        assert_eq!(split_message(&text, 8).len(), 1);
        let chunks = split_message(&"é".repeat(12), 8);
        assert_eq!(chunks, vec!["é".repeat(8)]);
    }
}
