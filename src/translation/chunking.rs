/*!
 * Splitting long text into translation-sized chunks.
 *
 * Text is cut only after sentence terminators (`. ! ?` and the full-width
 * `。！？`) that are followed by whitespace. Sentences are then packed
 * greedily into chunks of at most `max_chars` characters. A single sentence
 * longer than the budget is kept whole.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// A terminator followed by the whitespace run that ends the sentence
static SENTENCE_BOUNDARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[.!?\x{3002}\x{FF01}\x{FF1F}]\s+").unwrap()
});

/// Split text into sentence candidates
///
/// The terminator stays with its sentence and the whitespace after it is
/// dropped. Empty pieces are not returned.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for boundary in SENTENCE_BOUNDARY.find_iter(text) {
        let terminator_len = text[boundary.start()..]
            .chars()
            .next()
            .map_or(0, char::len_utf8);
        let sentence = &text[start..boundary.start() + terminator_len];
        if !sentence.is_empty() {
            sentences.push(sentence);
        }
        start = boundary.end();
    }

    if start < text.len() {
        sentences.push(&text[start..]);
    }

    sentences
}

/// Partition text into chunks of at most `max_chars` characters
///
/// Sentences inside a chunk are joined with a single space. Lengths are
/// counted in characters, not bytes.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut buffer = String::new();
    let mut buffer_len = 0;

    for sentence in split_sentences(text) {
        let sentence_len = sentence.chars().count();

        if buffer_len + sentence_len + 1 <= max_chars {
            let joined = format!("{} {}", buffer, sentence);
            buffer = joined.trim().to_string();
        } else {
            if !buffer.is_empty() {
                chunks.push(std::mem::take(&mut buffer));
            }
            buffer = sentence.to_string();
        }
        buffer_len = buffer.chars().count();
    }

    if !buffer.is_empty() {
        chunks.push(buffer);
    }

    chunks
}
