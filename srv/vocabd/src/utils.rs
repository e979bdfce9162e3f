use crate::models::WordEntry;

/// Wrap a signed offset from `index` into `[0, len)`
pub fn wrap_index(index: usize, offset: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let len = len as isize;
    (((index as isize + offset) % len + len) % len) as usize
}

/// Indices within `radius` of `center` on a circular list, nearest first.
/// Each index appears once even when the list is shorter than the window.
pub fn neighborhood(center: usize, radius: usize, len: usize) -> Vec<usize> {
    let mut out = Vec::new();
    if len == 0 {
        return out;
    }
    out.push(center % len);
    for step in 1..=radius as isize {
        for offset in [step, -step] {
            let idx = wrap_index(center, offset, len);
            if !out.contains(&idx) {
                out.push(idx);
            }
        }
    }
    out
}

/// Circular distance between two positions in a list of `len`
pub fn circular_distance(a: usize, b: usize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let d = a.abs_diff(b) % len;
    d.min(len - d)
}

/// Case-insensitive substring search over the word list
pub fn search_words<'a>(words: &'a [WordEntry], query: &str) -> Vec<&'a WordEntry> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }
    words
        .iter()
        .filter(|w| w.word.to_lowercase().contains(&query))
        .collect()
}

/// First letter of a word, lowercased, if it is alphabetic
pub fn initial_letter(word: &str) -> Option<char> {
    word.chars()
        .next()
        .filter(|c| c.is_alphabetic())
        .and_then(|c| c.to_lowercase().next())
}

/// Parse a letter query such as `a` or `B`
pub fn parse_letter(text: &str) -> Option<char> {
    let mut chars = text.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_alphabetic() => c.to_lowercase().next(),
        _ => None,
    }
}

/// Entries starting with `letter`, in their current order
pub fn words_by_letter(words: &[WordEntry], letter: char) -> Vec<&WordEntry> {
    words
        .iter()
        .filter(|w| initial_letter(&w.word) == Some(letter))
        .collect()
}

/// Sorted, distinct initial letters present in the word list
pub fn available_letters(words: &[WordEntry]) -> Vec<char> {
    let mut letters: Vec<char> = words.iter().filter_map(|w| initial_letter(&w.word)).collect();
    letters.sort_unstable();
    letters.dedup();
    letters
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, rank: u32) -> WordEntry {
        WordEntry {
            word: text.to_string(),
            rank,
            freq: 1.0,
            part_of_speech: None,
            word_audio_file: vec![format!("{}.mp3", text)],
            back_cards: vec![],
            sentence_audio_file: vec![],
        }
    }

    #[test]
    fn test_wrap_index() {
        assert_eq!(wrap_index(0, -1, 3), 2);
        assert_eq!(wrap_index(2, 1, 3), 0);
        assert_eq!(wrap_index(1, 7, 3), 2);
        assert_eq!(wrap_index(5, 1, 0), 0);
    }

    #[test]
    fn test_neighborhood_order() {
        assert_eq!(neighborhood(5, 2, 10), vec![5, 6, 4, 7, 3]);
        assert_eq!(neighborhood(0, 2, 10), vec![0, 1, 9, 2, 8]);
    }

    #[test]
    fn test_neighborhood_short_list() {
        assert_eq!(neighborhood(0, 2, 2), vec![0, 1]);
        assert_eq!(neighborhood(0, 2, 1), vec![0]);
        assert!(neighborhood(0, 2, 0).is_empty());
    }

    #[test]
    fn test_circular_distance() {
        assert_eq!(circular_distance(0, 9, 10), 1);
        assert_eq!(circular_distance(2, 5, 10), 3);
        assert_eq!(circular_distance(4, 4, 10), 0);
    }

    #[test]
    fn test_search_words() {
        let words = vec![word("Apple", 1), word("pineapple", 2), word("pear", 3)];
        let found: Vec<_> = search_words(&words, "APPLE").iter().map(|w| w.rank).collect();
        assert_eq!(found, vec![1, 2]);
        assert!(search_words(&words, "  ").is_empty());
        assert!(search_words(&words, "kiwi").is_empty());
    }

    #[test]
    fn test_letters() {
        let words = vec![word("Apple", 1), word("banana", 2), word("avocado", 3), word("42nd", 4)];
        assert_eq!(available_letters(&words), vec!['a', 'b']);
        let ranks: Vec<u32> = words_by_letter(&words, 'a').iter().map(|w| w.rank).collect();
        assert_eq!(ranks, vec![1, 3]);
        assert!(words_by_letter(&words, 'z').is_empty());
    }

    #[test]
    fn test_parse_letter() {
        assert_eq!(parse_letter("B"), Some('b'));
        assert_eq!(parse_letter(" a "), Some('a'));
        assert_eq!(parse_letter("ab"), None);
        assert_eq!(parse_letter("7"), None);
        assert_eq!(parse_letter(""), None);
    }
}
