use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::config::{AlignerConfig, CaseFolding, UnknownCharPolicy};
use crate::error::AlignmentError;
use crate::types::TokenSequence;

const ASCII_TABLE_LEN: usize = 128;
/// Upper bound on `{"label": index}` indices, checked before allocating.
const MAX_VOCAB_LABELS: usize = 1 << 20;

/// Label vocabulary of the acoustic model, index = emission class.
///
/// Character lookup goes through a table built once at construction: a
/// direct-indexed slot per ASCII character and a sorted array for the rest.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    labels: Vec<String>,
    ascii: [Option<usize>; ASCII_TABLE_LEN],
    extended: Vec<(char, usize)>,
    has_upper: bool,
    has_lower: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum VocabFile {
    Ordered(Vec<String>),
    Indexed(HashMap<String, usize>),
}

impl Vocabulary {
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        let mut ascii = [None; ASCII_TABLE_LEN];
        let mut extended: Vec<(char, usize)> = Vec::new();
        let mut has_upper = false;
        let mut has_lower = false;

        for (idx, label) in labels.iter().enumerate() {
            let mut it = label.chars();
            let (Some(c), None) = (it.next(), it.next()) else {
                // Multi-character labels (`<pad>`, `<unk>`) never match a
                // transcript character.
                continue;
            };
            if c.is_alphabetic() {
                has_upper |= c.is_uppercase();
                has_lower |= c.is_lowercase();
            }
            if c.is_ascii() {
                let slot = &mut ascii[c as usize];
                if slot.is_none() {
                    *slot = Some(idx);
                }
            } else if !extended.iter().any(|&(e, _)| e == c) {
                extended.push((c, idx));
            }
        }
        extended.sort_unstable_by_key(|&(c, _)| c);

        Self {
            labels,
            ascii,
            extended,
            has_upper,
            has_lower,
        }
    }

    /// Builds from a `label -> index` map. Indices without a label become
    /// empty placeholders so positions keep matching emission classes.
    pub fn from_index_map(map: HashMap<String, usize>) -> Result<Self, AlignmentError> {
        let size = match map.values().copied().max() {
            None => 0,
            Some(max) if max < MAX_VOCAB_LABELS => max + 1,
            Some(max) => {
                return Err(AlignmentError::invalid_input(format!(
                    "vocabulary index {max} exceeds the {MAX_VOCAB_LABELS}-label limit"
                )));
            }
        };
        let mut labels: Vec<Option<String>> = vec![None; size];
        for (label, idx) in map {
            if let Some(existing) = &labels[idx] {
                return Err(AlignmentError::invalid_input(format!(
                    "vocabulary index {idx} is assigned to both {existing:?} and {label:?}"
                )));
            }
            labels[idx] = Some(label);
        }
        Ok(Self::from_labels(
            labels.into_iter().map(Option::unwrap_or_default),
        ))
    }

    /// Loads either a JSON array of labels or a JSON `{"label": index}` object.
    pub fn load(path: &Path) -> Result<Self, AlignmentError> {
        let data =
            std::fs::read_to_string(path).map_err(|e| AlignmentError::io("read vocabulary", e))?;
        let file: VocabFile = serde_json::from_str(&data)
            .map_err(|e| AlignmentError::json("parse vocabulary", e))?;
        let vocab = match file {
            VocabFile::Ordered(labels) => Self::from_labels(labels),
            VocabFile::Indexed(map) => Self::from_index_map(map)?,
        };
        if vocab.is_empty() {
            return Err(AlignmentError::invalid_input(format!(
                "vocabulary {} has no labels",
                path.display()
            )));
        }
        Ok(vocab)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn label(&self, idx: usize) -> Option<&str> {
        self.labels.get(idx).map(String::as_str)
    }

    #[inline]
    pub fn index_of(&self, c: char) -> Option<usize> {
        if c.is_ascii() {
            return self.ascii[c as usize];
        }
        self.extended
            .binary_search_by_key(&c, |&(e, _)| e)
            .ok()
            .map(|pos| self.extended[pos].1)
    }

    /// Appends `c` folded to the case of a single-case vocabulary; mixed-case
    /// or caseless vocabularies take it unchanged. One character may fold
    /// into several (`ß` -> `SS`).
    pub fn push_folded(&self, c: char, out: &mut String) {
        match (self.has_upper, self.has_lower) {
            (true, false) => out.extend(c.to_uppercase()),
            (false, true) => out.extend(c.to_lowercase()),
            _ => out.push(c),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenizerOptions {
    pub blank_id: usize,
    pub separator: char,
    pub unknown_chars: UnknownCharPolicy,
    pub case_folding: CaseFolding,
}

impl From<&AlignerConfig> for TokenizerOptions {
    fn from(config: &AlignerConfig) -> Self {
        Self {
            blank_id: config.blank_id,
            separator: config.separator,
            unknown_chars: config.unknown_chars,
            case_folding: config.case_folding,
        }
    }
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        Self::from(&AlignerConfig::default())
    }
}

/// Joins whitespace-separated words with `separator` and wraps the result in
/// one leading and one trailing separator: `"hi there"` -> `"|hi|there|"`.
pub fn format_transcript(text: &str, separator: char) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    for word in text.split_whitespace() {
        out.push(separator);
        out.push_str(word);
    }
    if !out.is_empty() {
        out.push(separator);
    }
    out
}

/// Character index in `text` of the character at `formatted_position` in
/// `format_transcript(text, _)`. `None` for an inserted separator.
pub fn source_position(text: &str, formatted_position: usize) -> Option<usize> {
    let mut formatted = 0usize;
    let mut in_word = false;
    for (source, c) in text.chars().enumerate() {
        if c.is_whitespace() {
            in_word = false;
            continue;
        }
        if !in_word {
            // separator in front of the word
            formatted += 1;
            in_word = true;
        }
        if formatted == formatted_position {
            return Some(source);
        }
        formatted += 1;
    }
    None
}

/// Maps every character of `transcript` to its vocabulary index.
///
/// `UnknownCharacter::position` is the character index in `transcript`,
/// counted before case folding.
pub fn build_token_sequence(
    transcript: &str,
    vocab: &Vocabulary,
    options: &TokenizerOptions,
) -> Result<TokenSequence, AlignmentError> {
    let mut tokens = Vec::with_capacity(transcript.len());
    let mut chars = Vec::with_capacity(transcript.len());
    let mut substituted = 0usize;
    let mut folded = String::with_capacity(4);

    for (position, source) in transcript.chars().enumerate() {
        folded.clear();
        match options.case_folding {
            CaseFolding::Auto => vocab.push_folded(source, &mut folded),
            CaseFolding::Preserve => folded.push(source),
        }
        for c in folded.chars() {
            let id = match vocab.index_of(c) {
                Some(id) => id,
                // The boundary marker doubles as the blank class when the model
                // has no dedicated label for it.
                None if c == options.separator => options.blank_id,
                None => match options.unknown_chars {
                    UnknownCharPolicy::Reject => {
                        return Err(AlignmentError::UnknownCharacter { ch: c, position });
                    }
                    UnknownCharPolicy::Skip => {
                        tracing::warn!(ch = %c, position, "tokenizer: dropping character missing from vocabulary");
                        continue;
                    }
                    UnknownCharPolicy::Blank => {
                        tracing::warn!(ch = %c, position, "tokenizer: mapping character missing from vocabulary to blank");
                        substituted += 1;
                        options.blank_id
                    }
                },
            };
            tokens.push(id);
            chars.push(c);
        }
    }

    if tokens.is_empty() {
        return Err(AlignmentError::EmptyTranscript);
    }
    if substituted > 0 {
        tracing::debug!(
            substituted,
            total = tokens.len(),
            "tokenizer: blank substitutions applied"
        );
    }

    Ok(TokenSequence { tokens, chars })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLANK_ID: usize = 0;

    fn vocab_upper() -> Vocabulary {
        Vocabulary::from_labels(["-", "|", "E", "T", "A", "H", "I"])
    }

    fn vocab_lower() -> Vocabulary {
        Vocabulary::from_labels(["<pad>", "a", "b", "c", "|"])
    }

    fn options(unknown_chars: UnknownCharPolicy) -> TokenizerOptions {
        TokenizerOptions {
            blank_id: BLANK_ID,
            separator: '|',
            unknown_chars,
            case_folding: CaseFolding::Auto,
        }
    }

    #[test]
    fn format_transcript_wraps_words_with_separator() {
        assert_eq!(format_transcript("hi there", '|'), "|hi|there|");
        assert_eq!(format_transcript("  one\n\ttwo  ", '|'), "|one|two|");
        assert_eq!(format_transcript("   ", '|'), "");
    }

    #[test]
    fn lookup_covers_ascii_and_extended_labels() {
        let vocab = Vocabulary::from_labels(["-", "a", "é", "ß", "|"]);
        assert_eq!(vocab.index_of('a'), Some(1));
        assert_eq!(vocab.index_of('é'), Some(2));
        assert_eq!(vocab.index_of('ß'), Some(3));
        assert_eq!(vocab.index_of('|'), Some(4));
        assert_eq!(vocab.index_of('z'), None);
        assert_eq!(vocab.index_of('ü'), None);
    }

    #[test]
    fn multi_char_labels_keep_their_slot_but_never_match() {
        let vocab = vocab_lower();
        assert_eq!(vocab.len(), 5);
        assert_eq!(vocab.label(0), Some("<pad>"));
        assert_eq!(vocab.index_of('<'), None);
    }

    #[test]
    fn uppercase_vocab_uppercases_transcript() {
        let seq = build_token_sequence("|hi|", &vocab_upper(), &options(UnknownCharPolicy::Reject))
            .unwrap();
        assert_eq!(seq.tokens, vec![1, 5, 6, 1]);
        assert_eq!(seq.chars, vec!['|', 'H', 'I', '|']);
    }

    #[test]
    fn lowercase_vocab_lowercases_transcript() {
        let seq =
            build_token_sequence("|AB|", &vocab_lower(), &options(UnknownCharPolicy::Reject)).unwrap();
        assert_eq!(seq.tokens, vec![4, 1, 2, 4]);
    }

    #[test]
    fn preserve_case_leaves_transcript_untouched() {
        let opts = TokenizerOptions {
            case_folding: CaseFolding::Preserve,
            ..options(UnknownCharPolicy::Blank)
        };
        let seq = build_token_sequence("|hI|", &vocab_upper(), &opts).unwrap();
        assert_eq!(seq.tokens, vec![1, BLANK_ID, 6, 1]);
        assert_eq!(seq.chars, vec!['|', 'h', 'I', '|']);
    }

    #[test]
    fn unknown_char_maps_to_blank_by_default() {
        let seq = build_token_sequence("|AXB|", &vocab_lower(), &TokenizerOptions::default())
            .unwrap();
        assert_eq!(seq.tokens, vec![4, 1, BLANK_ID, 2, 4]);
        assert_eq!(seq.chars[2], 'x');
    }

    #[test]
    fn unknown_char_skip_drops_token_and_char() {
        let seq =
            build_token_sequence("|axb|", &vocab_lower(), &options(UnknownCharPolicy::Skip)).unwrap();
        assert_eq!(seq.tokens, vec![4, 1, 2, 4]);
        assert_eq!(seq.chars, vec!['|', 'a', 'b', '|']);
    }

    #[test]
    fn unknown_char_reject_reports_position() {
        let err = build_token_sequence("|ab?|", &vocab_lower(), &options(UnknownCharPolicy::Reject))
            .unwrap_err();
        assert!(matches!(
            err,
            AlignmentError::UnknownCharacter {
                ch: '?',
                position: 3
            }
        ));
    }

    #[test]
    fn positions_count_source_characters_before_folding() {
        let vocab = Vocabulary::from_labels(["-", "|", "S", "A"]);
        let seq = build_token_sequence("|ßa|", &vocab, &options(UnknownCharPolicy::Reject)).unwrap();
        assert_eq!(seq.tokens, vec![1, 2, 2, 3, 1]);
        assert_eq!(seq.chars, vec!['|', 'S', 'S', 'A', '|']);

        let err = build_token_sequence("|ßa!|", &vocab, &options(UnknownCharPolicy::Reject))
            .unwrap_err();
        assert!(matches!(
            err,
            AlignmentError::UnknownCharacter {
                ch: '!',
                position: 3
            }
        ));
    }

    #[test]
    fn source_position_skips_inserted_separators() {
        // "|hi|there|"
        assert_eq!(source_position("hi there", 0), None);
        assert_eq!(source_position("hi there", 1), Some(0));
        assert_eq!(source_position("hi there", 3), None);
        assert_eq!(source_position("hi there", 4), Some(3));
        assert_eq!(source_position(" hi\t\tthere ", 4), Some(5));
        assert_eq!(source_position("hi", 9), None);
    }

    #[test]
    fn separator_missing_from_vocab_maps_to_blank_without_rejecting() {
        let vocab = Vocabulary::from_labels(["-", "A", "B"]);
        let seq = build_token_sequence("|AB|", &vocab, &options(UnknownCharPolicy::Reject)).unwrap();
        assert_eq!(seq.tokens, vec![BLANK_ID, 1, 2, BLANK_ID]);
    }

    #[test]
    fn empty_transcript_is_rejected() {
        let err = build_token_sequence("", &vocab_lower(), &TokenizerOptions::default()).unwrap_err();
        assert!(matches!(err, AlignmentError::EmptyTranscript));
        let err = build_token_sequence("??", &vocab_lower(), &options(UnknownCharPolicy::Skip))
            .unwrap_err();
        assert!(matches!(err, AlignmentError::EmptyTranscript));
    }

    #[test]
    fn index_map_fills_gaps_with_placeholders() {
        let mut map = HashMap::new();
        map.insert("a".to_string(), 1);
        map.insert("|".to_string(), 3);
        let vocab = Vocabulary::from_index_map(map).unwrap();
        assert_eq!(vocab.len(), 4);
        assert_eq!(vocab.label(0), Some(""));
        assert_eq!(vocab.index_of('|'), Some(3));
    }

    #[test]
    fn load_rejects_out_of_range_indices() {
        let temp_dir = std::env::temp_dir();
        for (name, json) in [
            ("subalign_tokenization_vocab_max_index.json", r#"{"-": 0, "a": 18446744073709551615}"#),
            ("subalign_tokenization_vocab_huge_index.json", r#"{"-": 0, "a": 4611686018427387904}"#),
        ] {
            let path = temp_dir.join(name);
            std::fs::write(&path, json).expect("write vocab");
            let result = Vocabulary::load(&path);
            let _ = std::fs::remove_file(&path);
            assert!(matches!(result, Err(AlignmentError::InvalidInput { .. })));
        }
    }

    #[test]
    fn index_map_accepts_index_just_below_limit() {
        let mut map = HashMap::new();
        map.insert("a".to_string(), MAX_VOCAB_LABELS - 1);
        assert_eq!(Vocabulary::from_index_map(map.clone()).unwrap().len(), MAX_VOCAB_LABELS);
        map.insert("b".to_string(), MAX_VOCAB_LABELS);
        assert!(Vocabulary::from_index_map(map).is_err());
    }

    #[test]
    fn index_map_rejects_duplicate_indices() {
        let mut map = HashMap::new();
        map.insert("a".to_string(), 1);
        map.insert("b".to_string(), 1);
        assert!(Vocabulary::from_index_map(map).is_err());
    }

    #[test]
    fn load_accepts_array_and_object_files() {
        let temp_dir = std::env::temp_dir();
        let array_path = temp_dir.join("subalign_tokenization_vocab_array.json");
        let object_path = temp_dir.join("subalign_tokenization_vocab_object.json");
        std::fs::write(&array_path, r#"["-", "|", "E", "T"]"#).expect("write vocab");
        std::fs::write(&object_path, r#"{"<pad>": 0, "a": 1, "b": 2, "|": 3}"#).expect("write vocab");

        let ordered = Vocabulary::load(&array_path).expect("array vocab");
        assert_eq!(ordered.index_of('T'), Some(3));
        let indexed = Vocabulary::load(&object_path).expect("object vocab");
        assert_eq!(indexed.index_of('b'), Some(2));
        assert_eq!(indexed.label(0), Some("<pad>"));

        let _ = std::fs::remove_file(&array_path);
        let _ = std::fs::remove_file(&object_path);
    }

    #[test]
    fn load_rejects_missing_and_empty_files() {
        assert!(matches!(
            Vocabulary::load(Path::new("/nonexistent/vocab.json")),
            Err(AlignmentError::Io { .. })
        ));
        let path = std::env::temp_dir().join("subalign_tokenization_vocab_empty.json");
        std::fs::write(&path, "[]").expect("write vocab");
        assert!(Vocabulary::load(&path).is_err());
        let _ = std::fs::remove_file(&path);
    }
}
