// Dolphin codec — classification oracle and translation service
//
// Dolphin text is Morse code spelled with two glyphs: `E` for a dot and `e`
// for a dash, one space between letters. Spaces in human text have no code
// and are dropped on the way in, which is what the hyphenate option works
// around (`-` does have a code). Other characters without a code pass through
// as their own group and unknown dolphin groups decode to `?`, so non-empty
// input always translates to non-empty output.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AppError;

const DOT: char = 'E';
const DASH: char = 'e';
const UNKNOWN_GROUP: char = '?';

/// The two categories every text value falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Dolphin text.
    Primary,
    /// Human text.
    Secondary,
}

impl Category {
    pub fn opposite(self) -> Self {
        match self {
            Category::Primary => Category::Secondary,
            Category::Secondary => Category::Primary,
        }
    }
}

/// Decides which category a text value belongs to. Must be total and pure.
pub trait Classifier: Send + Sync {
    fn classify(&self, text: &str) -> Category;
}

/// Maps text of one category into the other.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str) -> Result<String, AppError>;
}

// (character, morse) pairs; `.` dot, `-` dash
const MORSE_TABLE: &[(char, &str)] = &[
    ('A', ".-"),
    ('B', "-..."),
    ('C', "-.-."),
    ('D', "-.."),
    ('E', "."),
    ('F', "..-."),
    ('G', "--."),
    ('H', "...."),
    ('I', ".."),
    ('J', ".---"),
    ('K', "-.-"),
    ('L', ".-.."),
    ('M', "--"),
    ('N', "-."),
    ('O', "---"),
    ('P', ".--."),
    ('Q', "--.-"),
    ('R', ".-."),
    ('S', "..."),
    ('T', "-"),
    ('U', "..-"),
    ('V', "...-"),
    ('W', ".--"),
    ('X', "-..-"),
    ('Y', "-.--"),
    ('Z', "--.."),
    ('0', "-----"),
    ('1', ".----"),
    ('2', "..---"),
    ('3', "...--"),
    ('4', "....-"),
    ('5', "....."),
    ('6', "-...."),
    ('7', "--..."),
    ('8', "---.."),
    ('9', "----."),
    ('.', ".-.-.-"),
    (',', "--..--"),
    ('?', "..--.."),
    ('\'', ".----."),
    ('!', "-.-.--"),
    ('/', "-..-."),
    ('(', "-.--."),
    (')', "-.--.-"),
    ('&', ".-..."),
    (':', "---..."),
    (';', "-.-.-."),
    ('=', "-...-"),
    ('+', ".-.-."),
    ('-', "-....-"),
    ('_', "..--.-"),
    ('"', ".-..-."),
    ('$', "...-..-"),
    ('@', ".--.-."),
];

/// Reference classifier and translator for dolphin text.
#[derive(Debug, Clone, Copy, Default)]
pub struct DolphinCodec;

impl DolphinCodec {
    pub fn new() -> Self {
        Self
    }

    /// True when the text is made of dolphin glyphs and whitespace only,
    /// with at least one glyph.
    pub fn is_dolphin(text: &str) -> bool {
        let mut has_glyph = false;
        for c in text.chars() {
            if c == DOT || c == DASH {
                has_glyph = true;
            } else if !c.is_whitespace() {
                return false;
            }
        }
        has_glyph
    }

    /// Human text to dolphin text. Whitespace is dropped and characters
    /// without a code pass through as their own group. Blank text is
    /// returned unchanged so a non-empty input never yields an empty output.
    pub fn encode(text: &str) -> String {
        let groups: Vec<String> = text
            .chars()
            .flat_map(|c| c.to_uppercase())
            .filter(|c| !c.is_whitespace())
            .map(|c| match morse_for(c) {
                Some(code) => code
                    .chars()
                    .map(|symbol| if symbol == '.' { DOT } else { DASH })
                    .collect(),
                None => {
                    debug!("No dolphin code for '{}', passing through", c);
                    c.to_string()
                }
            })
            .collect();
        if groups.is_empty() {
            return text.to_string();
        }
        groups.join(" ")
    }

    /// Dolphin text to upper-case human text. Unknown groups become `?`.
    pub fn decode(text: &str) -> String {
        text.split_whitespace()
            .map(|group| {
                let code: String = group
                    .chars()
                    .map(|glyph| if glyph == DOT { '.' } else { '-' })
                    .collect();
                match char_for(&code) {
                    Some(decoded) => decoded.to_string(),
                    None => {
                        debug!("Unknown dolphin group '{}'", group);
                        UNKNOWN_GROUP.to_string()
                    }
                }
            })
            .collect()
    }
}

fn morse_for(c: char) -> Option<&'static str> {
    MORSE_TABLE
        .iter()
        .find(|(ch, _)| *ch == c)
        .map(|(_, code)| *code)
}

fn char_for(code: &str) -> Option<char> {
    MORSE_TABLE
        .iter()
        .find(|(_, candidate)| *candidate == code)
        .map(|(ch, _)| *ch)
}

impl Classifier for DolphinCodec {
    fn classify(&self, text: &str) -> Category {
        if Self::is_dolphin(text) {
            Category::Primary
        } else {
            Category::Secondary
        }
    }
}

#[async_trait]
impl Translator for DolphinCodec {
    async fn translate(&self, text: &str) -> Result<String, AppError> {
        Ok(match self.classify(text) {
            Category::Primary => Self::decode(text),
            Category::Secondary => Self::encode(text),
        })
    }
}
