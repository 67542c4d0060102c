//! Descriptive metadata attached to every uploaded document.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

use crate::config::{is_textual, PREVIEW_CHARS};
use crate::discovery::FileCandidate;

const DESCRIPTION_CHARS: usize = 200;
const SUMMARY_CHARS: usize = 500;
const KEYWORD_TOKENS: usize = 50;
const MAX_KEYWORDS: usize = 10;
pub const DEFAULT_LANGUAGE: &str = "en";

/// Fixed-shape metadata record sent alongside each upload, serialised as a
/// flat JSON object of five strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub title: String,
    pub description: String,
    pub summary: String,
    pub keywords: String,
    pub language: String,
}

/// Derives [`Metadata`] from a file's name and, for `.txt`/`.csv`, its first
/// characters.
#[derive(Debug, Clone, Copy)]
pub struct MetadataGenerator {
    preview_chars: usize,
}

impl Default for MetadataGenerator {
    fn default() -> Self {
        Self::new(PREVIEW_CHARS)
    }
}

impl MetadataGenerator {
    pub fn new(preview_chars: usize) -> Self {
        Self { preview_chars }
    }

    /// Never fails: unreadable files produce empty derived fields.
    pub fn generate(&self, candidate: &FileCandidate) -> Metadata {
        let title = candidate.stem();
        let mut metadata = Metadata {
            title: title.clone(),
            ..Metadata::default()
        };

        if is_textual(&candidate.extension) {
            let preview = read_preview(&candidate.path, self.preview_chars);
            if !preview.is_empty() {
                metadata.language = detect_language(&preview);
                metadata.description = char_window(&preview, 0, DESCRIPTION_CHARS);
                metadata.summary =
                    char_window(&preview, DESCRIPTION_CHARS, DESCRIPTION_CHARS + SUMMARY_CHARS);
                metadata.keywords = keywords(&preview);
            }
        } else {
            metadata.language = DEFAULT_LANGUAGE.to_string();
            metadata.description = format!("Document uploaded from {}", candidate.path.display());
            metadata.summary = format!("Content of {title}");
            metadata.keywords = format!(
                "{}, document",
                candidate.extension.trim_start_matches('.')
            );
        }

        debug!(path = %candidate.path.display(), ?metadata, "Generated metadata");
        metadata
    }
}

/// First `max_chars` characters of `path` decoded as UTF-8. Returns an empty
/// string when the file cannot be read or is not valid UTF-8.
pub fn read_preview(path: &Path, max_chars: usize) -> String {
    let mut buf = Vec::new();
    let read = std::fs::File::open(path)
        .and_then(|file| file.take((max_chars as u64) * 4).read_to_end(&mut buf));
    if let Err(e) = read {
        warn!(path = %path.display(), error = ?e, "Could not read text preview");
        return String::new();
    }

    let text = match std::str::from_utf8(&buf) {
        Ok(text) => text,
        // The byte cap may split the last character.
        Err(e) if e.error_len().is_none() => {
            std::str::from_utf8(&buf[..e.valid_up_to()]).unwrap_or_default()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Text preview is not valid UTF-8");
            return String::new();
        }
    };
    text.chars().take(max_chars).collect()
}

/// Characters `[start, end)` of `text`, trimmed.
fn char_window(text: &str, start: usize, end: usize) -> String {
    text.chars()
        .skip(start)
        .take(end.saturating_sub(start))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Lower-cased, de-duplicated, sorted tokens from the first 50 words,
/// capped at 10 and joined with `", "`.
pub fn keywords(preview: &str) -> String {
    let words: BTreeSet<String> = preview
        .split_whitespace()
        .take(KEYWORD_TOKENS)
        .map(str::to_lowercase)
        .collect();
    words
        .into_iter()
        .take(MAX_KEYWORDS)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Best-effort language guess as a two-letter ISO 639-1 code, falling back
/// to [`DEFAULT_LANGUAGE`] when detection fails.
pub fn detect_language(text: &str) -> String {
    whatlang::detect(text)
        .map(|info| iso_639_1(info.lang()))
        .unwrap_or(DEFAULT_LANGUAGE)
        .to_string()
}

fn iso_639_1(lang: whatlang::Lang) -> &'static str {
    use whatlang::Lang;
    match lang {
        Lang::Epo => "eo",
        Lang::Eng => "en",
        Lang::Rus => "ru",
        Lang::Cmn => "zh",
        Lang::Spa => "es",
        Lang::Por => "pt",
        Lang::Ita => "it",
        Lang::Ben => "bn",
        Lang::Fra => "fr",
        Lang::Deu => "de",
        Lang::Ukr => "uk",
        Lang::Kat => "ka",
        Lang::Ara => "ar",
        Lang::Hin => "hi",
        Lang::Jpn => "ja",
        Lang::Heb => "he",
        Lang::Yid => "yi",
        Lang::Pol => "pl",
        Lang::Amh => "am",
        Lang::Jav => "jv",
        Lang::Kor => "ko",
        Lang::Nob => "nb",
        Lang::Dan => "da",
        Lang::Swe => "sv",
        Lang::Fin => "fi",
        Lang::Tur => "tr",
        Lang::Nld => "nl",
        Lang::Hun => "hu",
        Lang::Ces => "cs",
        Lang::Ell => "el",
        Lang::Bul => "bg",
        Lang::Bel => "be",
        Lang::Mar => "mr",
        Lang::Kan => "kn",
        Lang::Ron => "ro",
        Lang::Slv => "sl",
        Lang::Hrv => "hr",
        Lang::Srp => "sr",
        Lang::Mkd => "mk",
        Lang::Lit => "lt",
        Lang::Lav => "lv",
        Lang::Est => "et",
        Lang::Tam => "ta",
        Lang::Vie => "vi",
        Lang::Urd => "ur",
        Lang::Tha => "th",
        Lang::Guj => "gu",
        Lang::Uzb => "uz",
        Lang::Pan => "pa",
        Lang::Aze => "az",
        Lang::Ind => "id",
        Lang::Tel => "te",
        Lang::Pes => "fa",
        Lang::Mal => "ml",
        Lang::Ori => "or",
        Lang::Mya => "my",
        Lang::Nep => "ne",
        Lang::Sin => "si",
        Lang::Khm => "km",
        Lang::Tuk => "tk",
        Lang::Aka => "ak",
        Lang::Zul => "zu",
        Lang::Sna => "sn",
        Lang::Afr => "af",
        Lang::Lat => "la",
        Lang::Slk => "sk",
        Lang::Cat => "ca",
        Lang::Tgl => "tl",
        Lang::Hye => "hy",
        #[allow(unreachable_patterns)]
        _ => DEFAULT_LANGUAGE,
    }
}
