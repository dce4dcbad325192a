//! Mention normalizer - raw entity spans to fingerprint keys
//!
//! A key looks like `person:putin-vladimir`: the lower-case category, then the
//! slug tokens of the cleaned text in sorted order. Sorting makes the key
//! independent of word order, so "Vladimir Putin" and "Putin, Vladimir" share
//! one fingerprint. Rejections are silent: a mention that does not yield a key
//! is simply dropped.

use storyweb_domain::{Category, Mention, Tag};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Separator between slug tokens
const SEPARATOR: char = '-';

/// Titles stripped from the front of person names
const HONORIFICS: &[&str] = &[
    "mr", "mrs", "ms", "miss", "mx", "dr", "prof", "professor", "sir", "dame", "lord", "lady",
    "president", "chancellor", "minister", "senator", "sen", "rep", "gov", "governor", "gen",
    "general", "col", "colonel", "capt", "captain", "rev", "reverend", "judge", "justice",
    "king", "queen", "prince", "princess", "pope", "st",
];

/// Name suffixes that may follow a comma without being a given name
const NAME_SUFFIXES: &[&str] = &["jr", "sr", "ii", "iii", "iv", "phd", "md"];

/// A mention that survived normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    /// Accepted category
    pub category: Category,

    /// Cleaned display text
    pub text: String,

    /// Fingerprint key
    pub key: String,
}

/// Fingerprint key for a recognizer label and span, or `None` if rejected
///
/// # Examples
///
/// ```
/// use storyweb_extractor::normalize;
///
/// assert_eq!(normalize("PERSON", "Vladimir Putin"), Some("person:putin-vladimir".to_string()));
/// assert_eq!(normalize("PERSON", "Putin, Vladimir"), normalize("PERSON", "Vladimir Putin"));
/// assert_eq!(normalize("PERSON", "Sam"), None);
/// assert_eq!(normalize("ORG", "NATO"), Some("org:nato".to_string()));
/// assert_eq!(normalize("DATE", "Tuesday"), None);
/// ```
pub fn normalize(category: &str, raw_text: &str) -> Option<String> {
    normalize_mention(category, raw_text).map(|n| n.key)
}

/// Clean, slug and fingerprint a mention
pub fn normalize_mention(category: &str, raw_text: &str) -> Option<Normalized> {
    let category = Category::parse(category)?;
    let text = clean_entity_name(category, raw_text)?;
    let key = fingerprint(category, &text)?;
    Some(Normalized {
        category,
        text,
        key,
    })
}

/// Turn an extracted mention into a tag
pub fn make_tag(mention: &Mention) -> Option<Tag> {
    let normalized = normalize_mention(&mention.category, &mention.raw_text)?;
    Some(Tag {
        ref_id: mention.ref_id.clone(),
        sentence: mention.sentence,
        key: normalized.key,
        category: normalized.category,
        text: normalized.text,
    })
}

/// Display-quality text for a raw span
pub fn clean_entity_name(category: Category, raw_text: &str) -> Option<String> {
    let folded: String = raw_text.nfkc().collect::<String>().replace(['\u{2019}', '`'], "'");
    let mut text = folded.split_whitespace().collect::<Vec<_>>().join(" ");

    for suffix in ["'s", "'S"] {
        if let Some(stripped) = text.strip_suffix(suffix) {
            text = stripped.to_string();
        }
    }

    if category == Category::Person {
        text = reorder_inverted_name(&text);
        text = strip_honorifics(&text);
    }

    let text = trim_noise(&text);
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// "Putin, Vladimir" -> "Vladimir Putin"; leaves "King, Jr." alone
fn reorder_inverted_name(text: &str) -> String {
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    if let [last, first] = parts[..] {
        let first_token = first.trim_end_matches('.').to_lowercase();
        if !last.is_empty() && !first.is_empty() && !NAME_SUFFIXES.contains(&first_token.as_str()) {
            return format!("{} {}", first, last);
        }
    }
    text.to_string()
}

fn strip_honorifics(text: &str) -> String {
    let mut tokens: Vec<&str> = text.split(' ').collect();
    while tokens.len() > 1 {
        let head = tokens[0].trim_end_matches('.').to_lowercase();
        if HONORIFICS.contains(&head.as_str()) {
            tokens.remove(0);
        } else {
            break;
        }
    }
    tokens.join(" ")
}

/// Strip quotes, brackets and punctuation around the name
///
/// A trailing dot survives when the last token is a dotted abbreviation
/// such as "U.S.".
fn trim_noise(text: &str) -> &str {
    let start_trimmed = text.trim_start_matches(|c: char| !c.is_alphanumeric());
    let trimmed = start_trimmed.trim_end_matches(|c: char| !c.is_alphanumeric());
    let last_token = start_trimmed.rsplit(' ').next().unwrap_or_default();
    let keeps_dot = last_token.ends_with('.') && last_token[..last_token.len() - 1].contains('.');
    if keeps_dot && start_trimmed[trimmed.len()..].starts_with('.') {
        &start_trimmed[..trimmed.len() + 1]
    } else {
        trimmed
    }
}

/// Lowercase, strip diacritics, and collapse non-alphanumeric runs into `-`
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_separator = false;
    for c in text.nfkd().filter(|c| !is_combining_mark(*c)).flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push(SEPARATOR);
            }
            pending_separator = false;
            slug.push(c);
        } else {
            pending_separator = true;
        }
    }
    slug
}

/// Order-independent key for cleaned text
fn fingerprint(category: Category, text: &str) -> Option<String> {
    let slug = slugify(text);
    let mut tokens: Vec<&str> = slug.split(SEPARATOR).filter(|t| !t.is_empty()).collect();
    if tokens.is_empty() {
        return None;
    }
    // A lone first or last name is too ambiguous to track
    if category == Category::Person && tokens.len() < 2 {
        return None;
    }
    tokens.sort_unstable();
    Some(format!("{}:{}", category.key_prefix(), tokens.join("-")))
}
