use lazy_static::lazy_static;
use regex::Regex;

/// matches a description part carrying a leading qualifier, such as
/// `Bus Station bay 5,Blyth`. the qualifier before the comma is dropped when
/// the text after it does not begin with a space.
const DESCRIPTION_PART_PATTERN: &str = r"^.+,([^ ].+)";

lazy_static! {
    static ref DESCRIPTION_PART_REGEX: Regex = Regex::new(DESCRIPTION_PART_PATTERN).unwrap();
}

/// replacements applied to every service description, in order. the dash
/// entries normalize any single-spaced dash to ` - ` while leaving hyphenated
/// place names untouched.
const DESCRIPTION_CORRECTIONS: [(&str, &str); 8] = [
    ("Stitians", "Stithians"),
    ("Kings Lynn", "King's Lynn"),
    ("Baasingstoke", "Basingstoke"),
    ("Tauton", "Taunton"),
    ("- ", " - "),
    (" -", " - "),
    ("  -", " -"),
    ("-  ", "- "),
];

/// words kept lowercase by [`title_case`] unless they open or close the text.
const SMALL_WORDS: [&str; 17] = [
    "a", "an", "and", "as", "at", "but", "by", "for", "if", "in", "of", "on", "or", "the", "to",
    "v", "via",
];

/// lowercases `text` and joins its alphanumeric runs with single hyphens,
/// dropping all other punctuation: `King's Lynn` becomes `kings-lynn`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for character in text.chars() {
        if character.is_alphanumeric() || character == '_' {
            slug.extend(character.to_lowercase());
        } else if (character.is_whitespace() || character == '-')
            && !slug.is_empty()
            && !slug.ends_with('-')
        {
            slug.push('-');
        }
    }
    slug.trim_matches(|c| c == '-' || c == '_').to_string()
}

/// uppercases the first character and lowercases the rest.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// capitalizes each word of `text`, keeping joining words such as `via`
/// lowercase so they survive later splitting.
pub fn title_case(text: &str) -> String {
    let count = text.split(' ').count();
    text.split(' ')
        .enumerate()
        .map(|(index, word)| {
            let lower = word.to_lowercase();
            if index != 0 && index + 1 != count && SMALL_WORDS.contains(&lower.as_str()) {
                lower
            } else {
                capitalize(word)
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// applies the fixed description replacement table.
pub fn correct_description(description: &str) -> String {
    let mut corrected = description.to_string();
    for (old, new) in DESCRIPTION_CORRECTIONS {
        corrected = corrected.replace(old, new);
    }
    corrected
}

/// `Bus Station bay 5,Blyth` becomes `Blyth`; parts without a comma-bound
/// qualifier are returned unchanged.
pub fn sanitize_description_part(part: &str) -> String {
    match DESCRIPTION_PART_REGEX.captures(part.trim()) {
        Some(captures) => captures[1].to_string(),
        None => part.to_string(),
    }
}

/// cleans a raw service description: all-caps text is title-cased, then the
/// replacement table repairs misspellings and dash spacing.
pub fn normalize_description(raw: &str) -> String {
    let text = if is_shouting(raw) {
        title_case(raw)
    } else {
        raw.to_string()
    };
    correct_description(&text)
}

/// splits a normalized description on ` - ` into its terminus parts, peeling
/// a trailing ` via ` qualifier off the last part.
pub fn description_parts(description: &str) -> (Vec<String>, Option<String>) {
    let mut parts: Vec<String> = description
        .split(" - ")
        .map(sanitize_description_part)
        .collect();
    let mut via = None;
    if let Some(last) = parts.last_mut() {
        if let Some((head, tail)) = last.split_once(" via ") {
            via = Some(tail.to_string());
            *last = head.to_string();
        }
    }
    (parts, via)
}

fn is_shouting(text: &str) -> bool {
    let mut has_cased = false;
    for character in text.chars() {
        if character.is_lowercase() {
            return false;
        }
        if character.is_uppercase() {
            has_cased = true;
        }
    }
    has_cased
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_slugify_drops_apostrophes() {
        assert_eq!(slugify("King's Lynn"), "kings-lynn");
    }

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("Stithians, Crellow Fields"), "stithians-crellow-fields");
        assert_eq!(slugify("  Upper -- Town  "), "upper-town");
    }

    #[test]
    fn test_capitalize_lowercases_tail() {
        assert_eq!(capitalize("OUTBOUND"), "Outbound");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_title_case_keeps_via_lowercase() {
        assert_eq!(
            title_case("ALPHAVILLE - DELTATON VIA BETABURG"),
            "Alphaville - Deltaton via Betaburg"
        );
    }

    #[test]
    fn test_correct_description_respaces_dashes() {
        assert_eq!(correct_description("Looe -Polperro"), "Looe - Polperro");
        assert_eq!(correct_description("Looe- Polperro"), "Looe - Polperro");
        assert_eq!(correct_description("Looe - Polperro"), "Looe - Polperro");
    }

    #[test]
    fn test_correct_description_keeps_hyphenated_names() {
        assert_eq!(correct_description("Weston-super-Mare"), "Weston-super-Mare");
    }

    #[test]
    fn test_correct_description_fixes_spellings() {
        assert_eq!(correct_description("Truro - Stitians"), "Truro - Stithians");
    }

    #[test]
    fn test_sanitize_description_part() {
        assert_eq!(sanitize_description_part("Bus Station bay 5,Blyth"), "Blyth");
        assert_eq!(sanitize_description_part("Blyth, Bus Station"), "Blyth, Bus Station");
        assert_eq!(sanitize_description_part("Blyth"), "Blyth");
    }

    #[test]
    fn test_description_parts_with_via() {
        let (parts, via) = description_parts("Alphaville - Deltaton via Betaburg");
        assert_eq!(parts, vec!["Alphaville", "Deltaton"]);
        assert_eq!(via.as_deref(), Some("Betaburg"));
    }

    #[test]
    fn test_description_parts_without_via() {
        let (parts, via) = description_parts("Looe - Polperro");
        assert_eq!(parts, vec!["Looe", "Polperro"]);
        assert_eq!(via, None);
    }

    #[test]
    fn test_normalize_description_title_cases_shouting() {
        assert_eq!(
            normalize_description("PENZANCE - ST IVES"),
            "Penzance - St Ives"
        );
        assert_eq!(normalize_description("Penzance - St Ives"), "Penzance - St Ives");
    }
}
