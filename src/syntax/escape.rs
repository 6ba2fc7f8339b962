//! Identifier escaping.
//!
//! Ids written to `.cm` text must match `\^?[_a-zA-Z][A-Za-z0-9_\-~$#@/]*`
//! and must not collide with a keyword unless escaped with `^`.

use crate::base::constants::ID_SEPARATOR;
use crate::parser::is_keyword;

/// Characters allowed after the first character of an id.
fn is_id_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '~' | '$' | '#' | '@' | '/')
}

fn is_id_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Whether `text` matches the id grammar, keyword escape included.
pub fn is_valid_id(text: &str) -> bool {
    let body = text.strip_prefix('^').unwrap_or(text);
    let mut chars = body.chars();
    match chars.next() {
        Some(first) if is_id_start(first) => chars.all(is_id_continue),
        _ => false,
    }
}

/// Turn arbitrary text into a valid id.
///
/// Valid ids are returned unchanged, so `to_id(to_id(x)) == to_id(x)`.
pub fn to_id(input: &str) -> String {
    if is_valid_id(input) && (input.starts_with('^') || !is_keyword(input)) {
        return input.to_string();
    }

    let mut id = String::with_capacity(input.len());
    for c in input.chars() {
        match strip_diacritic(c) {
            Stripped::Keep(c) => id.push(if is_id_continue(c) { c } else { '_' }),
            Stripped::Replace(base) => id.push_str(base),
            Stripped::Drop => {}
        }
    }

    if is_keyword(&id) {
        id.insert(0, '^');
    }
    if !is_valid_id(&id) {
        id.insert(0, '_');
    }
    id
}

/// Apply [`to_id`] to every dot-separated segment of a reference.
pub fn to_id_reference(input: &str) -> String {
    input
        .split(ID_SEPARATOR)
        .map(to_id)
        .collect::<Vec<_>>()
        .join(".")
}

/// Join two ids with the id separator.
pub fn combine_ids(first: &str, second: &str) -> String {
    format!("{first}{ID_SEPARATOR}{second}")
}

/// Quote a string literal for `.cm` text.
pub fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

enum Stripped {
    Keep(char),
    Replace(&'static str),
    Drop,
}

/// Map Latin-1 and Latin Extended-A letters to their base letters.
fn strip_diacritic(c: char) -> Stripped {
    // Combining diacritical marks
    if ('\u{0300}'..='\u{036F}').contains(&c) {
        return Stripped::Drop;
    }
    let upper = match c {
        'À'..='Å' | 'à'..='å' | 'Ā'..='ą' => "A",
        'Æ' | 'æ' => "AE",
        'Ç' | 'ç' | 'Ć'..='č' => "C",
        'Ð' | 'ð' | 'Ď'..='đ' => "D",
        'È'..='Ë' | 'è'..='ë' | 'Ē'..='ě' => "E",
        'Ĝ'..='ģ' => "G",
        'Ĥ'..='ħ' => "H",
        'Ì'..='Ï' | 'ì'..='ï' | 'Ĩ'..='ı' => "I",
        'Ĳ' | 'ĳ' => "IJ",
        'Ĵ' | 'ĵ' => "J",
        'Ķ'..='ĸ' => "K",
        'Ĺ'..='ł' => "L",
        'Ñ' | 'ñ' | 'Ń'..='ŋ' => "N",
        'Ò'..='Ö' | 'Ø' | 'ò'..='ö' | 'ø' | 'Ō'..='ő' => "O",
        'Œ' | 'œ' => "OE",
        'Ŕ'..='ř' => "R",
        'Ś'..='š' | 'ſ' => "S",
        'ß' => "SS",
        'Ţ'..='ŧ' => "T",
        'Þ' | 'þ' => "TH",
        'Ù'..='Ü' | 'ù'..='ü' | 'Ũ'..='ų' => "U",
        'Ŵ' | 'ŵ' => "W",
        'Ý' | 'ý' | 'ÿ' | 'Ŷ'..='Ÿ' => "Y",
        'Ź'..='ž' => "Z",
        _ => return Stripped::Keep(c),
    };
    if c.is_uppercase() {
        Stripped::Replace(upper)
    } else {
        Stripped::Replace(lower_base(upper))
    }
}

fn lower_base(upper: &'static str) -> &'static str {
    match upper {
        "A" => "a",
        "AE" => "ae",
        "C" => "c",
        "D" => "d",
        "E" => "e",
        "G" => "g",
        "H" => "h",
        "I" => "i",
        "IJ" => "ij",
        "J" => "j",
        "K" => "k",
        "L" => "l",
        "N" => "n",
        "O" => "o",
        "OE" => "oe",
        "R" => "r",
        "S" => "s",
        "SS" => "ss",
        "T" => "t",
        "TH" => "th",
        "U" => "u",
        "W" => "w",
        "Y" => "y",
        "Z" => "z",
        other => other,
    }
}
