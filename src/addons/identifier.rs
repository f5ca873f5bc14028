//! Program identifiers synthesized from package and export names.

use rand::Rng;

/// Characters the random fallback draws from.
pub const FALLBACK_ALPHABET: &[u8] = b"abcdefghijk";

/// Length of a random fallback identifier.
pub const FALLBACK_LEN: usize = 10;

/// ECMAScript reserved words, including the strict-mode and module ones.
/// None of them can name an import binding.
const RESERVED_WORDS: &[&str] = &[
    "arguments", "await", "break", "case", "catch", "class", "const", "continue", "debugger",
    "default", "delete", "do", "else", "enum", "eval", "export", "extends", "false", "finally",
    "for", "function", "if", "implements", "import", "in", "instanceof", "interface", "let", "new",
    "null", "package", "private", "protected", "public", "return", "static", "super", "switch",
    "this", "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

/// Turns a package name into a camelCased identifier.
///
/// `@plone/volto-slate` becomes `plonevoltoSlate`. Names with nothing usable
/// left after stripping get a random [`FALLBACK_LEN`]-character name instead,
/// so the result is never empty but is not reproducible for those inputs.
pub fn synthesize(raw: &str) -> String {
    synthesize_with(raw, &mut rand::thread_rng())
}

/// [`synthesize`] with a caller-supplied RNG for the fallback branch.
pub fn synthesize_with<R: Rng>(raw: &str, rng: &mut R) -> String {
    let stripped: String = raw
        .chars()
        .filter(|c| *c == '-' || is_identifier_char(*c))
        .collect();

    let mut ident = camel_case(&stripped);
    if ident.is_empty() {
        return random_fallback(rng);
    }
    if ident.starts_with(|c: char| c.is_ascii_digit()) || is_reserved_word(&ident) {
        ident.insert(0, '_');
    }
    ident
}

/// Identifier for an extra export: the export name plus a running counter.
pub fn export_identifier(export: &str, counter: usize) -> String {
    format!("{export}{counter}")
}

/// Whether `name` is reserved and so unusable as a binding.
pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

/// Whether `name` can be written as-is in an import clause.
///
/// Reserved words pass: an imported name may be one, only its local
/// binding may not.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_identifier_char(first) && !first.is_ascii_digit() => {
            chars.all(is_identifier_char)
        }
        _ => false,
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for (i, segment) in s.split('-').enumerate() {
        if i == 0 {
            out.push_str(segment);
            continue;
        }
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

fn random_fallback<R: Rng>(rng: &mut R) -> String {
    (0..FALLBACK_LEN)
        .map(|_| FALLBACK_ALPHABET[rng.gen_range(0..FALLBACK_ALPHABET.len())] as char)
        .collect()
}
