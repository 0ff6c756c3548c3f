//! Name Casing
//!
//! Entity relations (`bookAuthors`), schema titles (`Book Author`) and
//! property names arrive in whatever casing the server uses. Emission needs
//! PascalCase type names, camelCase identifiers and kebab-case file names.
//!
//! Words are split on `_`, `-`, spaces and lower-to-upper transitions; runs of
//! capitals stay together so `ISBNCode` splits as `ISBN` + `Code`.

/// Split an identifier into words
fn words(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' || c == ' ' || c == '.' || c == '/' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_ascii_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).map(|n| n.is_ascii_lowercase()).unwrap_or(false);
            // fooBar | FOOBar -> FOO + Bar
            if prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_is_lower)
            {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Capitalize the first letter; all-caps words (acronyms) are kept
fn case_word(word: &str) -> String {
    if word.len() > 1 && word.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) {
        return word.to_string();
    }
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => {
            let mut result = first.to_uppercase().to_string();
            for c in chars {
                result.push(c.to_ascii_lowercase());
            }
            result
        }
    }
}

/// `book authors` -> `BookAuthors`
pub fn pascal_case(s: &str) -> String {
    let result: String = words(s).iter().map(|w| case_word(w)).collect();
    match result.chars().next() {
        Some(first) if first.is_ascii_digit() => format!("_{}", result),
        _ => result,
    }
}

/// `BookAuthors` -> `bookAuthors`
pub fn camel_case(s: &str) -> String {
    let pascal = pascal_case(s);
    let lead = pascal.chars().take_while(|c| c.is_ascii_uppercase()).count();
    match lead {
        0 => pascal,
        // `ISBNCode` -> `isbnCode`, `ISBN` -> `isbn`
        n if n > 1 && n < pascal.len() => {
            let split = n - 1;
            format!("{}{}", pascal[..split].to_ascii_lowercase(), &pascal[split..])
        }
        n if n == pascal.len() => pascal.to_ascii_lowercase(),
        _ => format!("{}{}", pascal[..1].to_ascii_lowercase(), &pascal[1..]),
    }
}

/// `BookAuthor` -> `book-author`
pub fn kebab_case(s: &str) -> String {
    words(s)
        .iter()
        .map(|w| w.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}
