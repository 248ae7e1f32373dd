//! Resource name derivation utilities for the Strapi GraphQL schema
//!
//! Strapi names its root fields after the collection: `orders` for the list
//! query, `order` for the single-item query and `createOrder` for mutations.
//! Every helper here is deterministic and idempotent.

use heck::{ToLowerCamelCase, ToUpperCamelCase};

/// Irregular singular/plural pairs that the suffix rules get wrong
const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("tooth", "teeth"),
    ("foot", "feet"),
    ("leaf", "leaves"),
    ("knife", "knives"),
    ("life", "lives"),
    ("wife", "wives"),
    ("half", "halves"),
    ("shelf", "shelves"),
    ("wolf", "wolves"),
];

/// Words whose singular and plural forms are identical
const UNCOUNTABLE: &[&str] = &["media", "data", "information", "equipment", "news", "series", "species"];

/// Singulars ending in `-ie`/`-oe` that only take an `s` in the plural
const KEEP_E: &[&str] = &[
    "movie", "cookie", "pie", "tie", "zombie", "calorie", "rookie", "selfie", "shoe", "toe", "canoe", "oboe", "hoe",
    "foe",
];

/// Singulars ending in `-as` that take `es` in the plural
const AS_SINGULAR: &[&str] = &["alias", "gas", "atlas", "canvas"];

/// Convert a resource name to plural form using English grammar rules
pub fn pluralize(word: &str) -> String {
    if word.is_empty() || is_uncountable(word) {
        return word.to_string();
    }

    if let Some(plural) = replace_irregular(word, |(singular, plural)| (singular, plural)) {
        return plural;
    }
    if IRREGULAR.iter().any(|(_, plural)| ends_with_word(word, plural)) {
        return word.to_string();
    }

    // 'analysis' -> 'analyses'
    if let Some(stem) = strip_suffix(word, "sis") {
        return format!("{}ses", stem);
    }

    // Words ending in 's', 'ss', 'sh', 'ch', 'x' -> add 'es'
    if ends_with(word, "s") || ends_with(word, "sh") || ends_with(word, "ch") || ends_with(word, "x") {
        return format!("{}es", word);
    }

    // Words ending in 'z' -> double it and add 'es'
    if ends_with(word, "z") && !ends_with(word, "tz") {
        return format!("{}zes", word);
    }

    // Words ending in consonant + 'y' -> change 'y' to 'ies'
    if let Some(stem) = strip_suffix(word, "y").filter(|_| !follows_vowel(word, 1)) {
        return format!("{}ies", stem);
    }

    // Words ending in consonant + 'o' -> add 'es'
    if ends_with(word, "o") && !follows_vowel(word, 1) {
        return format!("{}es", word);
    }

    format!("{}s", word)
}

/// Convert a resource name to singular form
///
/// Already singular names are returned unchanged, so applying this twice
/// yields the same result as applying it once.
pub fn singularize(word: &str) -> String {
    if word.is_empty() || is_uncountable(word) {
        return word.to_string();
    }

    if let Some(singular) = replace_irregular(word, |(singular, plural)| (plural, singular)) {
        return singular;
    }
    if IRREGULAR.iter().any(|(singular, _)| ends_with_word(word, singular)) {
        return word.to_string();
    }

    // 'movies' -> 'movie', 'shoes' -> 'shoe'
    if KEEP_E.iter().any(|s| ends_with_word(word, &format!("{}s", s))) {
        return word[..word.len() - 1].to_string();
    }

    // 'aliases' -> 'alias'
    if AS_SINGULAR.iter().any(|s| ends_with_word(word, &format!("{}es", s))) {
        return word[..word.len() - 2].to_string();
    }

    // 'analyses' -> 'analysis'
    if let Some(stem) = strip_suffix(word, "yses") {
        return format!("{}ysis", stem);
    }

    // 'statuses', 'buses' -> strip 'es'; 'houses', 'causes' keep their 'e'
    if let Some(stem) = strip_suffix(word, "uses") {
        if stem.chars().last().is_some_and(|c| !"aou".contains(c.to_ascii_lowercase())) {
            return word[..word.len() - 2].to_string();
        }
    }

    // 'categories' -> 'category'
    if let Some(stem) = strip_suffix(word, "ies").filter(|_| word.len() > 4) {
        return format!("{}y", stem);
    }

    // 'quizzes' -> 'quiz'
    if let Some(stem) = strip_suffix(word, "zzes") {
        return format!("{}z", stem);
    }

    // 'addresses', 'branches', 'boxes', 'heroes' -> strip 'es'
    if ends_with(word, "sses")
        || ends_with(word, "shes")
        || ends_with(word, "ches")
        || ends_with(word, "xes")
        || (ends_with(word, "oes") && word.len() > 4 && !follows_vowel(word, 3))
    {
        return word[..word.len() - 2].to_string();
    }

    // Singular words that happen to end in 's'
    if ends_with(word, "ss") || ends_with(word, "us") || ends_with(word, "is") || ends_with(word, "as") {
        return word.to_string();
    }

    match strip_suffix(word, "s") {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => word.to_string(),
    }
}

/// `create-order` -> `createOrder`, `product_categories` -> `productCategories`
pub fn to_camel_case(name: &str) -> String {
    name.to_lower_camel_case()
}

/// `order` -> `Order`, `product-category` -> `ProductCategory`
pub fn to_pascal_case(name: &str) -> String {
    name.to_upper_camel_case()
}

/// Name of the GraphQL input type used to filter a collection
///
/// `orders` -> `OrderFiltersInput`
pub fn filters_input_type(resource: &str) -> String {
    format!("{}FiltersInput", to_pascal_case(&singularize(resource)))
}

fn is_uncountable(word: &str) -> bool {
    UNCOUNTABLE.iter().any(|u| ends_with(word, u))
}

/// `word` without `suffix`, compared ASCII case-insensitively
///
/// Suffixes are ASCII, so the split is only taken on a char boundary of the
/// original word; lowercasing is never used to find the cut.
fn strip_suffix<'a>(word: &'a str, suffix: &str) -> Option<&'a str> {
    let split = word.len().checked_sub(suffix.len())?;
    if !word.is_char_boundary(split) {
        return None;
    }
    let (stem, tail) = word.split_at(split);
    tail.eq_ignore_ascii_case(suffix).then_some(stem)
}

fn ends_with(word: &str, suffix: &str) -> bool {
    strip_suffix(word, suffix).is_some()
}

/// `suffix` ends `word` and starts a word of its own (`sales-person`)
fn ends_with_word(word: &str, suffix: &str) -> bool {
    strip_suffix(word, suffix).is_some_and(|stem| {
        stem.chars()
            .last()
            .map(|c| c == '-' || c == '_' || c == ' ')
            .unwrap_or(true)
    })
}

/// Check whether the character `offset + 1` positions from the end is a vowel
fn follows_vowel(word: &str, offset: usize) -> bool {
    word.chars()
        .rev()
        .nth(offset)
        .map(|c| "aeiou".contains(c.to_ascii_lowercase()))
        // Single letter words behave like they follow a vowel
        .unwrap_or(true)
}

/// Replace an irregular suffix, keeping whatever prefix precedes it
fn replace_irregular<F>(word: &str, pick: F) -> Option<String>
where
    F: Fn((&'static str, &'static str)) -> (&'static str, &'static str),
{
    IRREGULAR.iter().find_map(|&pair| {
        let (from, to) = pick(pair);
        if ends_with_word(word, from) {
            strip_suffix(word, from).map(|stem| format!("{}{}", stem, to))
        } else {
            None
        }
    })
}
