use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref PARENTHETICAL: Regex = Regex::new(r"\([^()]*\)").unwrap();
}

/// Strip annotations from a free-text name.
///
/// Removes parenthesized parts ("John (Johnny) Smith"), anything after the
/// first slash ("Jane/Jan") and trailing roman-numeral tokens made of `I`
/// and `V` ("Smith III"). A lone "V" mid-name is an initial and stays.
/// Whitespace is collapsed. Applying it twice gives the
/// same result as applying it once.
pub fn clean_name(name: Option<&str>) -> Option<String> {
    name.map(clean)
}

fn clean(name: &str) -> String {
    let without_parens = PARENTHETICAL.replace_all(name, " ");
    // An unbalanced "(" drops everything after it.
    let before_paren = without_parens.split('(').next().unwrap_or_default();
    let before_slash = before_paren.split('/').next().unwrap_or_default();

    let mut tokens: Vec<&str> = before_slash.split_whitespace().collect();
    while tokens.last().is_some_and(|token| is_roman_suffix(token)) {
        tokens.pop();
    }
    tokens.join(" ")
}

fn is_roman_suffix(token: &str) -> bool {
    token.chars().all(|c| c == 'I' || c == 'V')
}
