use std::collections::HashMap;
use std::error::Error;

use crate::config::InputLimits;
use crate::parser::expand::{expand, expandify, populate_macros};

fn limits() -> InputLimits {
    InputLimits::default()
}

#[tokio::test]
async fn test_expandify_repeats() -> Result<(), Box<dyn Error>> {
    assert_eq!(expandify("[a]*3"), "aaa");
    assert_eq!(expandify("[a.]*2b"), "a.a.b");
    assert_eq!(expandify("x[b]*2y"), "xbby");
    Ok(())
}

#[tokio::test]
async fn test_expandify_nested_repeats() -> Result<(), Box<dyn Error>> {
    // The inner pair expands first, then the outer pair repeats the result
    assert_eq!(expandify("[[a]*2b]*2"), "aabaab");
    assert_eq!(expandify("[[a]*2[b]*2]*2"), "aabbaabb");
    Ok(())
}

#[tokio::test]
async fn test_expandify_leaves_malformed_alone() -> Result<(), Box<dyn Error>> {
    assert_eq!(expandify("[ab]"), "[ab]");
    assert_eq!(expandify("[ab]*x"), "[ab]*x");
    assert_eq!(expandify("a[b"), "a[b");
    assert_eq!(expandify("ab]*2"), "ab]*2");
    Ok(())
}

#[tokio::test]
async fn test_expandify_count_limits() -> Result<(), Box<dyn Error>> {
    assert_eq!(expandify("[a]*12"), "a".repeat(12));
    // Counts are one or two digits; extra digits stay literal
    assert_eq!(expandify("[a]*123"), format!("{}3", "a".repeat(12)));
    assert_eq!(expandify("[a]*0"), "");
    Ok(())
}

#[tokio::test]
async fn test_populate_macros_simple() -> Result<(), Box<dyn Error>> {
    let mut macros = HashMap::new();
    macros.insert("#jump".to_string(), "_a600ms".to_string());
    assert_eq!(populate_macros("#jumpb", &macros, &limits()), "_a600msb");
    // Unknown macros are left in place for the parser to reject
    assert_eq!(populate_macros("#nope", &macros, &limits()), "#nope");
    Ok(())
}

#[tokio::test]
async fn test_populate_macros_longest_name_wins() -> Result<(), Box<dyn Error>> {
    let mut macros = HashMap::new();
    macros.insert("#at".to_string(), "a".to_string());
    macros.insert("#atk".to_string(), "b600ms".to_string());
    assert_eq!(populate_macros("#atk", &macros, &limits()), "b600ms");
    Ok(())
}

#[tokio::test]
async fn test_populate_macros_arguments() -> Result<(), Box<dyn Error>> {
    let mut macros = HashMap::new();
    macros.insert("#mash(*,*)".to_string(), "[<0><1>]*2".to_string());
    assert_eq!(populate_macros("#mash(a,b)", &macros, &limits()), "[ab]*2");
    Ok(())
}

#[tokio::test]
async fn test_macros_reference_macros() -> Result<(), Box<dyn Error>> {
    let mut macros = HashMap::new();
    macros.insert("#jump".to_string(), "_a600ms".to_string());
    macros.insert("#combo".to_string(), "#jumpb".to_string());
    assert_eq!(populate_macros("#combo", &macros, &limits()), "_a600msb");
    Ok(())
}

#[tokio::test]
async fn test_self_referential_macro_terminates() -> Result<(), Box<dyn Error>> {
    let mut macros = HashMap::new();
    macros.insert("#loop".to_string(), "a#loop".to_string());
    // One substitution per round, capped by the recursion limit
    let result = populate_macros("#loop", &macros, &limits());
    assert_eq!(result, format!("{}#loop", "a".repeat(10)));
    Ok(())
}

#[tokio::test]
async fn test_expand_normalizes_and_substitutes() -> Result<(), Box<dyn Error>> {
    let mut macros = HashMap::new();
    macros.insert("#jump".to_string(), "_a600ms".to_string());
    let mut synonyms = HashMap::new();
    synonyms.insert("kappa".to_string(), "#".to_string());

    let result = expand("A [B]*2 Kappa #jump", &macros, &synonyms, &limits());
    assert_eq!(result, "abb#_a600ms");
    Ok(())
}

#[tokio::test]
async fn test_expand_is_idempotent_on_plain_text() -> Result<(), Box<dyn Error>> {
    let macros = HashMap::new();
    let synonyms = HashMap::new();
    let once = expand("a600msb+x", &macros, &synonyms, &limits());
    let twice = expand(&once, &macros, &synonyms, &limits());
    assert_eq!(once, twice);
    Ok(())
}
