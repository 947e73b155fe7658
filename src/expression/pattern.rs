use crate::core::{DbError, Result};
use lru::LruCache;
use regex::Regex;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

const REGEX_CACHE_CAPACITY: NonZeroUsize = NonZeroUsize::new(200).unwrap();

lazy_static::lazy_static! {
    static ref REGEX_LRU_CACHE: Arc<Mutex<LruCache<String, Arc<Regex>>>> =
        Arc::new(Mutex::new(LruCache::new(REGEX_CACHE_CAPACITY)));
}

/// Escape LIKE wildcards so the input is matched literally.
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Build a `%value%` substring pattern.
pub fn contains_pattern(value: &str, escape: bool) -> String {
    if escape {
        format!("%{}%", escape_like(value))
    } else {
        format!("%{}%", value)
    }
}

/// Translate a LIKE pattern into an anchored regex.
#[inline]
fn like_to_regex(pattern: &str) -> String {
    let mut regex = String::with_capacity(pattern.len() + 2);
    regex.push('^');

    let chars: Vec<char> = pattern.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '%' => regex.push_str(".*"),
            '_' => regex.push('.'),
            '\\' if i + 1 < chars.len() => {
                i += 1;
                regex.push_str(&regex::escape(&chars[i].to_string()));
            }
            c => regex.push_str(&regex::escape(&c.to_string())),
        }
        i += 1;
    }

    regex.push('$');
    regex
}

/// Patterns without `_` or escapes are answered by plain string search.
#[inline]
fn fast_path_like(text: &str, pattern: &str, case_sensitive: bool) -> Option<bool> {
    if pattern.contains('_') || pattern.contains('\\') {
        return None;
    }

    let (text, pattern) = if case_sensitive {
        (text.to_string(), pattern.to_string())
    } else {
        (text.to_lowercase(), pattern.to_lowercase())
    };

    let wildcards = pattern.matches('%').count();

    if wildcards == 0 {
        return Some(text == pattern);
    }

    if wildcards == 1 && pattern.ends_with('%') {
        return Some(text.starts_with(&pattern[..pattern.len() - 1]));
    }

    if wildcards == 1 && pattern.starts_with('%') {
        return Some(text.ends_with(&pattern[1..]));
    }

    if wildcards == 2 && pattern.len() >= 2 && pattern.starts_with('%') && pattern.ends_with('%') {
        return Some(text.contains(&pattern[1..pattern.len() - 1]));
    }

    None
}

fn get_or_compile_regex(pattern: &str, case_sensitive: bool) -> Result<Arc<Regex>> {
    let cache_key = if case_sensitive {
        format!("s:{}", pattern)
    } else {
        format!("i:{}", pattern)
    };

    {
        let mut cache = REGEX_LRU_CACHE.lock()?;
        if let Some(regex) = cache.get(&cache_key) {
            return Ok(Arc::clone(regex));
        }
    }

    let compiled = regex::RegexBuilder::new(&like_to_regex(pattern))
        .case_insensitive(!case_sensitive)
        .build()
        .map_err(|e| DbError::ExecutionError(format!("Invalid LIKE pattern: {}", e)))?;
    let compiled = Arc::new(compiled);

    REGEX_LRU_CACHE
        .lock()?
        .put(cache_key, Arc::clone(&compiled));

    Ok(compiled)
}

/// Evaluate SQL `LIKE` / `ILIKE`.
#[inline]
pub fn eval_like(text: &str, pattern: &str, case_sensitive: bool) -> Result<bool> {
    if let Some(result) = fast_path_like(text, pattern, case_sensitive) {
        return Ok(result);
    }

    let regex = get_or_compile_regex(pattern, case_sensitive)?;
    Ok(regex.is_match(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fast_paths() {
        assert!(eval_like("Administrator", "%MIN%", false).unwrap());
        assert!(!eval_like("Administrator", "%MIN%", true).unwrap());
        assert!(eval_like("admin", "adm%", true).unwrap());
        assert!(eval_like("superadmin", "%admin", true).unwrap());
        assert!(eval_like("admin", "admin", true).unwrap());
        assert!(eval_like("anything", "%%", true).unwrap());
    }

    #[test]
    fn test_regex_path() {
        assert!(eval_like("user_1", "user_1", true).unwrap());
        assert!(eval_like("userX1", "user_1", true).unwrap());
        assert!(eval_like("a.b", "a.b", true).unwrap());
        assert!(!eval_like("axb", "a.b", true).unwrap());
    }

    #[test]
    fn test_escaped_wildcards_match_literally() {
        let pattern = contains_pattern("50%_off", true);
        assert_eq!(pattern, "%50\\%\\_off%");
        assert!(eval_like("Promo 50%_OFF today", &pattern, false).unwrap());
        assert!(!eval_like("Promo 50 percent off", &pattern, false).unwrap());

        let raw = contains_pattern("50%", false);
        assert!(eval_like("50 percent", &raw, false).unwrap());
    }
}
