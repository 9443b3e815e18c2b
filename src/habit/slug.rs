use std::collections::HashSet;

const FALLBACK_SLUG: &str = "habit";

/// Lowercases `title`, keeps ASCII alphanumerics and collapses every other run
/// of characters into a single underscore.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_sep = false;
    for ch in title.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_sep = false;
        } else if !slug.is_empty() && !last_sep {
            slug.push('_');
            last_sep = true;
        }
    }
    let trimmed = slug.trim_matches('_');
    if trimmed.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Slug of `title` that does not collide with anything in `taken`.
pub fn unique_slug(title: &str, taken: &HashSet<String>) -> String {
    let base = slugify(title);
    if !taken.contains(&base) {
        return base;
    }
    (2..)
        .map(|n| format!("{base}_{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Morning Exercise"), "morning_exercise");
        assert_eq!(slugify("  Read -- 20 pages!  "), "read_20_pages");
        assert_eq!(slugify("Café au lait"), "caf_au_lait");
        assert_eq!(slugify("!!!"), "habit");
    }

    #[test]
    fn unique_slug_appends_counter() {
        let taken: HashSet<String> = ["meditate".to_string(), "meditate_2".to_string()].into();
        assert_eq!(unique_slug("Meditate", &taken), "meditate_3");
        assert_eq!(unique_slug("Stretch", &taken), "stretch");
    }
}
