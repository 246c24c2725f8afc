//! Slug generation utilities for human-readable resource identifiers.
//!
//! ## Summary
//! Generates stable, URL-safe slugs from resource names. Slugs are lowercase,
//! alphanumeric with hyphens, and don't change even if the resource name changes.

/// Generate a URL-safe slug from a name.
///
/// Converts to lowercase, replaces spaces and special characters with hyphens,
/// collapses multiple hyphens, and trims edge hyphens.
///
/// Examples:
/// - "Feria de Artesanía" -> "feria-de-artesan-a"
/// - "Yoga @ Playa Chiquita" -> "yoga-playa-chiquita"
#[must_use]
pub fn generate_slug(name: &str) -> String {
    let slug = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    // If slug is a valid uuid, prepend "res-" to avoid conflicts
    if uuid::Uuid::parse_str(&slug).is_ok() {
        format!("res-{slug}")
    } else {
        slug
    }
}

/// Generate a unique event slug: the slugified title plus a random 6-character
/// suffix, so two events named identically never collide.
#[must_use]
pub fn generate_event_slug(title: &str) -> String {
    let base = generate_slug(title);
    let suffix: String = uuid::Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(6)
        .collect();

    if base.is_empty() {
        suffix
    } else {
        format!("{base}-{suffix}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_name() {
        assert_eq!(generate_slug("concierto"), "concierto");
    }

    #[test]
    fn test_with_spaces() {
        assert_eq!(generate_slug("Noche de Salsa"), "noche-de-salsa");
    }

    #[test]
    fn test_with_special_chars() {
        assert_eq!(generate_slug("Surf & Yoga"), "surf-yoga");
    }

    #[test]
    fn test_multiple_spaces() {
        assert_eq!(generate_slug("Feria  Orgánica"), "feria-org-nica");
    }

    #[test]
    fn test_leading_trailing() {
        assert_eq!(generate_slug("  mercado  "), "mercado");
    }

    #[test]
    fn test_uuid_name() {
        let uuid_str = "550e8400-e29b-41d4-a716-446655440000";
        assert_eq!(generate_slug(uuid_str), format!("res-{uuid_str}"));
    }

    #[test]
    fn test_event_slug_has_suffix() {
        let slug = generate_event_slug("Noche de Salsa");
        assert!(slug.starts_with("noche-de-salsa-"));
        assert_eq!(slug.len(), "noche-de-salsa-".len() + 6);
    }

    #[test]
    fn test_event_slugs_are_unique() {
        assert_ne!(generate_event_slug("Feria"), generate_event_slug("Feria"));
    }

    #[test]
    fn test_event_slug_from_symbols_only() {
        let slug = generate_event_slug("!!!");
        assert_eq!(slug.len(), 6);
    }
}
