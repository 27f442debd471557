use diesel::{prelude::*, sqlite::Sqlite};

use crate::error::ApiError;

const FALLBACK_SLUG: &str = "clinic";

/// Lowercase ASCII alphanumerics with single hyphens between words.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// Picks `base`, then `base-1`, `base-2`, ... until `taken` says no.
pub fn disambiguate<F>(base: &str, mut taken: F) -> Result<String, ApiError>
where
    F: FnMut(&str) -> Result<bool, ApiError>,
{
    if !taken(base)? {
        return Ok(base.to_string());
    }
    let mut counter = 1u32;
    loop {
        let candidate = format!("{}-{}", base, counter);
        if !taken(&candidate)? {
            return Ok(candidate);
        }
        counter += 1;
    }
}

/// Unique slug for a clinic named `name`. `own_id` is excluded so a clinic
/// keeps its slug when renamed to something that slugs the same.
pub fn unique_clinic_slug(
    conn: &mut SqliteConnection,
    name: &str,
    own_id: Option<&str>,
) -> Result<String, ApiError> {
    use crate::schema::clinics;

    let base = slugify(name);
    disambiguate(&base, |candidate| {
        let mut query: clinics::BoxedQuery<'_, Sqlite> = clinics::table
            .filter(clinics::slug.eq(candidate))
            .into_boxed();
        if let Some(own_id) = own_id {
            query = query.filter(clinics::id.ne(own_id.to_string()));
        }
        let res = query.count().get_result::<i64>(conn)?;
        Ok(res > 0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(slugify("Sunny Side Clinic"), "sunny-side-clinic");
        assert_eq!(slugify("  Dr. Smith's  Family & Kids!! "), "dr-smith-s-family-kids");
        assert_eq!(slugify("ACME--Health"), "acme-health");
    }

    #[test]
    fn slugify_never_returns_empty() {
        assert_eq!(slugify("!!!"), "clinic");
        assert_eq!(slugify(""), "clinic");
    }

    #[test]
    fn disambiguate_counts_up() {
        let existing = ["acme", "acme-1"];
        let slug = disambiguate("acme", |c| Ok(existing.contains(&c))).unwrap();
        assert_eq!(slug, "acme-2");

        let slug = disambiguate("fresh", |c| Ok(existing.contains(&c))).unwrap();
        assert_eq!(slug, "fresh");
    }
}
