use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QuerySelect};

/// Lower-case, ASCII-only slug with single dashes between words.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else if c == '\'' {
            // "O'Brien" -> "obrien"
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("untitled");
    }
    slug
}

/// First of `base`, `base-2`, `base-3`, ... that is not in `taken`.
pub fn next_free_slug(base: &str, taken: &[String]) -> String {
    if !taken.iter().any(|s| s == base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{}-{}", base, n))
        .find(|candidate| !taken.iter().any(|s| s == candidate))
        .unwrap_or_else(|| base.to_string())
}

/// Derive a slug from `name` that is not yet used in `column`.
pub async fn unique_slug<E>(
    db: &DatabaseConnection,
    column: E::Column,
    name: &str,
) -> Result<String, DbErr>
where
    E: EntityTrait,
{
    unique_slug_avoiding::<E>(db, column, name, &[]).await
}

/// Like [`unique_slug`], also treating `reserved` as taken. Used where the
/// slug shares a path segment with static routes.
pub async fn unique_slug_avoiding<E>(
    db: &DatabaseConnection,
    column: E::Column,
    name: &str,
    reserved: &[&str],
) -> Result<String, DbErr>
where
    E: EntityTrait,
{
    let base = slugify(name);
    let mut taken: Vec<String> = E::find()
        .select_only()
        .column(column)
        .filter(column.starts_with(&base))
        .into_tuple()
        .all(db)
        .await?;
    taken.extend(reserved.iter().map(|r| r.to_string()));
    Ok(next_free_slug(&base, &taken))
}
