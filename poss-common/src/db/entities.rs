//! Entity table operations
//!
//! List-valued fields are stored as `|`-joined strings; an empty string is an
//! empty list.

use sqlx::{Row, SqlitePool};

use crate::catalog::{sample_entities, EntityDefinition};
use crate::Result;

const LIST_SEPARATOR: char = '|';

fn join_list(items: &[String]) -> String {
    items.join(&LIST_SEPARATOR.to_string())
}

fn split_list(data: &str) -> Vec<String> {
    if data.trim().is_empty() {
        Vec::new()
    } else {
        data.split(LIST_SEPARATOR).map(str::to_string).collect()
    }
}

/// Load every stored entity, ordered by insertion
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<EntityDefinition>> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, culture, traits, description, traditions,
               references_list, affected_genders, affected_age_groups
        FROM entities
        ORDER BY rowid
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| EntityDefinition {
            id: row.get("id"),
            name: row.get("name"),
            culture: row.get("culture"),
            traits: split_list(row.get::<&str, _>("traits")),
            description: row.get("description"),
            traditions: split_list(row.get::<&str, _>("traditions")),
            references: split_list(row.get::<&str, _>("references_list")),
            affected_genders: split_list(row.get::<&str, _>("affected_genders")),
            affected_age_groups: split_list(row.get::<&str, _>("affected_age_groups")),
        })
        .collect())
}

/// Insert entities, replacing rows with the same id
pub async fn insert_all(pool: &SqlitePool, entities: &[EntityDefinition]) -> Result<()> {
    let mut tx = pool.begin().await?;

    for entity in entities {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO entities (
                id, name, culture, traits, description, traditions,
                references_list, affected_genders, affected_age_groups
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entity.id)
        .bind(&entity.name)
        .bind(&entity.culture)
        .bind(join_list(&entity.traits))
        .bind(&entity.description)
        .bind(join_list(&entity.traditions))
        .bind(join_list(&entity.references))
        .bind(join_list(&entity.affected_genders))
        .bind(join_list(&entity.affected_age_groups))
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

pub async fn delete_all(pool: &SqlitePool) -> Result<()> {
    sqlx::query("DELETE FROM entities").execute(pool).await?;
    Ok(())
}

pub async fn count(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM entities")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Populate the table with the seed list only if it is empty.
///
/// Returns true when rows were inserted.
pub async fn seed_if_empty(pool: &SqlitePool) -> Result<bool> {
    if count(pool).await? > 0 {
        return Ok(false);
    }

    let seed = sample_entities();
    insert_all(pool, &seed).await?;
    tracing::info!(inserted = seed.len(), "Seeded empty entity table");
    Ok(true)
}

/// Wipe and reseed when fewer than `min_count` rows are stored.
///
/// Returns true when the table was reseeded.
pub async fn replace_with_sample_if_below(pool: &SqlitePool, min_count: i64) -> Result<bool> {
    let current = count(pool).await?;
    if current >= min_count {
        return Ok(false);
    }

    delete_all(pool).await?;
    insert_all(pool, &sample_entities()).await?;
    tracing::info!(previous = current, min_count, "Entity table reseeded from sample list");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_converters() {
        let items = vec!["a".to_string(), "b c".to_string()];
        assert_eq!(join_list(&items), "a|b c");
        assert_eq!(split_list("a|b c"), items);
        assert!(split_list("").is_empty());
        assert!(split_list("   ").is_empty());
        assert_eq!(join_list(&[]), "");
    }
}
