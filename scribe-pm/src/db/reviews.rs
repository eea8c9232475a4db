//! Review and review-tip queries

use chrono::Utc;
use scribe_common::api::{Icon, Tip, TipCategory};
use scribe_common::db::{format_timestamp, parse_timestamp};
use scribe_common::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::reviews::{Review, ReviewState, ReviewTip};

fn review_from_row(row: &SqliteRow) -> Result<Review> {
    let id: String = row.try_get("id")?;
    let state: String = row.try_get("state")?;
    let warnings: String = row.try_get("document_warnings")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Review {
        id: Uuid::parse_str(&id)
            .map_err(|e| Error::MalformedRecord(format!("review id '{}': {}", id, e)))?,
        title: row.try_get("title")?,
        premise: row.try_get("premise")?,
        area: row.try_get("area")?,
        state: state.parse()?,
        document_name: row.try_get("document_name")?,
        document_text: row.try_get("document_text")?,
        document_warnings: serde_json::from_str(&warnings)
            .map_err(|e| Error::MalformedRecord(format!("document warnings: {}", e)))?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

fn tip_from_row(row: &SqliteRow) -> Result<ReviewTip> {
    let category: String = row.try_get("category")?;
    let icon: String = row.try_get("icon")?;
    let number: i64 = row.try_get("number")?;
    let completed: i64 = row.try_get("completed")?;

    Ok(ReviewTip {
        tip: Tip {
            id: row.try_get("tip_id")?,
            number: u32::try_from(number)
                .map_err(|_| Error::MalformedRecord(format!("tip number {}", number)))?,
            category: TipCategory::parse(&category).unwrap_or(TipCategory::Estrutura),
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            icon: Icon::parse(&icon).unwrap_or(Icon::Lightbulb),
        },
        completed: completed != 0,
    })
}

pub async fn insert_review(db: &SqlitePool, review: &Review) -> Result<()> {
    let warnings = serde_json::to_string(&review.document_warnings)
        .map_err(|e| Error::Internal(e.to_string()))?;

    sqlx::query(
        r#"
        INSERT INTO reviews (id, title, premise, area, state, document_name, document_text,
                             document_warnings, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(review.id.to_string())
    .bind(&review.title)
    .bind(&review.premise)
    .bind(&review.area)
    .bind(review.state.as_str())
    .bind(&review.document_name)
    .bind(&review.document_text)
    .bind(warnings)
    .bind(format_timestamp(&review.created_at))
    .bind(format_timestamp(&review.updated_at))
    .execute(db)
    .await?;

    Ok(())
}

/// Load one review; `NotFound` when the id is unknown
pub async fn load_review(db: &SqlitePool, id: Uuid) -> Result<Review> {
    let row = sqlx::query("SELECT * FROM reviews WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(db)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Review {}", id)))?;

    review_from_row(&row)
}

/// Store an extracted document, discarding tips of any earlier analysis
pub async fn attach_document(
    db: &SqlitePool,
    id: Uuid,
    document_name: &str,
    document_text: &str,
    warnings: &[String],
) -> Result<()> {
    let warnings =
        serde_json::to_string(warnings).map_err(|e| Error::Internal(e.to_string()))?;

    let mut tx = db.begin().await?;

    let result = sqlx::query(
        r#"
        UPDATE reviews
        SET state = ?, document_name = ?, document_text = ?, document_warnings = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(ReviewState::DocumentAttached.as_str())
    .bind(document_name)
    .bind(document_text)
    .bind(warnings)
    .bind(format_timestamp(&Utc::now()))
    .bind(id.to_string())
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Review {}", id)));
    }

    sqlx::query("DELETE FROM review_tips WHERE review_id = ?")
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// Replace the review's tips and mark it analyzed
pub async fn store_tips(db: &SqlitePool, id: Uuid, tips: &[Tip]) -> Result<()> {
    let mut tx = db.begin().await?;

    let result = sqlx::query("UPDATE reviews SET state = ?, updated_at = ? WHERE id = ?")
        .bind(ReviewState::Analyzed.as_str())
        .bind(format_timestamp(&Utc::now()))
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Review {}", id)));
    }

    sqlx::query("DELETE FROM review_tips WHERE review_id = ?")
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;

    for tip in tips {
        // Duplicate ids from the model keep the first occurrence
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO review_tips
                (review_id, tip_id, number, category, title, description, icon, completed)
            VALUES (?, ?, ?, ?, ?, ?, ?, 0)
            "#,
        )
        .bind(id.to_string())
        .bind(&tip.id)
        .bind(tip.number as i64)
        .bind(tip.category.as_str())
        .bind(&tip.title)
        .bind(&tip.description)
        .bind(tip.icon.as_str())
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Tips ordered by number
pub async fn load_tips(db: &SqlitePool, id: Uuid) -> Result<Vec<ReviewTip>> {
    let rows = sqlx::query("SELECT * FROM review_tips WHERE review_id = ? ORDER BY number, tip_id")
        .bind(id.to_string())
        .fetch_all(db)
        .await?;

    rows.iter().map(tip_from_row).collect()
}

/// Tick or untick one tip
pub async fn set_tip_completed(
    db: &SqlitePool,
    review_id: Uuid,
    tip_id: &str,
    completed: bool,
) -> Result<()> {
    let result =
        sqlx::query("UPDATE review_tips SET completed = ? WHERE review_id = ? AND tip_id = ?")
            .bind(completed as i64)
            .bind(review_id.to_string())
            .bind(tip_id)
            .execute(db)
            .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Tip {} of review {}", tip_id, review_id)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_common::project::NewProject;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        scribe_common::db::init_schema(&pool).await.unwrap();
        pool
    }

    fn review() -> Review {
        Review::new(NewProject {
            title: "Avaliação".to_string(),
            premise: "Premissa".to_string(),
            area: "Ciências da Saúde".to_string(),
        })
    }

    fn tip(number: u32) -> Tip {
        Tip {
            id: format!("tip-{}", number),
            number,
            category: TipCategory::Redacao,
            title: format!("Dica {}", number),
            description: "Descrição".to_string(),
            icon: Icon::CheckCircle,
        }
    }

    #[tokio::test]
    async fn test_insert_and_load_review() {
        let db = setup_test_db().await;
        let review = review();
        insert_review(&db, &review).await.unwrap();

        let loaded = load_review(&db, review.id).await.unwrap();
        assert_eq!(loaded.title, "Avaliação");
        assert_eq!(loaded.state, ReviewState::Created);
        assert!(loaded.document_warnings.is_empty());

        let missing = load_review(&db, Uuid::new_v4()).await;
        assert!(matches!(missing, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_tips_lifecycle() {
        let db = setup_test_db().await;
        let review = review();
        insert_review(&db, &review).await.unwrap();

        let warnings = vec!["Documento muito curto (menos de 1000 caracteres)".to_string()];
        attach_document(&db, review.id, "artigo.txt", "Texto", &warnings)
            .await
            .unwrap();
        let loaded = load_review(&db, review.id).await.unwrap();
        assert_eq!(loaded.state, ReviewState::DocumentAttached);
        assert_eq!(loaded.document_text.as_deref(), Some("Texto"));
        assert_eq!(loaded.document_warnings, warnings);

        store_tips(&db, review.id, &[tip(2), tip(1)]).await.unwrap();
        let tips = load_tips(&db, review.id).await.unwrap();
        assert_eq!(tips.len(), 2);
        assert_eq!(tips[0].tip.number, 1);
        assert_eq!(tips[0].tip.category, TipCategory::Redacao);
        assert!(!tips[0].completed);

        set_tip_completed(&db, review.id, "tip-2", true).await.unwrap();
        let tips = load_tips(&db, review.id).await.unwrap();
        assert!(tips[1].completed);

        let missing = set_tip_completed(&db, review.id, "tip-9", true).await;
        assert!(matches!(missing, Err(Error::NotFound(_))));

        // A new upload discards the analysis
        attach_document(&db, review.id, "v2.txt", "Texto novo", &[])
            .await
            .unwrap();
        assert!(load_tips(&db, review.id).await.unwrap().is_empty());
        assert_eq!(
            load_review(&db, review.id).await.unwrap().state,
            ReviewState::DocumentAttached
        );
    }
}
