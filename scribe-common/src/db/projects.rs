//! Project queries

use crate::db::{format_timestamp, parse_timestamp};
use crate::project::{Project, Section};
use crate::{Error, Result};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

const PROJECT_COLUMNS: &str = "id, title, premise, area, objectives, literature, abstract_pt, \
     abstract_en, introduction, methodology, results, created_at, updated_at";

fn project_from_row(row: &SqliteRow) -> Result<Project> {
    let id: String = row.try_get("id")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Project {
        id: Uuid::parse_str(&id)
            .map_err(|e| Error::MalformedRecord(format!("project id '{}': {}", id, e)))?,
        title: row.try_get("title")?,
        premise: row.try_get("premise")?,
        area: row.try_get("area")?,
        objectives: row.try_get("objectives")?,
        literature: row.try_get("literature")?,
        abstract_pt: row.try_get("abstract_pt")?,
        abstract_en: row.try_get("abstract_en")?,
        introduction: row.try_get("introduction")?,
        methodology: row.try_get("methodology")?,
        results: row.try_get("results")?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

pub async fn insert_project(db: &SqlitePool, project: &Project) -> Result<()> {
    sqlx::query(&format!(
        "INSERT INTO projects ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        PROJECT_COLUMNS
    ))
    .bind(project.id.to_string())
    .bind(&project.title)
    .bind(&project.premise)
    .bind(&project.area)
    .bind(&project.objectives)
    .bind(&project.literature)
    .bind(&project.abstract_pt)
    .bind(&project.abstract_en)
    .bind(&project.introduction)
    .bind(&project.methodology)
    .bind(&project.results)
    .bind(format_timestamp(&project.created_at))
    .bind(format_timestamp(&project.updated_at))
    .execute(db)
    .await?;

    Ok(())
}

/// Load one project; `NotFound` when the id is unknown
pub async fn load_project(db: &SqlitePool, id: Uuid) -> Result<Project> {
    let row = sqlx::query(&format!("SELECT {} FROM projects WHERE id = ?", PROJECT_COLUMNS))
        .bind(id.to_string())
        .fetch_optional(db)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Project {}", id)))?;

    project_from_row(&row)
}

/// All projects, most recently updated first
pub async fn list_projects(db: &SqlitePool) -> Result<Vec<Project>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM projects ORDER BY updated_at DESC",
        PROJECT_COLUMNS
    ))
    .fetch_all(db)
    .await?;

    rows.iter().map(project_from_row).collect()
}

/// Persist title, premise and area
pub async fn update_setup(db: &SqlitePool, project: &Project) -> Result<()> {
    let result = sqlx::query(
        "UPDATE projects SET title = ?, premise = ?, area = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&project.title)
    .bind(&project.premise)
    .bind(&project.area)
    .bind(format_timestamp(&project.updated_at))
    .bind(project.id.to_string())
    .execute(db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Project {}", project.id)));
    }
    Ok(())
}

/// Store one section's HTML
///
/// Returns `false` without touching the row when the stored content is
/// already identical.
pub async fn save_section(
    db: &SqlitePool,
    id: Uuid,
    section: Section,
    content: &str,
) -> Result<bool> {
    // Column names come from a closed enum, never from input
    let column = section.column();
    let result = sqlx::query(&format!(
        "UPDATE projects SET {col} = ?, updated_at = ? WHERE id = ? AND {col} <> ?",
        col = column
    ))
    .bind(content)
    .bind(format_timestamp(&Utc::now()))
    .bind(id.to_string())
    .bind(content)
    .execute(db)
    .await?;

    if result.rows_affected() > 0 {
        return Ok(true);
    }

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM projects WHERE id = ?)")
        .bind(id.to_string())
        .fetch_one(db)
        .await?;
    if exists {
        Ok(false)
    } else {
        Err(Error::NotFound(format!("Project {}", id)))
    }
}

/// Store approved abstracts; `None` leaves a language unchanged
pub async fn save_abstracts(
    db: &SqlitePool,
    id: Uuid,
    abstract_pt: Option<&str>,
    abstract_en: Option<&str>,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE projects
        SET abstract_pt = COALESCE(?, abstract_pt),
            abstract_en = COALESCE(?, abstract_en),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(abstract_pt)
    .bind(abstract_en)
    .bind(format_timestamp(&Utc::now()))
    .bind(id.to_string())
    .execute(db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Project {}", id)));
    }
    Ok(())
}

/// Delete a project; returns whether a row was removed
pub async fn delete_project(db: &SqlitePool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM projects WHERE id = ?")
        .bind(id.to_string())
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::NewProject;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::db::init::init_schema(&pool).await.unwrap();
        pool
    }

    fn project(title: &str) -> Project {
        Project::new(NewProject {
            title: title.to_string(),
            premise: "Premissa do estudo".to_string(),
            area: "Engenharias".to_string(),
        })
    }

    #[tokio::test]
    async fn test_insert_and_load() {
        let db = setup_test_db().await;
        let p = project("Pontes de madeira");
        insert_project(&db, &p).await.unwrap();

        let loaded = load_project(&db, p.id).await.unwrap();
        assert_eq!(loaded.title, "Pontes de madeira");
        // Stored at microsecond precision
        assert_eq!(
            format_timestamp(&loaded.created_at),
            format_timestamp(&p.created_at)
        );
        assert!(loaded.results.is_empty());
    }

    #[tokio::test]
    async fn test_load_unknown_is_not_found() {
        let db = setup_test_db().await;
        let err = load_project(&db, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_save_section_reports_change() {
        let db = setup_test_db().await;
        let p = project("Concreto");
        insert_project(&db, &p).await.unwrap();

        assert!(save_section(&db, p.id, Section::Methodology, "<p>Ensaios</p>").await.unwrap());
        assert!(!save_section(&db, p.id, Section::Methodology, "<p>Ensaios</p>").await.unwrap());

        let loaded = load_project(&db, p.id).await.unwrap();
        assert_eq!(loaded.methodology, "<p>Ensaios</p>");
        assert!(loaded.updated_at > p.updated_at);
    }

    #[tokio::test]
    async fn test_save_section_unknown_project() {
        let db = setup_test_db().await;
        let err = save_section(&db, Uuid::new_v4(), Section::Results, "x")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let db = setup_test_db().await;
        let older = project("Antigo");
        let newer = project("Novo");
        insert_project(&db, &older).await.unwrap();
        insert_project(&db, &newer).await.unwrap();

        // Touch the older one so it becomes the most recent
        save_section(&db, older.id, Section::Objectives, "<p>Objetivo</p>")
            .await
            .unwrap();

        let titles: Vec<String> = list_projects(&db)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["Antigo", "Novo"]);
    }

    #[tokio::test]
    async fn test_save_abstracts_keeps_missing_language() {
        let db = setup_test_db().await;
        let p = project("Resumo");
        insert_project(&db, &p).await.unwrap();

        save_abstracts(&db, p.id, Some("Resumo em português"), Some("English abstract"))
            .await
            .unwrap();
        save_abstracts(&db, p.id, Some("Novo resumo"), None).await.unwrap();

        let loaded = load_project(&db, p.id).await.unwrap();
        assert_eq!(loaded.abstract_pt, "Novo resumo");
        assert_eq!(loaded.abstract_en, "English abstract");
    }

    #[tokio::test]
    async fn test_update_setup_and_delete() {
        let db = setup_test_db().await;
        let mut p = project("Título");
        insert_project(&db, &p).await.unwrap();

        p.title = "Outro título".to_string();
        update_setup(&db, &p).await.unwrap();
        assert_eq!(load_project(&db, p.id).await.unwrap().title, "Outro título");

        assert!(delete_project(&db, p.id).await.unwrap());
        assert!(!delete_project(&db, p.id).await.unwrap());
    }
}
