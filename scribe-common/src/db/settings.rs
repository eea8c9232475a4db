//! Settings database access
//!
//! Read/write settings from the settings table (key-value store).
//! Values are stored as text and parsed on read.

use crate::progress::SectionThresholds;
use crate::{Error, Result};
use sqlx::SqlitePool;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

pub const OBJECTIVES_MIN_WORDS: &str = "objectives_min_words";
pub const LITERATURE_MIN_WORDS: &str = "literature_min_words";
pub const INTRODUCTION_MIN_WORDS: &str = "introduction_min_words";
pub const METHODOLOGY_MIN_WORDS: &str = "methodology_min_words";
pub const RESULTS_MIN_WORDS: &str = "results_min_words";
pub const ABSTRACT_MAX_WORDS: &str = "abstract_max_words";
pub const AUTOSAVE_DEBOUNCE_MS: &str = "autosave_debounce_ms";

/// Default autosave debounce
pub const DEFAULT_AUTOSAVE_DEBOUNCE_MS: u64 = 2000;

/// Settings created by `init_database` when missing
pub const DEFAULT_SETTINGS: [(&str, &str); 7] = [
    (OBJECTIVES_MIN_WORDS, "1"),
    (LITERATURE_MIN_WORDS, "1"),
    (INTRODUCTION_MIN_WORDS, "200"),
    (METHODOLOGY_MIN_WORDS, "150"),
    (RESULTS_MIN_WORDS, "150"),
    (ABSTRACT_MAX_WORDS, "500"),
    (AUTOSAVE_DEBOUNCE_MS, "2000"),
];

/// Generic setting getter
///
/// Returns None if the key doesn't exist or its value is NULL.
pub async fn get_setting<T: FromStr>(db: &SqlitePool, key: &str) -> Result<Option<T>> {
    let value: Option<Option<String>> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(db)
            .await?;

    match value.flatten() {
        Some(s) => match s.parse::<T>() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_) => Err(Error::Config(format!(
                "Failed to parse setting '{}' value: {}",
                key, s
            ))),
        },
        None => Ok(None),
    }
}

/// Generic setting setter (insert or update)
pub async fn set_setting<T: Display>(db: &SqlitePool, key: &str, value: T) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO settings (key, value, updated_at)
        VALUES (?, ?, CURRENT_TIMESTAMP)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(key)
    .bind(value.to_string())
    .execute(db)
    .await?;

    Ok(())
}

/// Read a setting, writing `default` back when missing
///
/// Unparseable values are logged and replaced by the default as well.
pub async fn get_or_init<T>(db: &SqlitePool, key: &str, default: T) -> Result<T>
where
    T: FromStr + Display,
{
    match get_setting::<T>(db, key).await {
        Ok(Some(value)) => Ok(value),
        Ok(None) => {
            set_setting(db, key, &default).await?;
            Ok(default)
        }
        Err(Error::Config(msg)) => {
            warn!("{}; resetting to default {}", msg, default);
            set_setting(db, key, &default).await?;
            Ok(default)
        }
        Err(e) => Err(e),
    }
}

/// Load section thresholds
pub async fn load_thresholds(db: &SqlitePool) -> Result<SectionThresholds> {
    let d = SectionThresholds::default();
    Ok(SectionThresholds {
        objectives_min_words: get_or_init(db, OBJECTIVES_MIN_WORDS, d.objectives_min_words).await?,
        literature_min_words: get_or_init(db, LITERATURE_MIN_WORDS, d.literature_min_words).await?,
        introduction_min_words: get_or_init(db, INTRODUCTION_MIN_WORDS, d.introduction_min_words)
            .await?,
        methodology_min_words: get_or_init(db, METHODOLOGY_MIN_WORDS, d.methodology_min_words)
            .await?,
        results_min_words: get_or_init(db, RESULTS_MIN_WORDS, d.results_min_words).await?,
        abstract_max_words: get_or_init(db, ABSTRACT_MAX_WORDS, d.abstract_max_words).await?,
    })
}

/// Persist every threshold
pub async fn save_thresholds(db: &SqlitePool, thresholds: &SectionThresholds) -> Result<()> {
    set_setting(db, OBJECTIVES_MIN_WORDS, thresholds.objectives_min_words).await?;
    set_setting(db, LITERATURE_MIN_WORDS, thresholds.literature_min_words).await?;
    set_setting(db, INTRODUCTION_MIN_WORDS, thresholds.introduction_min_words).await?;
    set_setting(db, METHODOLOGY_MIN_WORDS, thresholds.methodology_min_words).await?;
    set_setting(db, RESULTS_MIN_WORDS, thresholds.results_min_words).await?;
    set_setting(db, ABSTRACT_MAX_WORDS, thresholds.abstract_max_words).await?;
    Ok(())
}

/// Autosave debounce delay
pub async fn load_autosave_debounce(db: &SqlitePool) -> Result<Duration> {
    let ms = get_or_init(db, AUTOSAVE_DEBOUNCE_MS, DEFAULT_AUTOSAVE_DEBOUNCE_MS).await?;
    Ok(Duration::from_millis(ms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::db::init::create_settings_table(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_get_missing_setting_is_none() {
        let db = setup_test_db().await;
        let value: Option<u32> = get_setting(&db, "nonexistent").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let db = setup_test_db().await;
        set_setting(&db, "introduction_min_words", 250).await.unwrap();
        set_setting(&db, "introduction_min_words", 300).await.unwrap();
        let value: Option<usize> = get_setting(&db, "introduction_min_words").await.unwrap();
        assert_eq!(value, Some(300));
    }

    #[tokio::test]
    async fn test_unparseable_value_is_config_error() {
        let db = setup_test_db().await;
        set_setting(&db, "results_min_words", "lots").await.unwrap();
        let err = get_setting::<usize>(&db, "results_min_words").await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_load_thresholds_writes_back_defaults() {
        let db = setup_test_db().await;
        let thresholds = load_thresholds(&db).await.unwrap();
        assert_eq!(thresholds, SectionThresholds::default());

        let stored: Option<usize> = get_setting(&db, METHODOLOGY_MIN_WORDS).await.unwrap();
        assert_eq!(stored, Some(150));
    }

    #[tokio::test]
    async fn test_load_thresholds_repairs_garbage() {
        let db = setup_test_db().await;
        set_setting(&db, RESULTS_MIN_WORDS, "-3").await.unwrap();
        let thresholds = load_thresholds(&db).await.unwrap();
        assert_eq!(thresholds.results_min_words, 150);
    }

    #[tokio::test]
    async fn test_saved_thresholds_are_loaded() {
        let db = setup_test_db().await;
        let custom = SectionThresholds {
            introduction_min_words: 50,
            ..SectionThresholds::default()
        };
        save_thresholds(&db, &custom).await.unwrap();
        assert_eq!(load_thresholds(&db).await.unwrap(), custom);
    }

    #[tokio::test]
    async fn test_autosave_debounce_default() {
        let db = setup_test_db().await;
        assert_eq!(
            load_autosave_debounce(&db).await.unwrap(),
            Duration::from_millis(2000)
        );
    }
}
