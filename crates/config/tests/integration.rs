//! Integration tests for config

#[cfg(test)]
mod tests {
    use morphsweep_config::*;
    use morphsweep_types::{ColorChoice, KeyType, Relation};
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to ensure env var tests don't run concurrently
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    const SAMPLE: &str = r#"
[general]
color = "never"

[database]
url = "sqlite://app.db"

[[entities]]
label = "App\\Models\\Post"
table = "posts"
cascade = true
cascade_delete_morph = ["comments", "tags", "author"]

[entities.relations.comments]
kind = "morph_many"
table = "comments"
morph_type = "commentable_type"
morph_key = "commentable_id"

[entities.relations.tags]
kind = "morph_to_many"
pivot_table = "taggables"
morph_type = "taggable_type"
foreign_pivot_key = "taggable_id"
related_pivot_key = "tag_id"

[entities.relations.author]
kind = "belongs_to"
table = "users"
foreign_key = "user_id"

[[entities]]
label = "App\\Models\\Video"
table = "videos"
key = "uuid"
key_type = "text"
"#;

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{SAMPLE}").unwrap();

        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.general.color, ColorChoice::Never);
        assert_eq!(config.database_url().unwrap(), "sqlite://app.db");
        assert_eq!(config.database.max_connections, 1);
        assert_eq!(config.entities.len(), 2);

        let post = &config.entities[0];
        assert!(post.cascade);
        assert_eq!(post.cascade_delete_morph, ["comments", "tags", "author"]);
        assert_eq!(
            post.relations["tags"],
            Relation::morph_to_many("taggables", "taggable", "tag_id")
        );

        let video = &config.entities[1];
        assert_eq!(video.key, "uuid");
        assert_eq!(video.key_type, KeyType::Text);
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load_from_file(&dir.path().join("absent.toml")).await;
        assert!(matches!(
            result,
            Err(morphsweep_errors::Error::Config(
                morphsweep_errors::ConfigError::NotFound { .. }
            ))
        ));
    }

    #[test]
    fn test_validate_warns_on_non_morph_accessor() {
        let config = Config::from_toml(SAMPLE).unwrap();
        let warnings = config.validate().unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("author"));
    }

    #[test]
    fn test_validate_rejects_undeclared_accessor() {
        let mut config = Config::from_toml(SAMPLE).unwrap();
        config.entities[0]
            .cascade_delete_morph
            .push("images".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_labels() {
        let mut config = Config::from_toml(SAMPLE).unwrap();
        let copy = config.entities[1].clone();
        config.entities.push(copy);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_database_url() {
        let config = Config::default();
        assert!(config.database_url().is_err());
    }

    #[test]
    fn test_merge_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();

        std::env::remove_var("MORPHSWEEP_DATABASE_URL");
        std::env::remove_var("MORPHSWEEP_DRY_RUN");

        std::env::set_var("MORPHSWEEP_DATABASE_URL", "sqlite::memory:");
        std::env::set_var("MORPHSWEEP_DRY_RUN", "yes");

        let mut config = Config::default();
        config.merge_env().unwrap();

        assert_eq!(config.database_url().unwrap(), "sqlite::memory:");
        assert!(config.dry_run());

        // Clean up
        std::env::remove_var("MORPHSWEEP_DATABASE_URL");
        std::env::remove_var("MORPHSWEEP_DRY_RUN");
    }

    #[test]
    fn test_invalid_env_value() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();

        std::env::remove_var("MORPHSWEEP_COLOR");
        std::env::set_var("MORPHSWEEP_COLOR", "sometimes");

        let mut config = Config::default();
        let result = config.merge_env();
        assert!(result.is_err());

        // Clean up
        std::env::remove_var("MORPHSWEEP_COLOR");
    }
}
