//! Sweeps and cascade deletes against a real SQLite database

use morphsweep_catalog::{CascadeDelete, EntityRegistry, Model, StaticRegistry};
use morphsweep_errors::{Error, SweepError};
use morphsweep_events::{AppEvent, CascadeEvent, SweepEvent};
use morphsweep_sweep::{create_pool, PoolSettings, Sweeper};
use morphsweep_types::{EntityMeta, KeyValue, Relation, RelationKind, ScanMode, SkipReason};
use sqlx::{Pool, Sqlite};
use std::sync::Arc;
use tempfile::TempDir;

const POST: &str = "App\\Models\\Post";
const VIDEO: &str = "App\\Models\\Video";
const PHOTO: &str = "App\\Models\\Photo";

#[derive(Default)]
struct Post {
    id: Option<i64>,
}

impl Model for Post {
    fn morph_class(&self) -> &str {
        POST
    }

    fn table(&self) -> &str {
        "posts"
    }

    fn key(&self) -> Option<KeyValue> {
        self.id.map(KeyValue::Int)
    }
}

impl CascadeDelete for Post {
    fn cascade_delete_morph(&self) -> Vec<&str> {
        vec!["comments", "tags", "author"]
    }

    fn relation(&self, accessor: &str) -> Option<Relation> {
        match accessor {
            "comments" => Some(Relation::morph_many("comments", "commentable")),
            "tags" => Some(Relation::morph_to_many("taggables", "taggable", "tag_id")),
            "author" => Some(Relation::BelongsTo {
                table: "users".into(),
                foreign_key: "user_id".into(),
            }),
            _ => None,
        }
    }
}

#[derive(Default)]
struct Video {
    id: Option<i64>,
}

impl Model for Video {
    fn morph_class(&self) -> &str {
        VIDEO
    }

    fn table(&self) -> &str {
        "videos"
    }

    fn key(&self) -> Option<KeyValue> {
        self.id.map(KeyValue::Int)
    }
}

impl CascadeDelete for Video {
    fn cascade_delete_morph(&self) -> Vec<&str> {
        vec!["thumbnail"]
    }

    fn relation(&self, accessor: &str) -> Option<Relation> {
        (accessor == "thumbnail").then(|| Relation::morph_one("images", "imageable"))
    }
}

/// Resolvable but never swept
#[derive(Default)]
struct Photo;

impl Model for Photo {
    fn morph_class(&self) -> &str {
        PHOTO
    }

    fn table(&self) -> &str {
        "photos"
    }

    fn key(&self) -> Option<KeyValue> {
        None
    }
}

/// Parent whose attachments table leaves the type column untyped
#[derive(Default)]
struct Gallery;

impl Model for Gallery {
    fn morph_class(&self) -> &str {
        "gallery"
    }

    fn table(&self) -> &str {
        "galleries"
    }

    fn key(&self) -> Option<KeyValue> {
        None
    }
}

impl CascadeDelete for Gallery {
    fn cascade_delete_morph(&self) -> Vec<&str> {
        vec!["attachments"]
    }

    fn relation(&self, accessor: &str) -> Option<Relation> {
        (accessor == "attachments").then(|| Relation::morph_many("attachments", "attachable"))
    }
}

struct Fixture {
    _dir: TempDir,
    pool: Pool<Sqlite>,
    registry: Arc<dyn EntityRegistry>,
}

impl Fixture {
    async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.db");
        let settings = PoolSettings {
            create_if_missing: true,
            ..PoolSettings::default()
        };
        let pool = create_pool(path.to_str().unwrap(), &settings).await.unwrap();

        for statement in [
            "CREATE TABLE posts (id INTEGER PRIMARY KEY, title TEXT)",
            "CREATE TABLE videos (id INTEGER PRIMARY KEY)",
            "CREATE TABLE photos (id INTEGER PRIMARY KEY)",
            "CREATE TABLE users (id INTEGER PRIMARY KEY)",
            "CREATE TABLE tags (id INTEGER PRIMARY KEY, name TEXT)",
            "CREATE TABLE comments \
             (id INTEGER PRIMARY KEY, commentable_type TEXT, commentable_id INTEGER)",
            "CREATE TABLE taggables (tag_id INTEGER, taggable_type TEXT, taggable_id INTEGER)",
            "CREATE TABLE images (id INTEGER PRIMARY KEY, imageable_type TEXT, imageable_id)",
        ] {
            sqlx::query(statement).execute(&pool).await.unwrap();
        }

        let registry = StaticRegistry::builder()
            .cascade::<Post>()
            .cascade::<Video>()
            .entity::<Photo>()
            .build()
            .unwrap();

        Self {
            _dir: dir,
            pool,
            registry: Arc::new(registry),
        }
    }

    fn sweeper(&self) -> Sweeper {
        Sweeper::new(self.pool.clone(), Arc::clone(&self.registry))
    }

    async fn insert(&self, table: &str, ids: &[i64]) {
        for id in ids {
            sqlx::query(&format!("INSERT INTO {table} (id) VALUES (?1)"))
                .bind(id)
                .execute(&self.pool)
                .await
                .unwrap();
        }
    }

    async fn comment(&self, label: Option<&str>, id: i64) {
        sqlx::query("INSERT INTO comments (commentable_type, commentable_id) VALUES (?1, ?2)")
            .bind(label)
            .bind(id)
            .execute(&self.pool)
            .await
            .unwrap();
    }

    async fn tag(&self, tag: i64, label: &str, id: i64) {
        sqlx::query(
            "INSERT INTO taggables (tag_id, taggable_type, taggable_id) VALUES (?1, ?2, ?3)",
        )
        .bind(tag)
        .bind(label)
        .bind(id)
        .execute(&self.pool)
        .await
        .unwrap();
    }

    async fn image(&self, label: &str, id: i64) {
        sqlx::query("INSERT INTO images (imageable_type, imageable_id) VALUES (?1, ?2)")
            .bind(label)
            .bind(id)
            .execute(&self.pool)
            .await
            .unwrap();
    }

    async fn count(&self, sql: &str) -> i64 {
        sqlx::query_scalar(sql).fetch_one(&self.pool).await.unwrap()
    }

    async fn comments_of(&self, label: &str) -> Vec<i64> {
        sqlx::query_scalar(
            "SELECT commentable_id FROM comments \
             WHERE commentable_type = ?1 ORDER BY commentable_id",
        )
        .bind(label)
        .fetch_all(&self.pool)
        .await
        .unwrap()
    }
}

#[tokio::test]
async fn dangling_labels_lose_every_row() {
    let fx = Fixture::new().await;
    fx.insert("posts", &[1]).await;
    fx.comment(Some(POST), 1).await;
    fx.comment(Some("App\\Models\\Legacy"), 1).await;
    fx.comment(Some("App\\Models\\Legacy"), 2).await;

    let removed = fx.sweeper().clean_all().await.unwrap();

    assert_eq!(removed, 2);
    assert_eq!(fx.comments_of("App\\Models\\Legacy").await, Vec::<i64>::new());
    assert_eq!(fx.comments_of(POST).await, [1]);
}

#[tokio::test]
async fn resolved_labels_lose_only_orphans() {
    let fx = Fixture::new().await;
    fx.insert("posts", &[1, 3]).await;
    fx.insert("photos", &[2]).await;
    for id in 1..=4 {
        fx.comment(Some(POST), id).await;
    }
    fx.comment(Some(PHOTO), 2).await;
    fx.comment(Some(PHOTO), 9).await;

    let report = fx.sweeper().sweep().await.unwrap();

    assert_eq!(report.total_rows(), 3);
    assert_eq!(fx.comments_of(POST).await, [1, 3]);
    assert_eq!(fx.comments_of(PHOTO).await, [2]);

    let comments = &report.entities[0].relations[0];
    assert_eq!(comments.accessor, "comments");
    let photo = comments
        .labels
        .iter()
        .find(|l| l.label.as_deref() == Some(PHOTO))
        .unwrap();
    assert_eq!(photo.parent_table.as_deref(), Some("photos"));
    assert!(!photo.is_dangling());
}

#[tokio::test]
async fn second_sweep_removes_nothing() {
    let fx = Fixture::new().await;
    fx.comment(Some(POST), 7).await;
    fx.tag(1, "App\\Models\\Gone", 1).await;
    fx.image(VIDEO, 3).await;

    let sweeper = fx.sweeper();
    assert_eq!(sweeper.clean_all().await.unwrap(), 3);
    assert_eq!(sweeper.clean_all().await.unwrap(), 0);
}

#[tokio::test]
async fn clean_one_touches_only_that_entity_relations() {
    let fx = Fixture::new().await;
    fx.comment(Some(VIDEO), 1).await;
    fx.image(VIDEO, 1).await;
    fx.image("App\\Models\\Gone", 1).await;

    let removed = fx.sweeper().clean_one(&Video::default()).await.unwrap();

    assert_eq!(removed, 2);
    assert_eq!(fx.count("SELECT COUNT(*) FROM images").await, 0);
    assert_eq!(fx.count("SELECT COUNT(*) FROM comments").await, 1);
}

#[tokio::test]
async fn empty_tables_report_zero() {
    let fx = Fixture::new().await;

    let report = fx.sweeper().sweep().await.unwrap();

    assert_eq!(report.total_rows(), 0);
    assert_eq!(report.entities.len(), 2);
    assert!(report.entities[0].relations.iter().all(|r| r.labels.is_empty()));
}

#[tokio::test]
async fn non_morph_accessors_are_skipped() {
    let fx = Fixture::new().await;
    fx.insert("users", &[1, 2]).await;

    let report = fx.sweeper().sweep_entity(&Post::default()).await.unwrap();

    let accessors: Vec<_> = report.relations.iter().map(|r| r.accessor.as_str()).collect();
    assert_eq!(accessors, ["comments", "tags"]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].accessor, "author");
    assert_eq!(report.skipped[0].reason, SkipReason::NonMorphicRelation);
    assert_eq!(fx.count("SELECT COUNT(*) FROM users").await, 2);
}

#[tokio::test]
async fn null_labels_are_removed() {
    let fx = Fixture::new().await;
    fx.comment(None, 1).await;
    fx.comment(None, 2).await;

    let report = fx.sweeper().sweep_entity(&Post::default()).await.unwrap();

    assert_eq!(report.rows, 2);
    let outcome = &report.relations[0].labels[0];
    assert_eq!(outcome.label, None);
    assert!(outcome.is_dangling());
    assert_eq!(fx.count("SELECT COUNT(*) FROM comments").await, 0);
}

#[tokio::test]
async fn dry_run_counts_without_deleting() {
    let fx = Fixture::new().await;
    fx.insert("posts", &[1]).await;
    fx.comment(Some(POST), 1).await;
    fx.comment(Some(POST), 2).await;
    fx.comment(Some("App\\Models\\Gone"), 1).await;
    fx.comment(None, 1).await;

    let sweeper = fx.sweeper().with_mode(ScanMode::DryRun);
    let report = sweeper.sweep().await.unwrap();

    assert_eq!(report.mode, ScanMode::DryRun);
    assert_eq!(report.total_rows(), 3);
    assert_eq!(fx.count("SELECT COUNT(*) FROM comments").await, 4);

    assert_eq!(fx.sweeper().clean_all().await.unwrap(), 3);
}

#[tokio::test]
async fn cascade_delete_is_scoped_to_one_record() {
    let fx = Fixture::new().await;
    fx.insert("posts", &[1, 2]).await;
    fx.insert("videos", &[1]).await;
    fx.comment(Some(POST), 1).await;
    fx.comment(Some(POST), 1).await;
    fx.comment(Some(POST), 2).await;
    fx.comment(Some(VIDEO), 1).await;

    let report = fx.sweeper().delete(&Post { id: Some(1) }).await.unwrap();

    assert_eq!(report.key, Some(KeyValue::Int(1)));
    assert_eq!(report.relations[0].rows, 2);
    assert!(!report.parent_deleted);
    assert_eq!(fx.comments_of(POST).await, [2]);
    assert_eq!(fx.comments_of(VIDEO).await, [1]);
    assert_eq!(fx.count("SELECT COUNT(*) FROM posts").await, 2);
}

#[tokio::test]
async fn many_to_many_cascade_only_detaches_pivot_rows() {
    let fx = Fixture::new().await;
    fx.insert("posts", &[1]).await;
    fx.insert("tags", &[10, 11]).await;
    fx.tag(10, POST, 1).await;
    fx.tag(11, POST, 1).await;
    fx.tag(10, VIDEO, 1).await;

    let report = fx.sweeper().delete(&Post { id: Some(1) }).await.unwrap();

    let tags = report.relations.iter().find(|r| r.accessor == "tags").unwrap();
    assert_eq!(tags.kind, RelationKind::ManyToMany);
    assert_eq!(tags.table, "taggables");
    assert_eq!(tags.rows, 2);
    assert_eq!(fx.count("SELECT COUNT(*) FROM taggables").await, 1);
    assert_eq!(fx.count("SELECT COUNT(*) FROM tags").await, 2);
}

#[tokio::test]
async fn cascade_without_key_issues_nothing() {
    let fx = Fixture::new().await;
    fx.comment(Some(POST), 1).await;

    let report = fx.sweeper().delete(&Post::default()).await.unwrap();

    assert_eq!(report.key, None);
    assert!(report.relations.is_empty());
    assert_eq!(fx.count("SELECT COUNT(*) FROM comments").await, 1);
}

#[tokio::test]
async fn delete_with_dependents_removes_the_record() {
    let fx = Fixture::new().await;
    fx.insert("posts", &[1, 2]).await;
    fx.comment(Some(POST), 1).await;
    fx.tag(10, POST, 1).await;

    let report = fx
        .sweeper()
        .delete_with_dependents(&Post { id: Some(1) })
        .await
        .unwrap();

    assert!(report.parent_deleted);
    assert_eq!(report.dependent_rows(), 2);
    assert_eq!(fx.count("SELECT COUNT(*) FROM posts").await, 1);
    assert_eq!(fx.count("SELECT COUNT(*) FROM comments").await, 0);
}

#[tokio::test]
async fn delete_with_dependents_requires_a_key() {
    let fx = Fixture::new().await;

    let err = fx
        .sweeper()
        .delete_with_dependents(&Post::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Sweep(SweepError::MissingParentKey { .. })
    ));
}

#[tokio::test]
async fn failed_cascade_rolls_back() {
    let fx = Fixture::new().await;
    fx.insert("posts", &[1]).await;
    fx.comment(Some(POST), 1).await;
    sqlx::query("DROP TABLE taggables")
        .execute(&fx.pool)
        .await
        .unwrap();

    let result = fx
        .sweeper()
        .delete_with_dependents(&Post { id: Some(1) })
        .await;

    assert!(result.is_err());
    assert_eq!(fx.count("SELECT COUNT(*) FROM comments").await, 1);
    assert_eq!(fx.count("SELECT COUNT(*) FROM posts").await, 1);
}

#[tokio::test]
async fn text_keys_and_custom_key_columns_resolve() {
    let fx = Fixture::new().await;
    sqlx::query("CREATE TABLE accounts (uuid TEXT PRIMARY KEY)")
        .execute(&fx.pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO accounts (uuid) VALUES ('a-1')")
        .execute(&fx.pool)
        .await
        .unwrap();
    sqlx::query(
        "INSERT INTO images (imageable_type, imageable_id) \
         VALUES ('account', 'a-1'), ('account', 'a-2')",
    )
    .execute(&fx.pool)
    .await
    .unwrap();

    let registry = StaticRegistry::builder()
        .cascade::<Video>()
        .alias(EntityMeta::new("account", "accounts", "uuid"))
        .build()
        .unwrap();
    let sweeper = Sweeper::new(fx.pool.clone(), Arc::new(registry));

    assert_eq!(sweeper.clean_all().await.unwrap(), 1);
    let left: Vec<String> = sqlx::query_scalar("SELECT imageable_id FROM images")
        .fetch_all(&fx.pool)
        .await
        .unwrap();
    assert_eq!(left, ["a-1"]);
}

#[tokio::test]
async fn events_share_one_correlation_id() {
    let fx = Fixture::new().await;
    fx.comment(Some("App\\Models\\Gone"), 1).await;
    let (tx, mut rx) = morphsweep_events::channel();

    let sweeper = fx.sweeper().with_event_sender(tx);
    sweeper.clean_all().await.unwrap();
    sweeper.delete(&Post { id: Some(5) }).await.unwrap();
    drop(sweeper);

    let mut messages = Vec::new();
    while let Some(message) = rx.recv().await {
        messages.push(message);
    }

    let sweep_id = messages[0].meta.correlation_id.clone().unwrap();
    assert!(matches!(
        messages[0].event,
        AppEvent::Sweep(SweepEvent::Started { entities: 2, .. })
    ));
    let completed = messages
        .iter()
        .position(|m| matches!(m.event, AppEvent::Sweep(SweepEvent::Completed { rows: 1, .. })))
        .unwrap();
    assert!(messages[..=completed]
        .iter()
        .all(|m| m.meta.correlation_id.as_deref() == Some(sweep_id.as_str())));

    let cascade = &messages[completed + 1..];
    assert!(matches!(
        cascade[0].event,
        AppEvent::Cascade(CascadeEvent::Started { .. })
    ));
    assert_ne!(cascade[0].meta.correlation_id.as_deref(), Some(sweep_id.as_str()));
    assert!(matches!(
        cascade.last().unwrap().event,
        AppEvent::Cascade(CascadeEvent::Completed { rows: 0, .. })
    ));
}

#[tokio::test]
async fn integer_labels_in_untyped_columns_are_swept() {
    let fx = Fixture::new().await;
    for statement in [
        "CREATE TABLE galleries (id INTEGER PRIMARY KEY)",
        "CREATE TABLE attachments (id INTEGER PRIMARY KEY, attachable_type, attachable_id)",
        "INSERT INTO galleries (id) VALUES (1)",
        "INSERT INTO attachments (attachable_type, attachable_id) \
         VALUES ('gallery', 1), ('gallery', 2), (7, 1)",
    ] {
        sqlx::query(statement).execute(&fx.pool).await.unwrap();
    }
    let registry = StaticRegistry::builder()
        .cascade::<Gallery>()
        .build()
        .unwrap();
    let sweeper = Sweeper::new(fx.pool.clone(), Arc::new(registry));

    let report = sweeper.sweep().await.unwrap();

    assert_eq!(report.total_rows(), 2);
    let labels = &report.entities[0].relations[0].labels;
    let numeric = labels
        .iter()
        .find(|o| o.label.as_deref() == Some("7"))
        .unwrap();
    assert_eq!(numeric.rows, 1);
    let left: Vec<(String, i64)> =
        sqlx::query_as("SELECT attachable_type, attachable_id FROM attachments")
            .fetch_all(&fx.pool)
            .await
            .unwrap();
    assert_eq!(left, [("gallery".to_string(), 1)]);
}

#[tokio::test]
async fn failed_scan_keeps_earlier_label_deletions() {
    let fx = Fixture::new().await;
    fx.insert("photos", &[2]).await;
    fx.comment(Some(PHOTO), 2).await;
    fx.comment(Some(PHOTO), 9).await;
    fx.comment(Some(POST), 1).await;
    sqlx::query("DROP TABLE posts")
        .execute(&fx.pool)
        .await
        .unwrap();

    let err = fx.sweeper().sweep_entity(&Post::default()).await.unwrap_err();

    assert!(matches!(err, Error::Sweep(SweepError::Database { .. })));
    assert_eq!(fx.comments_of(PHOTO).await, [2]);
    assert_eq!(fx.comments_of(POST).await, [1]);
}
