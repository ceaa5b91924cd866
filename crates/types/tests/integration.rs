//! Integration tests for types

#[cfg(test)]
mod tests {
    use morphsweep_types::*;

    #[test]
    fn test_entity_definition_from_toml() {
        let definition: EntityDefinition = toml::from_str(
            r#"
label = "App\\Models\\Post"
table = "posts"
cascade_delete_morph = ["images"]

[relations.images]
kind = "morph_one"
table = "images"
morph_type = "imageable_type"
morph_key = "imageable_id"
"#,
        )
        .unwrap();

        assert_eq!(definition.key, "id");
        assert_eq!(definition.key_type, KeyType::Integer);
        assert!(!definition.cascade);
        assert_eq!(
            definition.relations["images"],
            Relation::morph_one("images", "imageable")
        );
        assert_eq!(
            definition.meta(),
            EntityMeta::new("App\\Models\\Post", "posts", "id")
        );
    }

    #[test]
    fn test_only_child_owning_morphs_have_descriptors() {
        let pivot = Relation::morph_to_many("taggables", "taggable", "tag_id")
            .morph_descriptor()
            .unwrap();
        assert_eq!(pivot.child_table, "taggables");
        assert_eq!(pivot.morph_key_column, "taggable_id");
        assert_eq!(pivot.kind, RelationKind::ManyToMany);

        let inverse = Relation::MorphTo {
            morph_type: "commentable_type".into(),
            morph_key: "commentable_id".into(),
        };
        assert!(!inverse.is_morphic());
        assert!(inverse.morph_descriptor().is_none());
    }

    #[test]
    fn test_sweep_report_totals_and_json() {
        let descriptor = RelationDescriptor::new(
            "comments",
            "commentable_type",
            "commentable_id",
            RelationKind::OneToMany,
        );
        let report = SweepReport {
            mode: ScanMode::DryRun,
            entities: vec![EntityReport {
                label: "post".into(),
                relations: vec![RelationReport {
                    accessor: "comments".into(),
                    descriptor,
                    labels: vec![
                        LabelOutcome {
                            label: Some("post".into()),
                            parent_table: Some("posts".into()),
                            rows: 2,
                        },
                        LabelOutcome {
                            label: None,
                            parent_table: None,
                            rows: 1,
                        },
                    ],
                    rows: 3,
                }],
                skipped: Vec::new(),
                rows: 3,
            }],
            duration_ms: 4,
        };

        assert_eq!(report.total_rows(), 3);
        assert!(report.entities[0].relations[0].labels[1].is_dangling());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["mode"], "dry_run");
        assert_eq!(
            json["entities"][0]["relations"][0]["labels"][1]["label"],
            serde_json::Value::Null
        );
    }

    #[test]
    fn test_cascade_report_counts_dependents() {
        let report = CascadeReport {
            label: "post".into(),
            key: Some(KeyValue::Text("a-1".into())),
            relations: vec![
                CascadedRelation {
                    accessor: "comments".into(),
                    table: "comments".into(),
                    kind: RelationKind::OneToMany,
                    rows: 3,
                },
                CascadedRelation {
                    accessor: "tags".into(),
                    table: "taggables".into(),
                    kind: RelationKind::ManyToMany,
                    rows: 2,
                },
            ],
            parent_deleted: false,
        };

        assert_eq!(report.dependent_rows(), 5);
        assert_eq!(serde_json::to_value(&report).unwrap()["key"], "a-1");
    }
}
