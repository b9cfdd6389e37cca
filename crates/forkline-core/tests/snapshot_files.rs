//! Engine built from snapshot and config files, as the CLI does

use forkline_core::{ForkEngine, TreeRequest};
use forkline_model::{
    ConfigError, EngineConfig, EngineError, InMemoryStore, RecipeId, Snapshot, TraversalLimits,
};
use forkline_test_utils::{profile, sample_recipe, trials_with_ratings, RecipeBuilder};
use std::io::Write;
use std::sync::Arc;

fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn snapshot_round_trips_through_a_file() {
    let parent = sample_recipe(1);
    let fork = RecipeBuilder::fork(&parent, 2, "Fork").tags(&["quicker"]).build();
    let snapshot = Snapshot {
        recipes: vec![parent, fork],
        trials: trials_with_ratings(RecipeId::from_u128(2), &[4, 3, 4]),
        profiles: vec![profile(5, 0.2, 0.2)],
    };
    let file = write_temp(".json", &serde_json::to_string(&snapshot).unwrap());

    let raw = std::fs::read_to_string(file.path()).unwrap();
    let loaded: Snapshot = serde_json::from_str(&raw).unwrap();
    let store = Arc::new(InMemoryStore::from_snapshot(loaded));
    assert_eq!(store.recipe_count(), 2);

    let engine = ForkEngine::from_store(EngineConfig::default(), store).unwrap();
    let report = engine.validation(RecipeId::from_u128(2)).await.unwrap();
    assert_eq!(report.stats.total_cooks, 3);

    let g = engine
        .genealogy(RecipeId::from_u128(2), TreeRequest::default())
        .await
        .unwrap();
    assert_eq!(g.total_forks, 1);
}

#[test]
fn toml_config_overrides_defaults() {
    let file = write_temp(
        ".toml",
        r#"
[traversal]
default_depth = 2
max_children_per_node = 5

[ranking]
top_n = 3

[cache]
enabled = false
"#,
    );
    let config = EngineConfig::from_path(file.path()).unwrap();
    assert_eq!(config.traversal.default_depth, 2);
    assert_eq!(config.traversal.max_children_per_node, 5);
    assert_eq!(config.traversal.max_chain_length, 50);
    assert_eq!(config.ranking.top_n, 3);

    let engine = ForkEngine::from_store(config, Arc::new(InMemoryStore::new())).unwrap();
    assert!(engine.cache().is_none());
}

#[test]
fn inverted_thresholds_are_rejected() {
    let file = write_temp(
        ".yaml",
        "traversal:\n  default_depth: 12\n  max_depth: 4\n",
    );
    let err = EngineConfig::from_path(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { field, .. } if field == "traversal.default_depth"));

    let config = EngineConfig::new().with_traversal(TraversalLimits {
        default_depth: 12,
        max_depth: 4,
        ..TraversalLimits::default()
    });
    let err = ForkEngine::from_store(config, Arc::new(InMemoryStore::new())).unwrap_err();
    assert!(matches!(err, EngineError::Config(_)));
}
