//! Best-effort notification delivery

use async_trait::async_trait;
use forkline_core::ForkEngine;
use forkline_model::{
    EngineConfig, ForkEvent, ForkEventKind, InMemoryStore, NotificationSink, RecipeId, StoreError,
};
use forkline_test_utils::{sample_recipe, user, FailingSink, RecipeBuilder, RecordingSink};
use mockall::mock;
use std::sync::Arc;

mock! {
    pub Sink {}

    #[async_trait]
    impl NotificationSink for Sink {
        async fn emit(&self, event: ForkEvent) -> Result<(), StoreError>;
    }
}

fn store_with_fork() -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    let parent = sample_recipe(1);
    store.insert_recipe(RecipeBuilder::fork(&parent, 2, "Fork").author(2).build());
    store.insert_recipe(RecipeBuilder::fork(&parent, 3, "Own fork").author(1).build());
    store.insert_recipe(parent);
    store
}

fn engine_with(store: Arc<InMemoryStore>, sink: Arc<dyn NotificationSink>) -> ForkEngine {
    ForkEngine::from_store(EngineConfig::default(), store)
        .unwrap()
        .with_sink(sink)
}

#[tokio::test]
async fn fork_notifies_parent_author() {
    let mut sink = MockSink::new();
    sink.expect_emit()
        .times(1)
        .withf(|event| {
            event.recipient == user(1)
                && event.kind
                    == ForkEventKind::ForkCreated {
                        fork_id: RecipeId::from_u128(2),
                        parent_id: RecipeId::from_u128(1),
                        forked_by: user(2),
                    }
        })
        .returning(|_| Ok(()));

    let engine = engine_with(store_with_fork(), Arc::new(sink));
    assert!(engine.notify_fork_created(RecipeId::from_u128(2)).await);
}

#[tokio::test]
async fn forking_your_own_recipe_is_silent() {
    let mut sink = MockSink::new();
    sink.expect_emit().never();

    let engine = engine_with(store_with_fork(), Arc::new(sink));
    assert!(!engine.notify_fork_created(RecipeId::from_u128(3)).await);
}

#[tokio::test]
async fn root_recipe_has_nobody_to_notify() {
    let mut sink = MockSink::new();
    sink.expect_emit().never();

    let engine = engine_with(store_with_fork(), Arc::new(sink));
    assert!(!engine.notify_fork_created(RecipeId::from_u128(1)).await);
}

#[tokio::test]
async fn delivery_failure_is_swallowed() {
    let engine = engine_with(store_with_fork(), Arc::new(FailingSink));
    assert!(!engine.notify_fork_created(RecipeId::from_u128(2)).await);
    assert!(!engine.notify_vote(RecipeId::from_u128(1), user(5)).await);
}

#[tokio::test]
async fn votes_reach_the_author() {
    let sink = Arc::new(RecordingSink::default());
    let engine = engine_with(store_with_fork(), sink.clone());

    assert!(engine.notify_vote(RecipeId::from_u128(2), user(9)).await);
    assert!(!engine.notify_vote(RecipeId::from_u128(2), user(2)).await);
    assert!(!engine.notify_vote(RecipeId::from_u128(99), user(9)).await);

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].recipient, user(2));
    assert!(matches!(
        events[0].kind,
        ForkEventKind::VoteCast { voter_id, .. } if voter_id == user(9)
    ));
}
