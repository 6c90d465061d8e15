use api_lib::adapters::MemoryStore;
use happy_thoughts_core::{
    domain::Identity,
    ports::{PortError, ThoughtRepository},
    query::{ListQuery, SortOrder},
    service::ThoughtService,
};
use std::sync::Arc;

fn service() -> (ThoughtService, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (ThoughtService::new(store.clone()), store)
}

#[tokio::test]
async fn like_then_unlike_restores_the_stored_thought() {
    let (svc, _) = service();
    let created = svc
        .create(Some("Round trip".to_string()), None)
        .await
        .unwrap();
    let id = created.id.to_string();
    let alice = Identity::new("alice");

    svc.like(&id, &alice).await.unwrap();
    let restored = svc.unlike(&id, &alice).await.unwrap();

    assert_eq!(restored, created);
    assert_eq!(svc.get(&id).await.unwrap(), created);
}

#[tokio::test]
async fn conflicting_likes_leave_state_unchanged() {
    let (svc, _) = service();
    let id = svc
        .create(Some("Popular".to_string()), None)
        .await
        .unwrap()
        .id
        .to_string();
    let bob = Identity::new("bob");

    assert!(matches!(
        svc.unlike(&id, &bob).await,
        Err(PortError::Conflict(_))
    ));
    svc.like(&id, &bob).await.unwrap();
    assert!(matches!(svc.like(&id, &bob).await, Err(PortError::Conflict(_))));

    let stored = svc.get(&id).await.unwrap();
    assert_eq!(stored.hearts, 1);
    assert_eq!(stored.liked_by, vec!["bob".to_string()]);
}

#[tokio::test]
async fn invalid_messages_are_never_persisted() {
    let (svc, store) = service();

    assert!(matches!(
        svc.create(Some("no".to_string()), Some("Fun".to_string())).await,
        Err(PortError::Validation(_))
    ));
    assert!(matches!(
        svc.create(None, None).await,
        Err(PortError::Validation(_))
    ));
    assert!(store.list_thoughts().await.unwrap().is_empty());
}

#[tokio::test]
async fn update_validates_before_looking_up_the_thought() {
    let (svc, _) = service();
    let missing = uuid::Uuid::new_v4().to_string();

    assert!(matches!(
        svc.update_message(&missing, Some("x".to_string())).await,
        Err(PortError::Validation(_))
    ));
    assert!(matches!(
        svc.update_message(&missing, Some("Long enough".to_string())).await,
        Err(PortError::NotFound(_))
    ));
}

#[tokio::test]
async fn deleting_a_missing_thought_leaves_the_store_alone() {
    let (svc, store) = service();
    svc.create(Some("Keeper".to_string()), None).await.unwrap();

    let missing = uuid::Uuid::new_v4().to_string();
    assert!(matches!(svc.delete(&missing).await, Err(PortError::NotFound(_))));
    assert!(matches!(svc.delete("garbage").await, Err(PortError::NotFound(_))));
    assert_eq!(store.list_thoughts().await.unwrap().len(), 1);
}

#[tokio::test]
async fn list_reports_empty_windows_as_not_found() {
    let (svc, _) = service();
    assert!(matches!(
        svc.list(&ListQuery::default()).await,
        Err(PortError::NotFound(_))
    ));

    for message in ["One fun thing", "Two fun things", "Serious"] {
        let category = if message.contains("fun") { "Fun" } else { "Work" };
        svc.create(Some(message.to_string()), Some(category.to_string()))
            .await
            .unwrap();
    }

    let page = svc
        .list(&ListQuery {
            category: Some("FUN".to_string()),
            sort: SortOrder::NewestFirst,
            page: 1,
            limit: 1,
        })
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].category, "Fun");
}

#[tokio::test]
async fn liked_by_returns_an_empty_list_when_nothing_matches() {
    let (svc, _) = service();
    svc.create(Some("Unloved".to_string()), None).await.unwrap();
    assert!(svc.liked_by("carol").await.unwrap().is_empty());
}
