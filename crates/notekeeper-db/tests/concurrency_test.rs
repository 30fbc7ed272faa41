//! Concurrent writers against the in-memory SurrealDB engine.

use std::collections::BTreeSet;

use notekeeper_core::models::note::{CreateNote, UpdateNote};
use notekeeper_core::models::user::CreateUser;
use notekeeper_core::repository::{NoteRepository, Pagination, UserRepository};
use notekeeper_db::repository::{SurrealNoteRepository, SurrealUserRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

const WRITERS: i64 = 16;

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    notekeeper_db::run_migrations(&db).await.unwrap();
    db
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_registrations_get_distinct_ids() {
    let repo = SurrealUserRepository::new(setup().await);

    let handles: Vec<_> = (0..WRITERS)
        .map(|i| {
            let repo = repo.clone();
            tokio::spawn(async move {
                repo.create(CreateUser {
                    username: format!("parallel_user_{i}"),
                    email: format!("user{i}@example.com"),
                    password_hash: "hash".into(),
                })
                .await
            })
        })
        .collect();

    let mut ids = BTreeSet::new();
    for handle in handles {
        let user = handle.await.unwrap().unwrap();
        ids.insert(user.id);
    }

    assert_eq!(ids.len(), WRITERS as usize);
    assert!(ids.iter().all(|id| *id >= 1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_edits_each_get_a_version() {
    let repo = SurrealNoteRepository::new(setup().await);
    let created = repo
        .create(
            1,
            CreateNote {
                title: "Shared Note".into(),
                content: "Initial content of the note".into(),
                priority: 1,
            },
        )
        .await
        .unwrap();

    let handles: Vec<_> = (0..WRITERS)
        .map(|i| {
            let repo = repo.clone();
            tokio::spawn(async move {
                repo.update(
                    1,
                    created.id,
                    UpdateNote {
                        title: format!("Shared Note edit {i}"),
                        content: "Edited content of the note".into(),
                        priority: 2,
                    },
                )
                .await
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let history = repo
        .history(1, created.id, Pagination::page(1, 100).unwrap())
        .await
        .unwrap();
    assert_eq!(history.total, WRITERS as u64 + 1);

    let versions: Vec<_> = history.items.iter().map(|v| v.version).collect();
    assert_eq!(versions, (1..=WRITERS as u32 + 1).collect::<Vec<_>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_for_one_owner() {
    let repo = SurrealNoteRepository::new(setup().await);

    let handles: Vec<_> = (0..WRITERS)
        .map(|i| {
            let repo = repo.clone();
            tokio::spawn(async move {
                repo.create(
                    7,
                    CreateNote {
                        title: format!("Parallel note {i}"),
                        content: "Content written in parallel".into(),
                        priority: 0,
                    },
                )
                .await
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let page = repo.list(7, Pagination::page(1, 100).unwrap()).await.unwrap();
    assert_eq!(page.total, WRITERS as u64);
}
