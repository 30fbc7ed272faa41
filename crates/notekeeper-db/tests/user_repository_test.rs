//! Integration tests for User repository using in-memory SurrealDB.

use notekeeper_core::error::NotekeeperError;
use notekeeper_core::models::note::CreateNote;
use notekeeper_core::models::user::CreateUser;
use notekeeper_core::repository::{NoteRepository, Pagination, UserRepository};
use notekeeper_db::repository::{SurrealNoteRepository, SurrealUserRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    notekeeper_db::run_migrations(&db).await.unwrap();
    db
}

fn alice() -> CreateUser {
    CreateUser {
        username: "alice_wonder".into(),
        email: "alice@example.com".into(),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".into(),
    }
}

#[tokio::test]
async fn create_and_get_user() {
    let repo = SurrealUserRepository::new(setup().await);

    let user = repo.create(alice()).await.unwrap();
    assert_eq!(user.username, "alice_wonder");
    assert_eq!(user.email, "alice@example.com");
    assert!(user.password_hash.starts_with("$argon2id$"));

    let fetched = repo.get_by_id(user.id).await.unwrap();
    assert_eq!(fetched.id, user.id);
    assert_eq!(fetched.email, user.email);

    let by_email = repo.get_by_email("alice@example.com").await.unwrap();
    assert_eq!(by_email.id, user.id);
    assert_eq!(by_email.password_hash, user.password_hash);
}

#[tokio::test]
async fn ids_are_sequential_integers() {
    let repo = SurrealUserRepository::new(setup().await);

    let first = repo.create(alice()).await.unwrap();
    let second = repo
        .create(CreateUser {
            username: "bob_builder".into(),
            email: "bob@example.com".into(),
            password_hash: "hash".into(),
        })
        .await
        .unwrap();

    assert_eq!(first.id, 1);
    assert_eq!(second.id, 2);
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let repo = SurrealUserRepository::new(setup().await);

    repo.create(alice()).await.unwrap();
    let err = repo.create(alice()).await.unwrap_err();
    assert!(
        matches!(err, NotekeeperError::AlreadyExists { ref entity } if entity == "user"),
        "expected AlreadyExists, got {err:?}"
    );
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let repo = SurrealUserRepository::new(setup().await);

    assert!(matches!(
        repo.get_by_id(999).await,
        Err(NotekeeperError::NotFound { .. })
    ));
    assert!(matches!(
        repo.get_by_email("nobody@example.com").await,
        Err(NotekeeperError::NotFound { .. })
    ));
}

#[tokio::test]
async fn delete_removes_user_and_notes() {
    let db = setup().await;
    let users = SurrealUserRepository::new(db.clone());
    let notes = SurrealNoteRepository::new(db);

    let user = users.create(alice()).await.unwrap();
    let note = notes
        .create(
            user.id,
            CreateNote {
                title: "Groceries".into(),
                content: "Milk, eggs and bread".into(),
                priority: 1,
            },
        )
        .await
        .unwrap();

    users.delete(user.id).await.unwrap();

    assert!(matches!(
        users.get_by_id(user.id).await,
        Err(NotekeeperError::NotFound { .. })
    ));
    let remaining = notes.list(user.id, Pagination::default()).await.unwrap();
    assert_eq!(remaining.total, 0);
    let history = notes
        .history(user.id, note.id, Pagination::default())
        .await
        .unwrap();
    assert_eq!(history.total, 0);

    assert!(matches!(
        users.delete(user.id).await,
        Err(NotekeeperError::NotFound { .. })
    ));
}

#[tokio::test]
async fn failed_delete_leaves_user_and_notes_intact() {
    let db = setup().await;
    let users = SurrealUserRepository::new(db.clone());
    let notes = SurrealNoteRepository::new(db.clone());

    let user = users.create(alice()).await.unwrap();
    let note = notes
        .create(
            user.id,
            CreateNote {
                title: "Groceries".into(),
                content: "Milk, eggs and bread".into(),
                priority: 1,
            },
        )
        .await
        .unwrap();

    // Make the final statement of the cascade fail.
    db.query(
        "DEFINE EVENT block_user_delete ON TABLE user \
         WHEN $event = 'DELETE' THEN { THROW 'user deletion blocked' };",
    )
    .await
    .unwrap()
    .check()
    .unwrap();

    let err = users.delete(user.id).await.unwrap_err();
    assert!(
        matches!(err, NotekeeperError::Database(_)),
        "expected Database, got {err:?}"
    );

    assert_eq!(users.get_by_id(user.id).await.unwrap().email, user.email);
    assert_eq!(notes.get(user.id, note.id).await.unwrap().title, "Groceries");
    let history = notes
        .history(user.id, note.id, Pagination::default())
        .await
        .unwrap();
    assert_eq!(history.total, 1);
}
