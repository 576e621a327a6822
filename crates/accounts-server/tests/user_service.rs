//! Service behavior that needs a real store underneath.

use std::sync::Arc;

use accounts_server::service::CreateUser;
use accounts_server::store::InMemoryUserStore;
use accounts_server::{UserError, UserService};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_duplicate_creates_admit_one() {
    let store = InMemoryUserStore::new();
    let service = UserService::new(Arc::new(store.clone()));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .create(CreateUser {
                        username: "alex".to_string(),
                        password: format!("password-{}", i),
                        date_joined: None,
                    })
                    .await
            })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(user) => {
                assert_eq!(user.username, "alex");
                created += 1;
            }
            Err(err) => assert_eq!(err, UserError::UsernameTaken),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_create_then_fetch_round_trips() {
    let service = UserService::new(Arc::new(InMemoryUserStore::new()));

    let created = service
        .create(CreateUser {
            username: "alex".to_string(),
            password: "p1".to_string(),
            date_joined: None,
        })
        .await
        .unwrap();
    let fetched = service.fetch_by_username("alex").await.unwrap();

    assert_eq!(created.username, fetched.username);
    assert_eq!(created.date_joined, fetched.date_joined);
}
