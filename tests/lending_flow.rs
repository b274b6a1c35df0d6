//! End-to-end lending scenarios against the in-memory store

use bookshare_server::{
    config::AppConfig,
    models::{
        user::{LoginRequest, SignupRequest},
        BookQuery, BookStatus, CreateBook, TransactionAction,
        TransactionStatus, User,
    },
    repository::Repository,
    services::Services,
    AppError,
};

fn services(strict_transitions: bool) -> Services {
    let mut config = AppConfig::default();
    config.database.in_memory = true;
    config.lending.strict_transitions = strict_transitions;
    Services::new(Repository::in_memory(), &config).unwrap()
}

async fn signup(services: &Services, name: &str) -> User {
    services
        .auth
        .signup(SignupRequest {
            email: format!("{}@example.org", name),
            password: "secret".to_string(),
            full_name: name.to_string(),
            unit_no: "12".to_string(),
            whatsapp_no: "+15550100".to_string(),
        })
        .await
        .unwrap()
}

fn create_book(title: &str) -> CreateBook {
    CreateBook {
        title: title.to_string(),
        author: "Frank Herbert".to_string(),
        isbn: None,
        description: None,
        cover_image: None,
        condition: "Good".to_string(),
        category: "Fiction".to_string(),
    }
}

/// Fresh copy of the user, as the auth gate would resolve it
async fn reload(services: &Services, user: &User) -> User {
    let token = services
        .auth
        .login(&LoginRequest {
            email: user.email.clone(),
            password: "secret".to_string(),
        })
        .await
        .unwrap();
    services.auth.resolve(&token).await.unwrap()
}

async fn credits(services: &Services, user: &User) -> i32 {
    reload(services, user).await.credits
}

#[tokio::test]
async fn test_full_lending_cycle() {
    let services = services(false);
    let alice = signup(&services, "alice").await;
    let bob = signup(&services, "bob").await;

    let book = services
        .catalog
        .create_book(create_book("Dune"), alice.id)
        .await
        .unwrap();
    assert_eq!(book.status, BookStatus::Available);
    assert_eq!(credits(&services, &alice).await, 4);

    let txn = services.lending.request(book.id, &bob).await.unwrap();
    assert_eq!(txn.status, TransactionStatus::Requested);
    assert_eq!(txn.owner_id, alice.id);
    assert!(services
        .catalog
        .list_books(&BookQuery::default())
        .await
        .unwrap()
        .is_empty());

    let txn = services
        .lending
        .act(txn.id, TransactionAction::Approve, &alice)
        .await
        .unwrap();
    assert_eq!(txn.status, TransactionStatus::Approved);
    assert_eq!(credits(&services, &bob).await, 2);

    let txn = services
        .lending
        .act(txn.id, TransactionAction::Handover, &alice)
        .await
        .unwrap();
    assert_eq!(txn.status, TransactionStatus::Completed);
    let owned = services.catalog.my_books(alice.id).await.unwrap();
    assert_eq!(owned[0].status, BookStatus::Exchanged);

    let txn = services
        .lending
        .act(txn.id, TransactionAction::Return, &alice)
        .await
        .unwrap();
    assert_eq!(txn.status, TransactionStatus::Returned);

    let listed = services
        .catalog
        .list_books(&BookQuery::default())
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, book.id);

    // Credits move only on approval
    assert_eq!(credits(&services, &alice).await, 4);
    assert_eq!(credits(&services, &bob).await, 2);
}

#[tokio::test]
async fn test_permissive_mode_charges_every_approval() {
    let services = services(false);
    let alice = signup(&services, "alice").await;
    let bob = signup(&services, "bob").await;
    let book = services
        .catalog
        .create_book(create_book("Dune"), alice.id)
        .await
        .unwrap();

    let txn = services.lending.request(book.id, &bob).await.unwrap();
    services
        .lending
        .act(txn.id, TransactionAction::Approve, &alice)
        .await
        .unwrap();
    let again = services
        .lending
        .act(txn.id, TransactionAction::Approve, &alice)
        .await
        .unwrap();

    assert_eq!(again.status, TransactionStatus::Approved);
    assert_eq!(credits(&services, &bob).await, 1);
}

#[tokio::test]
async fn test_strict_mode_rejects_second_approval() {
    let services = services(true);
    let alice = signup(&services, "alice").await;
    let bob = signup(&services, "bob").await;
    let book = services
        .catalog
        .create_book(create_book("Dune"), alice.id)
        .await
        .unwrap();

    let txn = services.lending.request(book.id, &bob).await.unwrap();
    services
        .lending
        .act(txn.id, TransactionAction::Approve, &alice)
        .await
        .unwrap();
    let result = services
        .lending
        .act(txn.id, TransactionAction::Approve, &alice)
        .await;

    assert!(matches!(result, Err(AppError::StateConflict(_))));
    assert_eq!(credits(&services, &bob).await, 2);
}

#[tokio::test]
async fn test_strict_mode_rejects_skipped_handover() {
    let services = services(true);
    let alice = signup(&services, "alice").await;
    let bob = signup(&services, "bob").await;
    let book = services
        .catalog
        .create_book(create_book("Dune"), alice.id)
        .await
        .unwrap();

    let txn = services.lending.request(book.id, &bob).await.unwrap();
    let result = services
        .lending
        .act(txn.id, TransactionAction::Return, &alice)
        .await;

    assert!(matches!(result, Err(AppError::StateConflict(_))));
}

#[tokio::test]
async fn test_cannot_request_own_book() {
    let services = services(false);
    let alice = signup(&services, "alice").await;
    let book = services
        .catalog
        .create_book(create_book("Dune"), alice.id)
        .await
        .unwrap();

    let result = services.lending.request(book.id, &alice).await;
    assert!(matches!(result, Err(AppError::StateConflict(msg)) if msg == "Cannot request own book"));
}

#[tokio::test]
async fn test_insufficient_credits_changes_nothing() {
    let services = services(false);
    let alice = signup(&services, "alice").await;
    let bob = signup(&services, "bob").await;

    let mut books = Vec::new();
    for title in ["One", "Two", "Three", "Four"] {
        books.push(
            services
                .catalog
                .create_book(create_book(title), alice.id)
                .await
                .unwrap(),
        );
    }

    for book in &books[..3] {
        let txn = services.lending.request(book.id, &bob).await.unwrap();
        services
            .lending
            .act(txn.id, TransactionAction::Approve, &alice)
            .await
            .unwrap();
    }
    assert_eq!(credits(&services, &bob).await, 0);

    let bob = reload(&services, &bob).await;
    let result = services.lending.request(books[3].id, &bob).await;
    assert!(matches!(result, Err(AppError::StateConflict(msg)) if msg == "Insufficient credits"));

    let listed = services
        .catalog
        .list_books(&BookQuery::default())
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, books[3].id);
    assert_eq!(services.lending.my_requests(bob.id).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_approval_fails_when_borrower_ran_out() {
    let services = services(false);
    let alice = signup(&services, "alice").await;
    let bob = signup(&services, "bob").await;

    let mut requests = Vec::new();
    for title in ["One", "Two", "Three", "Four"] {
        let book = services
            .catalog
            .create_book(create_book(title), alice.id)
            .await
            .unwrap();
        requests.push(services.lending.request(book.id, &bob).await.unwrap());
    }

    for txn in &requests[..3] {
        services
            .lending
            .act(txn.id, TransactionAction::Approve, &alice)
            .await
            .unwrap();
    }

    let result = services
        .lending
        .act(requests[3].id, TransactionAction::Approve, &alice)
        .await;
    assert!(matches!(result, Err(AppError::StateConflict(msg)) if msg == "Borrower lost credits"));
    assert_eq!(credits(&services, &bob).await, 0);
}

#[tokio::test]
async fn test_only_owner_may_act() {
    let services = services(false);
    let alice = signup(&services, "alice").await;
    let bob = signup(&services, "bob").await;
    let book = services
        .catalog
        .create_book(create_book("Dune"), alice.id)
        .await
        .unwrap();

    let txn = services.lending.request(book.id, &bob).await.unwrap();
    let result = services
        .lending
        .act(txn.id, TransactionAction::Approve, &bob)
        .await;

    assert!(matches!(result, Err(AppError::Authorization(_))));
    assert_eq!(credits(&services, &bob).await, 3);
}

#[tokio::test]
async fn test_my_requests_lists_both_sides() {
    let services = services(false);
    let alice = signup(&services, "alice").await;
    let bob = signup(&services, "bob").await;
    let carol = signup(&services, "carol").await;

    let dune = services
        .catalog
        .create_book(create_book("Dune"), alice.id)
        .await
        .unwrap();
    let emma = services
        .catalog
        .create_book(create_book("Emma"), bob.id)
        .await
        .unwrap();

    let first = services.lending.request(dune.id, &bob).await.unwrap();
    let second = services.lending.request(emma.id, &carol).await.unwrap();

    let bob_view = services.lending.my_requests(bob.id).await.unwrap();
    let ids: Vec<i32> = bob_view.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);
    assert_eq!(bob_view[0].owner.id, alice.id);
    assert_eq!(bob_view[0].book.title, "Dune");
    assert_eq!(bob_view[1].borrower.id, carol.id);

    let alice_view = services.lending.my_requests(alice.id).await.unwrap();
    assert_eq!(alice_view.len(), 1);
}

#[tokio::test]
async fn test_request_missing_book() {
    let services = services(false);
    let bob = signup(&services, "bob").await;

    let result = services.lending.request(42, &bob).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}
