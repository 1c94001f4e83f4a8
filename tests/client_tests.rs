//! Client tests against a mocked Bookshelf API

use reqwest::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bookshelf_server::{
    client::{ClientError, LibraryClient},
    models::{BookFilter, BorrowStatus},
    models::borrow_record::BorrowBook,
};

fn book_json(id: Uuid, title: &str, year: i32, categories: &[Uuid]) -> Value {
    let links: Vec<Value> = categories
        .iter()
        .map(|category_id| {
            json!({
                "bookId": id,
                "categoryId": category_id,
                "category": {
                    "id": category_id,
                    "name": "Science Fiction",
                    "description": null,
                    "createdAt": "2025-01-01T00:00:00Z"
                }
            })
        })
        .collect();

    json!({
        "id": id,
        "title": title,
        "author": "Someone",
        "isbn": null,
        "description": null,
        "coverImageUrl": null,
        "publicationYear": year,
        "publisher": null,
        "pageCount": null,
        "language": null,
        "isAvailable": true,
        "userId": Uuid::new_v4(),
        "createdAt": "2025-01-01T00:00:00Z",
        "updatedAt": "2025-01-01T00:00:00Z",
        "user": null,
        "categories": links,
        "borrowRecords": []
    })
}

fn record_json(id: Uuid, book_id: Uuid, user_id: Uuid, returned: bool) -> Value {
    json!({
        "id": id,
        "borrowedTo": "Charlie",
        "borrowedDate": "2025-01-01T00:00:00Z",
        "dueDate": "2025-01-15T00:00:00Z",
        "returnedDate": if returned { json!("2025-01-10T00:00:00Z") } else { Value::Null },
        "notes": null,
        "bookId": book_id,
        "userId": user_id
    })
}

async fn mock_books(server: &MockServer, books: Value) {
    Mock::given(method("GET"))
        .and(path("/api/books"))
        .respond_with(ResponseTemplate::new(200).set_body_json(books))
        .mount(server)
        .await;
}

fn client(server: &MockServer, user_id: Uuid) -> LibraryClient {
    LibraryClient::new(&format!("{}/api/", server.uri()), user_id).unwrap()
}

#[tokio::test]
async fn test_search_books_filters_locally() {
    let server = MockServer::start().await;
    let sci_fi = Uuid::new_v4();
    let dune = Uuid::new_v4();
    mock_books(
        &server,
        json!([
            book_json(dune, "Dune", 1965, &[sci_fi]),
            book_json(Uuid::new_v4(), "1984", 1949, &[]),
        ]),
    )
    .await;
    let client = client(&server, Uuid::new_v4());

    let by_title = client
        .search_books(&BookFilter {
            title: Some("dune".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_title.len(), 1);
    assert_eq!(by_title[0].book.id, dune);

    let by_year = client
        .search_books(&BookFilter {
            publication_year: Some(1949),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_year.len(), 1);
    assert_eq!(by_year[0].book.title, "1984");

    let by_category = client
        .search_books(&BookFilter {
            category_id: Some(sci_fi),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_category.len(), 1);
    assert!(by_category[0].has_category(sci_fi));

    let all = client.search_books(&BookFilter::default()).await.unwrap();
    let titles: Vec<&str> = all.iter().map(|b| b.book.title.as_str()).collect();
    assert_eq!(titles, vec!["Dune", "1984"]);
}

#[tokio::test]
async fn test_borrow_book_sends_acting_user() {
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4();
    let book_id = Uuid::new_v4();
    let record_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path(format!("/api/books/{}/borrow", book_id)))
        .and(header("x-user-id", user_id.to_string().as_str()))
        .and(body_partial_json(json!({ "borrowedTo": "Charlie" })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(record_json(record_id, book_id, user_id, false)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let request = BorrowBook {
        borrowed_to: "Charlie".to_string(),
        due_date: "2025-01-15T00:00:00Z".parse().unwrap(),
        borrowed_date: None,
        notes: None,
    };
    let record = client(&server, user_id)
        .borrow_book(book_id, &request)
        .await
        .unwrap();

    assert_eq!(record.id, record_id);
    assert_eq!(record.book_id, book_id);
    assert!(record.is_open());
}

#[tokio::test]
async fn test_borrow_conflict_surfaces_server_message() {
    let server = MockServer::start().await;
    let book_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path(format!("/api/books/{}/borrow", book_id)))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "error": "Livre déjà emprunté." })),
        )
        .mount(&server)
        .await;

    let request = BorrowBook {
        borrowed_to: "Dana".to_string(),
        due_date: "2025-01-15T00:00:00Z".parse().unwrap(),
        borrowed_date: None,
        notes: None,
    };
    let err = client(&server, Uuid::new_v4())
        .borrow_book(book_id, &request)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::CONFLICT));
    assert!(matches!(err, ClientError::Api { message, .. } if message == "Livre déjà emprunté."));
}

#[tokio::test]
async fn test_return_book_posts_to_record() {
    let server = MockServer::start().await;
    let user_id = Uuid::new_v4();
    let record_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path(format!("/api/borrow-records/{}/return", record_id)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(record_json(record_id, Uuid::new_v4(), user_id, true)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let record = client(&server, user_id).return_book(record_id).await.unwrap();
    assert!(!record.is_open());
}

#[tokio::test]
async fn test_fetch_book_not_found() {
    let server = MockServer::start().await;
    let book_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/api/books/{}", book_id)))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "error": "Livre non trouvé." })),
        )
        .mount(&server)
        .await;

    let err = client(&server, Uuid::new_v4())
        .fetch_book(book_id)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn test_fetch_borrowed_books_keeps_own_records() {
    let server = MockServer::start().await;
    let me = Uuid::new_v4();
    let mine = Uuid::new_v4();

    let mut own = record_json(mine, Uuid::new_v4(), me, false);
    own["status"] = json!("overdue");
    own["book"] = Value::Null;
    own["user"] = Value::Null;
    let mut other = record_json(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), true);
    other["status"] = json!("returned");
    other["book"] = Value::Null;
    other["user"] = Value::Null;

    Mock::given(method("GET"))
        .and(path("/api/borrow-records"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([own, other])))
        .mount(&server)
        .await;

    let records = client(&server, me).fetch_borrowed_books().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].record.id, mine);
    assert_eq!(records[0].status, BorrowStatus::Overdue);
    assert!(records[0].book.is_none());
}
