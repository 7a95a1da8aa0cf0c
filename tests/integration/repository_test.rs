// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::create_repository;
use chrono::{Duration, Utc};
use formrs::domain::models::document::StoredDocument;
use formrs::domain::models::document_type::DocumentType;
use formrs::domain::repositories::document_repository::DocumentRepository;
use serde_json::json;
use uuid::Uuid;

fn document(doc_type: DocumentType, minutes_ago: i64) -> StoredDocument {
    let mut doc = StoredDocument::new(
        doc_type,
        json!({"header": {"uap": "12"}, "items": [{"reference": "A"}]}),
        Some("stored".to_string()),
        json!({"filename": "scan.png"}),
    );
    doc.created_at = Utc::now() - Duration::minutes(minutes_ago);
    doc
}

/// 保存后按类型和ID读回，内容保持不变
#[tokio::test]
async fn test_create_and_find_round_trip() {
    let repo = create_repository().await;
    let doc = document(DocumentType::Defauts, 0);

    repo.create(&doc).await.unwrap();

    let found = repo
        .find_by_id(DocumentType::Defauts, doc.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, doc.id);
    assert_eq!(found.document_type, DocumentType::Defauts);
    assert_eq!(found.data, doc.data);
    assert_eq!(found.metadata, doc.metadata);
    assert_eq!(found.remark, doc.remark);

    assert!(repo.find_by_id(DocumentType::Kosu, doc.id).await.unwrap().is_none());
    assert!(repo
        .find_by_id(DocumentType::Defauts, Uuid::new_v4())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_find_all_orders_newest_first_and_limits() {
    let repo = create_repository().await;
    let oldest = document(DocumentType::Rebut, 30);
    let newest = document(DocumentType::Rebut, 1);
    let middle = document(DocumentType::Rebut, 10);
    for doc in [&oldest, &newest, &middle] {
        repo.create(doc).await.unwrap();
    }
    repo.create(&document(DocumentType::Npt, 0)).await.unwrap();

    let all = repo.find_all(DocumentType::Rebut, None).await.unwrap();
    let ids: Vec<Uuid> = all.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![newest.id, middle.id, oldest.id]);

    let limited = repo.find_all(DocumentType::Rebut, Some(2)).await.unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].id, newest.id);
}

#[tokio::test]
async fn test_find_by_ids_filters_type_and_missing() {
    let repo = create_repository().await;
    let kosu = document(DocumentType::Kosu, 0);
    let npt = document(DocumentType::Npt, 0);
    repo.create(&kosu).await.unwrap();
    repo.create(&npt).await.unwrap();

    let found = repo
        .find_by_ids(DocumentType::Kosu, &[kosu.id, npt.id, Uuid::new_v4()])
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, kosu.id);

    assert!(repo.find_by_ids(DocumentType::Kosu, &[]).await.unwrap().is_empty());
}
