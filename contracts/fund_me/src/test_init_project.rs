use std::sync::Arc;

use crate::invariants::{assert_fresh_project, assert_project_rederives};
use crate::{
    Address, Clock, Error, Field, FundMe, ManualClock, MemoryStore, ProjectMetadata,
    ValidationError, DEFAULT_PROGRAM_ID,
};

const NOW: i64 = 1_750_000_000;

fn setup() -> FundMe<MemoryStore, Arc<ManualClock>> {
    FundMe::new(
        DEFAULT_PROGRAM_ID,
        MemoryStore::new(),
        Arc::new(ManualClock::new(NOW)),
    )
}

fn metadata(title: &str, description: &str, image_url: &str) -> ProjectMetadata {
    ProjectMetadata {
        title: title.to_string(),
        description: description.to_string(),
        image_url: image_url.to_string(),
    }
}

fn valid_metadata() -> ProjectMetadata {
    metadata(
        "Valid Title",
        "Valid description",
        "https://example.com/image.png",
    )
}

fn expect_validation(result: crate::Result<crate::Project>, field: Field) {
    match result {
        Err(Error::Validation(e)) => assert_eq!(e.field(), field),
        other => panic!("expected validation error on {field}, got {other:?}"),
    }
}

#[tokio::test]
async fn test_init_project_with_correct_data() {
    let ledger = setup();
    let owner = Address::new([7u8; 32]);
    let meta = metadata(
        "My First Project",
        "This is a test project for fundraising",
        "https://example.com/image.png",
    );
    let end_time = NOW + 86_400;

    let created = ledger
        .init_project(owner, "project-1", meta.clone(), 1_000_000_000, end_time)
        .await
        .unwrap();

    let (address, bump) = ledger.project_address(&owner, "project-1").unwrap();
    let fetched = ledger.get_project(&address).await.unwrap();

    assert_eq!(created, fetched);
    assert_fresh_project(&fetched, &owner, "project-1", &meta, 1_000_000_000, end_time);
    assert_eq!(fetched.bump, bump);
    assert_project_rederives(&fetched, &address, &DEFAULT_PROGRAM_ID);
}

#[tokio::test]
async fn test_multiple_projects_for_same_owner_have_distinct_addresses() {
    let ledger = setup();
    let owner = Address::new([7u8; 32]);

    for id in ["project-1", "project-2", "project-3"] {
        ledger
            .init_project(owner, id, valid_metadata(), 500_000_000, NOW + 86_400)
            .await
            .unwrap();
    }

    let a1 = ledger.project_address(&owner, "project-1").unwrap().0;
    let a2 = ledger.project_address(&owner, "project-2").unwrap().0;
    let a3 = ledger.project_address(&owner, "project-3").unwrap().0;
    assert_ne!(a1, a2);
    assert_ne!(a1, a3);
    assert_ne!(a2, a3);

    assert_eq!(ledger.get_project(&a2).await.unwrap().project_id, "project-2");
    assert_eq!(ledger.get_project(&a3).await.unwrap().project_id, "project-3");
    assert_eq!(ledger.store().project_count().unwrap(), 3);
}

#[tokio::test]
async fn test_same_project_id_for_different_owners() {
    let ledger = setup();
    let alice = Address::new([1u8; 32]);
    let bob = Address::new([2u8; 32]);

    ledger
        .init_project(alice, "shared", valid_metadata(), 10, NOW + 60)
        .await
        .unwrap();
    ledger
        .init_project(bob, "shared", valid_metadata(), 20, NOW + 60)
        .await
        .unwrap();

    let alice_project = ledger.project_address(&alice, "shared").unwrap().0;
    let bob_project = ledger.project_address(&bob, "shared").unwrap().0;
    assert_eq!(ledger.get_project(&alice_project).await.unwrap().target_amount, 10);
    assert_eq!(ledger.get_project(&bob_project).await.unwrap().target_amount, 20);
}

#[tokio::test]
async fn test_reinit_fails_and_keeps_original() {
    let ledger = setup();
    let owner = Address::new([7u8; 32]);
    let original = ledger
        .init_project(owner, "once", valid_metadata(), 1_000, NOW + 60)
        .await
        .unwrap();
    let (address, _) = ledger.project_address(&owner, "once").unwrap();

    let second = ledger
        .init_project(
            owner,
            "once",
            metadata("Replacement", "Other", "https://example.com/other.png"),
            9_999,
            NOW + 999,
        )
        .await;

    assert_eq!(second, Err(Error::AlreadyExists(address)));
    assert_eq!(ledger.get_project(&address).await.unwrap(), original);
    assert_eq!(ledger.store().project_count().unwrap(), 1);
}

#[tokio::test]
async fn test_metadata_at_limits_is_accepted() {
    let ledger = setup();
    let owner = Address::new([7u8; 32]);
    let meta = metadata(&"A".repeat(100), &"B".repeat(500), &"C".repeat(200));

    let project = ledger
        .init_project(owner, &"p".repeat(32), meta, 1, NOW + 60)
        .await
        .unwrap();

    assert_eq!(project.metadata.title.len(), 100);
    assert_eq!(project.metadata.description.len(), 500);
    assert_eq!(project.metadata.image_url.len(), 200);
    assert_eq!(project.project_id.len(), 32);
}

#[tokio::test]
async fn test_title_over_limit_is_rejected() {
    let ledger = setup();
    let result = ledger
        .init_project(
            Address::new([7u8; 32]),
            "project-fail-title",
            metadata(&"A".repeat(101), "Valid description", "https://example.com/image.png"),
            1_000_000_000,
            NOW + 86_400,
        )
        .await;

    assert_eq!(
        result,
        Err(Error::Validation(ValidationError::TooLong {
            field: Field::Title,
            limit: 100,
            len: 101,
        }))
    );
    assert_eq!(ledger.store().project_count().unwrap(), 0);
}

#[tokio::test]
async fn test_description_over_limit_is_rejected() {
    let ledger = setup();
    let result = ledger
        .init_project(
            Address::new([7u8; 32]),
            "project-fail-desc",
            metadata("Valid Title", &"B".repeat(501), "https://example.com/image.png"),
            1_000_000_000,
            NOW + 86_400,
        )
        .await;

    expect_validation(result, Field::Description);
    assert_eq!(ledger.store().project_count().unwrap(), 0);
}

#[tokio::test]
async fn test_image_url_over_limit_is_rejected() {
    let ledger = setup();
    let result = ledger
        .init_project(
            Address::new([7u8; 32]),
            "project-fail-url",
            metadata("Valid Title", "Valid description", &"C".repeat(201)),
            1_000_000_000,
            NOW + 86_400,
        )
        .await;

    expect_validation(result, Field::ImageUrl);
    assert_eq!(ledger.store().project_count().unwrap(), 0);
}

#[tokio::test]
async fn test_project_id_over_limit_is_rejected() {
    let ledger = setup();
    let owner = Address::new([7u8; 32]);

    let just_over = ledger
        .init_project(owner, &"p".repeat(33), valid_metadata(), 1, NOW + 60)
        .await;
    expect_validation(just_over, Field::ProjectId);

    let far_over = ledger
        .init_project(owner, &"project-".repeat(10), valid_metadata(), 1, NOW + 60)
        .await;
    expect_validation(far_over, Field::ProjectId);

    assert_eq!(ledger.store().project_count().unwrap(), 0);
}

#[tokio::test]
async fn test_limits_count_bytes_not_characters() {
    let ledger = setup();
    let owner = Address::new([7u8; 32]);

    // "é" is two bytes in UTF-8.
    ledger
        .init_project(owner, "fits", metadata(&"é".repeat(50), "", ""), 1, NOW + 60)
        .await
        .unwrap();

    let result = ledger
        .init_project(owner, "overflows", metadata(&"é".repeat(51), "", ""), 1, NOW + 60)
        .await;
    assert_eq!(
        result,
        Err(Error::Validation(ValidationError::TooLong {
            field: Field::Title,
            limit: 100,
            len: 102,
        }))
    );
}

#[tokio::test]
async fn test_first_invalid_field_is_reported() {
    let ledger = setup();
    let result = ledger
        .init_project(
            Address::new([7u8; 32]),
            "p",
            metadata(&"A".repeat(101), &"B".repeat(501), &"C".repeat(201)),
            1,
            NOW + 60,
        )
        .await;

    expect_validation(result, Field::Title);
}

#[tokio::test]
async fn test_zero_target_is_rejected() {
    let ledger = setup();
    let result = ledger
        .init_project(Address::new([7u8; 32]), "p", valid_metadata(), 0, NOW + 60)
        .await;

    assert_eq!(
        result,
        Err(Error::Validation(ValidationError::NotPositive {
            field: Field::TargetAmount,
        }))
    );
    assert_eq!(ledger.store().project_count().unwrap(), 0);
}

#[tokio::test]
async fn test_expired_project_can_be_created() {
    let ledger = setup();
    let owner = Address::new([7u8; 32]);

    let project = ledger
        .init_project(owner, "expired-project", valid_metadata(), 1_000_000_000, NOW - 3_600)
        .await
        .unwrap();

    assert!(!project.is_open(ledger.clock().now()));
}

#[tokio::test]
async fn test_get_unknown_project_is_not_found() {
    let ledger = setup();
    let missing = Address::new([42u8; 32]);
    assert_eq!(
        ledger.get_project(&missing).await,
        Err(Error::NotFound(missing))
    );
}
