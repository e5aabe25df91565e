use std::collections::HashSet;
use std::sync::Arc;

use arkive_metadata::{MetadataRepository, MetadataStore};
use arkive_publisher::{parse_page, PrefixUrlResolver, Publisher, PublisherConfig, PublisherError};
use arkive_types::{Checksum, ContainerName, ManualClock, ObjectKey, VersionId};
use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

const DEADBEEF: &str = "deadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeef";

fn repo() -> Arc<MetadataStore> {
    Arc::new(MetadataStore::with_clock(Arc::new(ManualClock::stepping(
        Utc.with_ymd_and_hms(2024, 1, 2, 1, 2, 3).unwrap(),
        Duration::seconds(1),
    ))))
}

fn publisher(
    repo: &Arc<MetadataStore>,
    versions_per_page: u64,
    objects_per_page: u64,
) -> Publisher<MetadataStore> {
    Publisher::new(
        Arc::clone(repo),
        Arc::new(PrefixUrlResolver::new("https://blobs.example.com")),
        PublisherConfig {
            versions_per_page,
            objects_per_page,
        },
    )
}

fn docs() -> ContainerName {
    ContainerName::new("docs").unwrap()
}

/// A published version of "docs" holding `n` objects named `obj-0000`...
fn published_version_with(repo: &MetadataStore, n: usize) -> VersionId {
    let sum = Checksum::new(DEADBEEF).unwrap();
    repo.create_blob(&sum, 15, "text/plain").unwrap();
    if repo.list_containers().unwrap().is_empty() {
        repo.create_container(&docs()).unwrap();
    }
    let v = repo.create_version(&docs()).unwrap();
    for i in 0..n {
        let key = ObjectKey::new(format!("obj-{i:04}")).unwrap();
        repo.create_object(&docs(), &v, &key, &sum).unwrap();
    }
    repo.mark_version_published(&docs(), &v).unwrap();
    v
}

#[test]
fn scenario_publish_then_get_url() {
    let repo = repo();
    let p = publisher(&repo, 50, 50);
    let sum = Checksum::new(DEADBEEF).unwrap();

    repo.create_container(&docs()).unwrap();
    let v1 = repo.create_version(&docs()).unwrap();
    repo.create_blob(&sum, 15, "text/plain").unwrap();
    repo.create_object(&docs(), &v1, &ObjectKey::new("report.txt").unwrap(), &sum)
        .unwrap();

    let err = p.get_object_url("docs", v1.as_str(), "report.txt").unwrap_err();
    assert!(err.is_not_found());

    repo.mark_version_published(&docs(), &v1).unwrap();
    assert_eq!(
        p.get_object_url("docs", v1.as_str(), "report.txt").unwrap(),
        format!("https://blobs.example.com/{DEADBEEF}")
    );
    assert_eq!(
        p.resolve_object("docs", v1.as_str(), "report.txt").unwrap(),
        DEADBEEF
    );
}

#[test]
fn missing_container_is_not_found() {
    let repo = repo();
    let p = publisher(&repo, 10, 10);
    assert!(matches!(
        p.list_published_versions_by_page("nope", 1),
        Err(PublisherError::NotFound)
    ));
    assert!(matches!(
        p.list_objects_by_page("nope", "v1", 1),
        Err(PublisherError::NotFound)
    ));
}

#[test]
fn draft_versions_are_hidden() {
    let repo = repo();
    let p = publisher(&repo, 10, 10);
    repo.create_container(&docs()).unwrap();
    let draft = repo.create_version(&docs()).unwrap();

    let page = p.list_published_versions_by_page("docs", 1).unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.total_pages, 0);

    assert!(p
        .list_objects_by_page("docs", draft.as_str(), 1)
        .unwrap_err()
        .is_not_found());
}

#[test]
fn version_pages_cover_published_versions_in_order() {
    let repo = repo();
    let p = publisher(&repo, 2, 10);
    repo.create_container(&docs()).unwrap();

    let mut published = Vec::new();
    for i in 0..5 {
        let v = repo.create_version(&docs()).unwrap();
        if i != 2 {
            repo.mark_version_published(&docs(), &v).unwrap();
            published.push(v);
        }
    }

    let first = p.list_published_versions_by_page("docs", 1).unwrap();
    assert_eq!(first.total_pages, 2);
    assert_eq!(first.number, 1);
    assert!(first.has_next());
    let second = p.list_published_versions_by_page("docs", 2).unwrap();
    let third = p.list_published_versions_by_page("docs", 3).unwrap();
    assert!(third.items.is_empty());
    assert_eq!(third.total_pages, 2);

    let seen: Vec<VersionId> = first.items.into_iter().chain(second.items).collect();
    assert_eq!(seen, published);
}

#[test]
fn page_zero_is_page_one() {
    let repo = repo();
    let p = publisher(&repo, 10, 3);
    let v = published_version_with(&repo, 5);
    let zero = p.list_objects_by_page("docs", v.as_str(), 0).unwrap();
    let one = p.list_objects_by_page("docs", v.as_str(), 1).unwrap();
    assert_eq!(zero, one);
    assert_eq!(zero.number, 1);
}

#[test]
fn malformed_page_input_serves_first_page() {
    let repo = repo();
    let p = publisher(&repo, 10, 3);
    let v = published_version_with(&repo, 7);
    let page = p
        .list_objects_by_page("docs", v.as_str(), parse_page("not-a-number"))
        .unwrap();
    assert_eq!(page.number, 1);
    assert_eq!(page.items.len(), 3);
    assert_eq!(page.total_pages, 3);
}

#[test]
fn remap_is_visible_through_publisher() {
    let repo = repo();
    let p = publisher(&repo, 10, 10);
    let v = published_version_with(&repo, 1);
    let replacement = Checksum::compute(b"new content");
    repo.create_blob(&replacement, 11, "text/plain").unwrap();
    repo.remap_object(&docs(), &v, &ObjectKey::new("obj-0000").unwrap(), &replacement)
        .unwrap();

    assert_eq!(
        p.resolve_object("docs", v.as_str(), "obj-0000").unwrap(),
        replacement
    );
}

#[test]
fn lists_containers() {
    let repo = repo();
    let p = publisher(&repo, 10, 10);
    repo.create_container(&ContainerName::new("b").unwrap()).unwrap();
    repo.create_container(&ContainerName::new("a").unwrap()).unwrap();
    let names: Vec<String> = p
        .list_containers()
        .unwrap()
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn resolver_failure_is_not_not_found() {
    let repo = repo();
    let v = published_version_with(&repo, 1);
    let p = Publisher::new(
        Arc::clone(&repo),
        Arc::new(|_: &Checksum| -> Result<String, String> { Err("store offline".into()) }),
        PublisherConfig::default(),
    );
    let err = p.get_object_url("docs", v.as_str(), "obj-0000").unwrap_err();
    assert!(matches!(err, PublisherError::Resolver(_)));
    assert!(!err.is_not_found());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn object_pages_yield_every_key_once(n in 0usize..60, page_size in 1u64..12) {
        let repo = repo();
        let p = publisher(&repo, 10, page_size);
        let v = published_version_with(&repo, n);

        let expected_pages = (n as u64).div_ceil(page_size);
        let mut seen = Vec::new();
        for page in 1..=expected_pages {
            let result = p.list_objects_by_page("docs", v.as_str(), page).unwrap();
            prop_assert_eq!(result.total_pages, expected_pages);
            prop_assert!(!result.items.is_empty());
            seen.extend(result.items);
        }

        let unique: HashSet<&ObjectKey> = seen.iter().collect();
        prop_assert_eq!(unique.len(), seen.len());
        prop_assert_eq!(seen.len(), n);
        let mut sorted = seen.clone();
        sorted.sort();
        prop_assert_eq!(&sorted, &seen);

        let beyond = p
            .list_objects_by_page("docs", v.as_str(), expected_pages + 1)
            .unwrap();
        prop_assert!(beyond.items.is_empty());
        prop_assert_eq!(beyond.total_pages, expected_pages);
    }
}
