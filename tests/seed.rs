use onp_portal::domain::collection::Collection;
use onp_portal::domain::records::{NewsItem, Record};
use onp_portal::repository::{DieselRepository, DocumentListQuery, DocumentReader};
use onp_portal::services::seed::{SeedMode, seed};

mod common;

fn count(repo: &DieselRepository, collection: Collection) -> usize {
    repo.list_documents(DocumentListQuery::new(collection))
        .unwrap()
        .0
}

#[test]
fn test_seeding_an_empty_store() {
    let test_db = common::TestDb::new("test_seeding_an_empty_store.db");
    let repo = DieselRepository::new(test_db.pool());

    let inserted = seed(&repo, SeedMode::Collections, SeedMode::Collections.fixtures()).unwrap();
    assert!(inserted > 0);

    let (total, news) = repo
        .list_documents(DocumentListQuery::new(Collection::Actualites))
        .unwrap();
    assert_eq!(total, 1);

    let doc = news.into_iter().next().unwrap().into_resource();
    let item = NewsItem::decode(&doc).unwrap();
    assert_eq!(
        item.title,
        "Nouveau décret sur la dispensation des médicaments en officine"
    );
    assert_eq!(item.flags.order, 1);
    assert!(item.flags.is_active);

    for collection in Collection::KNOWN {
        if collection == Collection::PageMocks {
            continue;
        }
        let (_, docs) = repo
            .list_documents(DocumentListQuery::new(collection.clone()))
            .unwrap();
        assert!(!docs.is_empty(), "`{collection}` has no fixtures");
        for doc in docs {
            Record::decode(&collection, &doc.into_resource()).unwrap();
        }
    }
}

#[test]
fn test_reseeding_replaces_previous_fixtures() {
    let test_db = common::TestDb::new("test_reseeding_replaces_previous_fixtures.db");
    let repo = DieselRepository::new(test_db.pool());

    seed(&repo, SeedMode::Collections, SeedMode::Collections.fixtures()).unwrap();
    let videos = count(&repo, Collection::Videos);
    seed(&repo, SeedMode::Collections, SeedMode::Collections.fixtures()).unwrap();

    assert_eq!(count(&repo, Collection::Actualites), 1);
    assert_eq!(count(&repo, Collection::Videos), videos);
}

#[test]
fn test_page_mocks_mode_targets_one_collection() {
    let test_db = common::TestDb::new("test_page_mocks_mode_targets_one_collection.db");
    let repo = DieselRepository::new(test_db.pool());

    seed(&repo, SeedMode::PageMocks, SeedMode::PageMocks.fixtures()).unwrap();

    let (total, mocks) = repo
        .list_documents(DocumentListQuery::new(Collection::PageMocks))
        .unwrap();
    assert_eq!(total, 5);
    assert!(mocks.iter().all(|d| d.body["pageId"].is_string()));
    assert_eq!(count(&repo, Collection::Actualites), 0);
}

#[test]
fn test_failed_seed_leaves_store_untouched() {
    let test_db = common::TestDb::new("test_failed_seed_leaves_store_untouched.db");
    let repo = DieselRepository::new(test_db.pool());

    seed(&repo, SeedMode::Collections, SeedMode::Collections.fixtures()).unwrap();
    let result = seed(
        &repo,
        SeedMode::Collections,
        r#"{"actualites": [], "photos": [{"caption": "sans url"}]}"#,
    );
    assert!(result.is_err());
    assert_eq!(count(&repo, Collection::Actualites), 1);
}
