//! Behaviour every backend must share, run against each of them

mod common;

use bytes::Bytes;
use cloud_object_store::{ListOptions, StorageError, UploadSource};
use common::{Fixture, unique_name, with_cleanup};
use futures::TryStreamExt;

const CONTENT: &[u8] = b"Hello World. Here's some content";

async fn crud_container(fixture: Fixture) {
    let service = &fixture.service;
    let name = unique_name("crud-container");

    let container = service.create(&name).await.unwrap();

    with_cleanup(
        async {
            assert!(format!("{:?}", container).contains(container.id().as_str()));
            assert!(container.to_string().contains(container.id().as_str()));
            assert_eq!(container.name().as_str(), name);

            let listed = service.list().await.unwrap();
            assert_eq!(listed.iter().filter(|c| c.name().as_str() == name).count(), 1);
            assert!(listed.contains(&container));

            let streamed: Vec<_> = service.stream().try_collect().await.unwrap();
            assert_eq!(streamed.iter().filter(|c| c.name().as_str() == name).count(), 1);
            assert_eq!(streamed, listed);

            let fetched = service.get(container.id()).await.unwrap();
            assert_eq!(fetched, container);
            assert_eq!(fetched.name(), container.name());

            let found = service.find(&name).await.unwrap();
            assert_eq!(found.as_ref(), Some(&container));
        },
        container.delete(),
    )
    .await;

    let listed = service.list().await.unwrap();
    assert!(!listed.contains(&container), "deleted container still listed");
    assert!(service.get(container.id()).await.unwrap_err().is_not_found());
    assert_eq!(service.find(&name).await.unwrap(), None);
}

async fn crud_container_objects(fixture: Fixture) {
    let service = &fixture.service;
    let container = service.create(&unique_name("crud-objects")).await.unwrap();

    with_cleanup(
        async {
            assert!(container.list().await.unwrap().is_empty());

            let object = container.create_object("hello_world.txt").await.unwrap();

            with_cleanup(
                async {
                    assert!(format!("{:?}", object).contains(object.id().as_str()));
                    assert_eq!(object.name().as_str(), "hello_world.txt");
                    assert_eq!(object.container_id(), container.id());

                    let listed = container.list().await.unwrap();
                    assert_eq!(listed, vec![object.clone()]);
                    assert_eq!(listed[0].name(), object.name());

                    let streamed: Vec<_> = container.stream().try_collect().await.unwrap();
                    assert_eq!(streamed, listed);

                    let fetched = container.get_object(object.id()).await.unwrap();
                    assert_eq!(fetched, object);

                    let found = container.find_object("hello_world.txt").await.unwrap();
                    assert_eq!(found.as_ref(), Some(&object));
                },
                object.delete(),
            )
            .await;

            assert!(container.list().await.unwrap().is_empty());
            let streamed: Vec<_> = container.stream().try_collect().await.unwrap();
            assert!(streamed.is_empty());
            assert!(
                container
                    .get_object(object.id())
                    .await
                    .unwrap_err()
                    .is_not_found()
            );
            assert_eq!(container.find_object("hello_world.txt").await.unwrap(), None);
        },
        container.delete(),
    )
    .await;
}

async fn upload_download_content(fixture: Fixture) {
    let service = &fixture.service;
    let container = service.create(&unique_name("content")).await.unwrap();

    with_cleanup(
        async {
            let mut object = container.create_object("hello_world.txt").await.unwrap();
            object.upload(CONTENT).await.unwrap();
            assert_eq!(object.size(), CONTENT.len() as u64);

            let mut sink = Vec::new();
            let written = object.download(&mut sink).await.unwrap();
            assert_eq!(written, CONTENT.len() as u64);
            assert_eq!(sink, CONTENT);

            // A fresh handle sees the same bytes
            let fetched = container.get_object(object.id()).await.unwrap();
            assert_eq!(fetched.size(), CONTENT.len() as u64);
            assert_eq!(fetched.content().await.unwrap(), Bytes::from_static(CONTENT));

            // Uploading again replaces the content
            object.upload("replaced").await.unwrap();
            assert_eq!(object.content().await.unwrap(), "replaced");
            assert_eq!(object.size(), 8);
        },
        container.delete_with_contents(),
    )
    .await;
}

async fn stream_upload_round_trip(fixture: Fixture) {
    let service = &fixture.service;
    let container = service.create(&unique_name("streamed")).await.unwrap();

    with_cleanup(
        async {
            let payload: Vec<u8> = (0..64 * 1024u32).map(|i| (i % 251) as u8).collect();

            let mut object = container.create_object("data/blob.bin").await.unwrap();
            object
                .upload(UploadSource::reader(std::io::Cursor::new(payload.clone())))
                .await
                .unwrap();
            assert_eq!(object.size(), payload.len() as u64);

            let mut sink = Vec::new();
            object.download(&mut sink).await.unwrap();
            assert_eq!(sink, payload);
        },
        container.delete_with_contents(),
    )
    .await;
}

async fn new_object_downloads_empty(fixture: Fixture) {
    let service = &fixture.service;
    let container = service.create(&unique_name("empty")).await.unwrap();

    with_cleanup(
        async {
            let object = container.create_object("placeholder").await.unwrap();
            assert_eq!(object.size(), 0);

            let mut sink = Vec::new();
            assert_eq!(object.download(&mut sink).await.unwrap(), 0);
            assert!(sink.is_empty());
        },
        container.delete_with_contents(),
    )
    .await;
}

async fn create_object_with_content(fixture: Fixture) {
    let service = &fixture.service;
    let container = service.create(&unique_name("one-shot")).await.unwrap();

    with_cleanup(
        async {
            let object = container
                .create_object_with_content("notes/readme.md", "# notes")
                .await
                .unwrap();
            assert_eq!(object.size(), 7);

            let found = container.find_object("notes/readme.md").await.unwrap().unwrap();
            assert_eq!(found.content().await.unwrap(), "# notes");
        },
        container.delete_with_contents(),
    )
    .await;
}

async fn duplicate_names_conflict(fixture: Fixture) {
    let service = &fixture.service;
    let name = unique_name("taken");
    let container = service.create(&name).await.unwrap();

    with_cleanup(
        async {
            let err = service.create(&name).await.unwrap_err();
            assert!(matches!(err, StorageError::ContainerAlreadyExists { .. }));
            assert!(err.is_conflict());

            container.create_object("same.txt").await.unwrap();
            let err = container.create_object("same.txt").await.unwrap_err();
            assert!(matches!(err, StorageError::ObjectAlreadyExists { .. }));
        },
        container.delete_with_contents(),
    )
    .await;

    // The name is free again once the container is gone
    let again = service.create(&name).await.unwrap();
    assert_ne!(again, container);
    again.delete().await.unwrap();
}

async fn deletes_are_not_repeatable(fixture: Fixture) {
    let service = &fixture.service;
    let container = service.create(&unique_name("twice")).await.unwrap();
    let object = container.create_object("once.txt").await.unwrap();

    object.delete().await.unwrap();
    assert!(object.delete().await.unwrap_err().is_not_found());

    container.delete().await.unwrap();
    assert!(container.delete().await.unwrap_err().is_not_found());
    assert!(container.create_object("late.txt").await.unwrap_err().is_not_found());
}

async fn non_empty_container_delete(fixture: Fixture) {
    let service = &fixture.service;
    let container = service.create(&unique_name("occupied")).await.unwrap();

    with_cleanup(
        async {
            for name in ["a.txt", "b.txt", "c.txt"] {
                container.create_object_with_content(name, name).await.unwrap();
            }

            let err = container.delete().await.unwrap_err();
            assert!(matches!(err, StorageError::ContainerNotEmpty { objects: 3, .. }));
            assert!(err.is_conflict());

            // Still there and still intact
            assert_eq!(service.get(container.id()).await.unwrap(), container);
            assert_eq!(container.list().await.unwrap().len(), 3);
        },
        container.delete_with_contents(),
    )
    .await;

    assert!(service.get(container.id()).await.unwrap_err().is_not_found());
}

async fn objects_are_scoped_to_their_container(fixture: Fixture) {
    let service = &fixture.service;
    let first = service.create(&unique_name("first")).await.unwrap();
    let second = service.create(&unique_name("second")).await.unwrap();

    with_cleanup(
        async {
            let object = first.create_object("shared-name.txt").await.unwrap();
            let other = second.create_object("shared-name.txt").await.unwrap();

            assert_ne!(object, other);
            assert!(second.get_object(object.id()).await.unwrap_err().is_not_found());
            assert_eq!(second.list().await.unwrap(), vec![other]);
        },
        async {
            first.delete_with_contents().await?;
            second.delete_with_contents().await
        },
    )
    .await;
}

async fn paging_covers_every_item_once(fixture: Fixture) {
    let service = &fixture.service;
    let container = service.create(&unique_name("paged")).await.unwrap();

    with_cleanup(
        async {
            let mut created = Vec::new();
            for i in 0..5 {
                let object = container.create_object(&format!("item-{}", i)).await.unwrap();
                created.push(object);
            }

            let mut paged = Vec::new();
            let mut options = ListOptions::new();
            loop {
                let page = container.list_page(&options).await.unwrap();
                assert!(page.items.len() <= common::PAGE_SIZE);
                paged.extend(page.items);
                match page.next_marker {
                    Some(marker) => options = ListOptions::new().after(marker),
                    None => break,
                }
            }

            let listed = container.list().await.unwrap();
            let streamed: Vec<_> = container.stream().try_collect().await.unwrap();
            assert_eq!(listed, paged);
            assert_eq!(streamed, listed);
            assert_eq!(listed.len(), created.len());
            for object in &created {
                assert_eq!(listed.iter().filter(|o| *o == object).count(), 1);
            }

            let limited = container
                .list_page(&ListOptions::new().with_limit(1))
                .await
                .unwrap();
            assert_eq!(limited.items.len(), 1);
            assert!(limited.is_truncated());
        },
        container.delete_with_contents(),
    )
    .await;
}

async fn invalid_names_are_rejected(fixture: Fixture) {
    let service = &fixture.service;

    for bad in ["", "ab", "UPPER", "under_score", "192.168.1.1"] {
        let err = service.create(bad).await.unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)), "{:?} accepted", bad);
    }

    let container = service.create(&unique_name("names")).await.unwrap();
    with_cleanup(
        async {
            for bad in ["", "/leading", "trailing/", "a//b", "../escape"] {
                let err = container.create_object(bad).await.unwrap_err();
                assert!(matches!(err, StorageError::Validation(_)), "{:?} accepted", bad);
            }
            assert!(container.list().await.unwrap().is_empty());
        },
        container.delete(),
    )
    .await;
}

macro_rules! backend_suite {
    ($backend:ident) => {
        mod $backend {
            use super::*;

            #[tokio::test]
            async fn test_crud_container() {
                crud_container(common::$backend()).await;
            }

            #[tokio::test]
            async fn test_crud_container_objects() {
                crud_container_objects(common::$backend()).await;
            }

            #[tokio::test]
            async fn test_upload_download_content() {
                upload_download_content(common::$backend()).await;
            }

            #[tokio::test]
            async fn test_stream_upload_round_trip() {
                stream_upload_round_trip(common::$backend()).await;
            }

            #[tokio::test]
            async fn test_new_object_downloads_empty() {
                new_object_downloads_empty(common::$backend()).await;
            }

            #[tokio::test]
            async fn test_create_object_with_content() {
                create_object_with_content(common::$backend()).await;
            }

            #[tokio::test]
            async fn test_duplicate_names_conflict() {
                duplicate_names_conflict(common::$backend()).await;
            }

            #[tokio::test]
            async fn test_deletes_are_not_repeatable() {
                deletes_are_not_repeatable(common::$backend()).await;
            }

            #[tokio::test]
            async fn test_non_empty_container_delete() {
                non_empty_container_delete(common::$backend()).await;
            }

            #[tokio::test]
            async fn test_objects_are_scoped_to_their_container() {
                objects_are_scoped_to_their_container(common::$backend()).await;
            }

            #[tokio::test]
            async fn test_paging_covers_every_item_once() {
                paging_covers_every_item_once(common::$backend()).await;
            }

            #[tokio::test]
            async fn test_invalid_names_are_rejected() {
                invalid_names_are_rejected(common::$backend()).await;
            }
        }
    };
}

#[tokio::test]
async fn test_local_fs_rejects_part_suffix_names() {
    let fixture = common::local_fs();
    let container = fixture.service.create(&unique_name("suffixes")).await.unwrap();

    with_cleanup(
        async {
            let err = container.create_object("upload#1").await.unwrap_err();
            assert!(matches!(err, StorageError::Validation(_)), "{:?}", err);
            assert!(container.list().await.unwrap().is_empty());
        },
        container.delete(),
    )
    .await;
}

#[tokio::test]
async fn test_memory_accepts_part_suffix_names() {
    let fixture = common::memory();
    let container = fixture.service.create(&unique_name("suffixes")).await.unwrap();

    with_cleanup(
        async {
            let object = container
                .create_object_with_content("upload#1", "fine here")
                .await
                .unwrap();
            assert_eq!(object.content().await.unwrap(), "fine here");
        },
        container.delete_with_contents(),
    )
    .await;
}

backend_suite!(memory);
backend_suite!(object_store_memory);
backend_suite!(local_fs);
