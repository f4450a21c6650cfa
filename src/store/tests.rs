use std::sync::{Arc, Barrier};
use std::thread;

use serde_json::json;
use tempfile::tempdir;

use crate::catalog::{FileDescriptor, PatientDetails};
use crate::model::{
    AnnotationRecord, FileKind, ImageConfigs, ImageUrl, StackConfigs, ViewerConfigs,
};

use super::{
    ConfigBackend, ConfigMerger, ConfigStore, DefaultConfigBuilder, MemoryBackend,
    SqliteBackend, StoreError, VolumeSeries,
};

fn descriptor(id: &str) -> FileDescriptor {
    PatientDetails::default()
        .files
        .into_iter()
        .find(|file| file.id == id)
        .expect("sample file")
}

fn memory_store() -> ConfigStore {
    ConfigStore::new(Arc::new(MemoryBackend::new()), DefaultConfigBuilder::default())
}

#[test]
fn volume_urls_cover_every_slice_in_order() {
    let builder = DefaultConfigBuilder::default();
    let ImageUrl::Series(urls) = builder.image_url(&descriptor("d3d")) else {
        panic!("volume must produce a series");
    };
    assert_eq!(urls.len(), 291);
    for (offset, url) in urls.iter().enumerate() {
        let index = offset + 1;
        assert!(url.contains("d3d"));
        assert!(url.ends_with(&format!("/3DSlice{index}.dcm")), "{url}");
    }
    assert_eq!(
        urls[0],
        "wadouri:http://127.0.0.1:8000/files/d3d/3DSlice1.dcm"
    );
}

#[test]
fn stack_and_image_urls_follow_file_layout() {
    let builder = DefaultConfigBuilder::new("http://viewer.local/", VolumeSeries::default());
    assert_eq!(
        builder.image_url(&descriptor("h1")),
        ImageUrl::Single("wadouri:http://viewer.local/files/H1.dcm".to_string())
    );
    assert_eq!(
        builder.image_url(&descriptor("painting")),
        ImageUrl::Single("http://viewer.local/files/painting.jpg".to_string())
    );
}

#[test]
fn builds_are_deterministic_and_start_empty() {
    let builder = DefaultConfigBuilder::new(
        "http://x",
        VolumeSeries {
            slice_count: 3,
            first_index: 10,
        },
    );
    let first = builder.build(&descriptor("d3d"), chrono::Utc::now());
    let second = builder.build(&descriptor("d3d"), chrono::Utc::now());
    assert_eq!(
        serde_json::to_string(&first.viewer).expect("first"),
        serde_json::to_string(&second.viewer).expect("second")
    );
    assert_eq!(
        first.viewer.image_url.as_ref().expect("urls").urls(),
        &[
            "wadouri:http://x/files/d3d/3DSlice10.dcm".to_string(),
            "wadouri:http://x/files/d3d/3DSlice11.dcm".to_string(),
            "wadouri:http://x/files/d3d/3DSlice12.dcm".to_string(),
        ]
    );
    assert!(first.configs().is_empty());
}

#[test]
fn series_near_the_index_limit_does_not_wrap() {
    let builder = DefaultConfigBuilder::new(
        "http://x",
        VolumeSeries {
            slice_count: 291,
            first_index: usize::MAX - 1,
        },
    );
    let urls = builder.image_url(&descriptor("d3d"));
    assert_eq!(
        urls.urls(),
        &[
            format!("wadouri:http://x/files/d3d/3DSlice{}.dcm", usize::MAX - 1),
            format!("wadouri:http://x/files/d3d/3DSlice{}.dcm", usize::MAX),
        ]
    );
}

#[test]
fn get_or_create_returns_the_stored_record_afterwards() {
    let store = memory_store();
    let created = store.get_or_create("h1", &descriptor("h1")).expect("create");
    let again = store.get_or_create("h1", &descriptor("h1")).expect("read");
    assert_eq!(created, again);
    assert_eq!(store.backend().count(FileKind::Stack).expect("count"), 1);
    assert_eq!(store.backend().count(FileKind::Volume).expect("count"), 0);
}

#[test]
fn concurrent_first_access_creates_one_record() {
    let dir = tempdir().expect("tempdir");
    let backend = Arc::new(SqliteBackend::open(dir.path().join("viewer.db")).expect("open"));
    let store = ConfigStore::new(backend, DefaultConfigBuilder::default());
    let barrier = Arc::new(Barrier::new(8));

    let handles = (0..8)
        .map(|_| {
            let store = store.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                store.get_or_create("d3d", &descriptor("d3d")).expect("get or create")
            })
        })
        .collect::<Vec<_>>();
    let records = handles
        .into_iter()
        .map(|handle| handle.join().expect("thread"))
        .collect::<Vec<_>>();

    assert_eq!(store.backend().count(FileKind::Volume).expect("count"), 1);
    let stored = store
        .find(FileKind::Volume, "d3d")
        .expect("find")
        .expect("stored");
    for record in &records {
        assert_eq!(record.viewer.image_url, stored.viewer.image_url);
        assert_eq!(record.created_at, stored.created_at);
    }
}

#[test]
fn partial_update_preserves_untouched_fields() {
    let store = memory_store();
    store.get_or_create("h1", &descriptor("h1")).expect("create");
    store
        .apply_partial_update(
            "h1",
            ViewerConfigs::Stack(StackConfigs {
                contrast: Some(5.0),
                brightness: Some(3.0),
                annotations: Some(vec![AnnotationRecord::new("a1", "Length")]),
                ..StackConfigs::default()
            }),
        )
        .expect("seed");

    let merged = ConfigMerger::new(store.clone())
        .update(FileKind::Stack, "h1", json!({"contrast": 9}))
        .expect("merge");
    assert_eq!(
        merged.to_value().expect("value"),
        json!({
            "contrast": 9.0,
            "brightness": 3.0,
            "annotations": [{"annotationUID": "a1", "toolName": "Length", "data": null, "metadata": {}}]
        })
    );
    let stored = store.find(FileKind::Stack, "h1").expect("find").expect("stored");
    assert!(stored.viewer.image_url.is_some());
}

#[test]
fn image_updates_replace_while_stack_updates_merge() {
    let store = memory_store();
    let merger = ConfigMerger::new(store.clone());
    let seed = json!({"contrast": 4, "isInverted": true, "sharpness": 150});

    merger.update(FileKind::Image, "painting", seed.clone()).expect("seed image");
    merger.update(FileKind::Stack, "h1", seed).expect("seed stack");

    let image = merger
        .update(FileKind::Image, "painting", json!({"brightness": 2}))
        .expect("image");
    assert_eq!(
        image,
        ViewerConfigs::Image(ImageConfigs {
            brightness: Some(2.0),
            ..ImageConfigs::default()
        })
    );

    let stack = merger
        .update(FileKind::Stack, "h1", json!({"brightness": 2}))
        .expect("stack");
    assert_eq!(
        stack,
        ViewerConfigs::Stack(StackConfigs {
            contrast: Some(4.0),
            brightness: Some(2.0),
            is_inverted: Some(true),
            ..StackConfigs::default()
        })
    );
}

#[test]
fn update_before_first_view_upserts_and_is_backfilled_later() {
    let store = memory_store();
    let merger = ConfigMerger::new(store.clone());
    merger
        .update(FileKind::Volume, "d3d", json!({"shift": 120}))
        .expect("upsert");
    let sparse = store.find(FileKind::Volume, "d3d").expect("find").expect("stored");
    assert!(sparse.viewer.image_url.is_none());

    let record = store.get_or_create("d3d", &descriptor("d3d")).expect("view");
    assert_eq!(record.viewer.image_url.as_ref().expect("backfilled").urls().len(), 291);
    assert_eq!(record.configs().to_value().expect("value"), json!({"shift": 120.0}));
    assert_eq!(record.created_at, sparse.created_at);
    assert_eq!(store.backend().count(FileKind::Volume).expect("count"), 1);
}

#[test]
fn empty_payload_only_touches_the_timestamp() {
    let store = memory_store();
    let created = store.get_or_create("h1", &descriptor("h1")).expect("create");
    let configs = ConfigMerger::new(store.clone())
        .update(FileKind::Stack, "h1", json!({}))
        .expect("empty update");
    assert!(configs.is_empty());
    let stored = store.find(FileKind::Stack, "h1").expect("find").expect("stored");
    assert_eq!(stored.viewer, created.viewer);
    assert!(stored.updated_at >= created.updated_at);
}

#[test]
fn invalid_payload_is_rejected_without_writing() {
    let store = memory_store();
    let err = ConfigMerger::new(store.clone())
        .update(FileKind::Stack, "h1", json!({"contrast": "high"}))
        .expect_err("must fail");
    assert!(matches!(err, StoreError::Model(_)));
    assert!(store.find(FileKind::Stack, "h1").expect("find").is_none());
}

#[test]
fn sqlite_records_survive_reopen() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("viewer.db");
    {
        let backend = Arc::new(SqliteBackend::open(&path).expect("open"));
        let store = ConfigStore::new(backend, DefaultConfigBuilder::default());
        store.get_or_create("painting", &descriptor("painting")).expect("create");
        ConfigMerger::new(store)
            .update(
                FileKind::Image,
                "painting",
                json!({"gammaR": 1.4, "annotations": [{"annotationUID": "u1", "toolName": "Angle"}]}),
            )
            .expect("update");
    }

    let backend = SqliteBackend::open(&path).expect("reopen");
    assert!(backend.is_durable());
    let record = backend
        .find(FileKind::Image, "painting")
        .expect("find")
        .expect("stored");
    let ViewerConfigs::Image(bag) = record.configs() else {
        panic!("wrong kind");
    };
    assert_eq!(bag.gamma(), [1.4, 1.0, 1.0]);
    assert_eq!(record.configs().annotations()[0].annotation_uid, "u1");
    assert_eq!(
        record.viewer.image_url,
        Some(ImageUrl::Single("http://127.0.0.1:8000/files/painting.jpg".to_string()))
    );
}
