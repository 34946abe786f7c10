use aquastore::storage::{LocalDiskStore, MediaStore, MockMediaStore, is_allowed_media};

#[tokio::test]
async fn test_local_disk_store_writes_and_returns_public_path() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalDiskStore::new(dir.path());

    let path = store.save("clownfish.jpg", b"jpegdata").await.unwrap();

    assert!(path.starts_with("/uploads/"));
    assert!(path.ends_with(".jpg"));

    // The public path maps 1:1 onto a file in the configured directory.
    let filename = path.strip_prefix("/uploads/").unwrap();
    let on_disk = dir.path().join(filename);
    assert_eq!(std::fs::read(on_disk).unwrap(), b"jpegdata");
}

#[tokio::test]
async fn test_local_disk_store_unique_names_per_upload() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalDiskStore::new(dir.path());

    let first = store.save("a.png", b"one").await.unwrap();
    let second = store.save("a.png", b"two").await.unwrap();
    assert_ne!(first, second, "repeated uploads must never collide");
}

#[tokio::test]
async fn test_local_disk_store_sanitizes_hostile_filenames() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalDiskStore::new(dir.path());

    let path = store.save("../../../etc/passwd.PNG", b"data").await.unwrap();

    // Only the (lowercased) extension survives from the client name; the rest
    // of the stored name is server-generated, so traversal cannot occur.
    assert!(path.ends_with(".png"));
    let filename = path.strip_prefix("/uploads/").unwrap();
    assert!(!filename.contains(".."));
    assert!(!filename.contains('/'));
    assert!(dir.path().join(filename).exists());
}

#[tokio::test]
async fn test_local_disk_store_defaults_extension() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalDiskStore::new(dir.path());

    let path = store.save("no_extension", b"data").await.unwrap();
    assert!(path.ends_with(".bin"));
}

#[tokio::test]
async fn test_local_disk_store_rejects_empty_upload() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalDiskStore::new(dir.path());
    assert!(store.save("empty.jpg", b"").await.is_err());
}

#[tokio::test]
async fn test_mock_media_store_is_deterministic() {
    let store = MockMediaStore::new();
    let path = store.save("guppy.webp", b"data").await.unwrap();
    assert_eq!(path, "/uploads/mock.webp");
}

#[tokio::test]
async fn test_mock_media_store_failure_mode() {
    let store = MockMediaStore::new_failing();
    assert!(store.save("guppy.webp", b"data").await.is_err());
}

#[test]
fn test_media_type_filter() {
    assert!(is_allowed_media("image/png"));
    assert!(is_allowed_media("image/jpeg"));
    assert!(is_allowed_media("video/mp4"));
    assert!(!is_allowed_media("application/pdf"));
    assert!(!is_allowed_media("text/html"));
    assert!(!is_allowed_media(""));
}
