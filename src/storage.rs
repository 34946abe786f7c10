use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

// 1. MediaStore Contract
/// MediaStore
///
/// Defines the abstract contract for persisting uploaded catalog media. This
/// trait allows swapping the concrete implementation - the real disk store
/// (LocalDiskStore) in production and the in-memory Mock (MockMediaStore)
/// during testing - without affecting the calling handlers.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Persists one uploaded file and returns its public path (under
    /// /uploads), which is what gets stored on the catalog record.
    ///
    /// # Arguments
    /// * `original_name`: The client-side filename, used only to derive the
    ///   extension.
    /// * `data`: The full file contents.
    async fn save(&self, original_name: &str, data: &[u8]) -> Result<String, String>;
}

/// MediaState
///
/// The concrete type used to share the media store across the application state.
pub type MediaState = Arc<dyn MediaStore>;

/// Only image and video uploads are accepted, matching the catalog's two media
/// slots.
pub fn is_allowed_media(content_type: &str) -> bool {
    content_type.starts_with("image/") || content_type.starts_with("video/")
}

/// Derives a safe file extension from a client filename: alphanumeric only,
/// lowercased, falling back to "bin". Strips anything that could smuggle path
/// separators into the stored name.
fn sanitize_extension(original_name: &str) -> String {
    PathBuf::from(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ext.chars()
                .filter(char::is_ascii_alphanumeric)
                .take(8)
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|ext| !ext.is_empty())
        .unwrap_or_else(|| "bin".to_string())
}

/// Generates the stored filename: millisecond timestamp plus a random
/// component, keeping uploads unique and roughly chronological on disk.
fn generate_filename(original_name: &str) -> String {
    format!(
        "{}-{}.{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple(),
        sanitize_extension(original_name)
    )
}

// 2. The Real Implementation (local disk)
/// LocalDiskStore
///
/// Writes uploads synchronously into the configured directory, which the
/// router serves statically under /uploads. There is no cleanup or retry on a
/// failed write; the request simply fails.
#[derive(Clone)]
pub struct LocalDiskStore {
    root: PathBuf,
}

impl LocalDiskStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl MediaStore for LocalDiskStore {
    async fn save(&self, original_name: &str, data: &[u8]) -> Result<String, String> {
        if data.is_empty() {
            return Err("Empty file".to_string());
        }

        let filename = generate_filename(original_name);
        let path = self.root.join(&filename);

        std::fs::create_dir_all(&self.root)
            .map_err(|e| format!("Failed to create upload dir: {}", e))?;
        std::fs::write(&path, data).map_err(|e| format!("Failed to write upload: {}", e))?;

        Ok(format!("/uploads/{}", filename))
    }
}

// 3. The Mock Implementation (For Unit Tests)
/// MockMediaStore
///
/// A mock implementation of `MediaStore` used exclusively for tests. Produces
/// deterministic public paths without touching the filesystem.
#[derive(Clone)]
pub struct MockMediaStore {
    /// When true, all operations return a simulated failure.
    pub should_fail: bool,
}

impl MockMediaStore {
    pub fn new() -> Self {
        Self { should_fail: false }
    }

    pub fn new_failing() -> Self {
        Self { should_fail: true }
    }
}

impl Default for MockMediaStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaStore for MockMediaStore {
    async fn save(&self, original_name: &str, _data: &[u8]) -> Result<String, String> {
        if self.should_fail {
            return Err("Mock media error: simulation requested".to_string());
        }
        Ok(format!("/uploads/mock.{}", sanitize_extension(original_name)))
    }
}
