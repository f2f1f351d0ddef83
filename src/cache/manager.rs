//! Cache manager for persisting API responses to disk
//!
//! Provides a `CacheManager` that stores serializable responses as JSON files
//! together with the time they were stored. Entries never expire: a stored
//! response is reused until the cache is cleared.

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Wrapper struct for cached data stored on disk
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    /// The cached data
    data: T,
    /// When the data was cached
    cached_at: DateTime<Utc>,
}

/// Result of reading from cache
#[derive(Debug)]
pub struct CachedData<T> {
    /// The cached data
    pub data: T,
    /// When the data was originally cached
    pub cached_at: DateTime<Utc>,
}

/// Manages reading and writing cached responses to disk
///
/// Responses are stored as JSON files in an XDG-compliant cache directory
/// (`~/.cache/postboard/` on Linux), one file per request key.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl CacheManager {
    /// Creates a new CacheManager using XDG-compliant cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "postboard")?;
        let cache_dir = project_dirs.cache_dir().to_path_buf();
        Some(Self { cache_dir })
    }

    /// Creates a new CacheManager with a custom cache directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Directory the cache files live in
    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the path to a cache file for the given key
    fn cache_path(&self, key: &str) -> PathBuf {
        let file_stem: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        self.cache_dir.join(format!("{}.json", file_stem))
    }

    /// Ensures the cache directory exists
    fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.cache_dir)
    }

    /// Writes data to the cache, replacing any previous entry for `key`
    ///
    /// # Arguments
    /// * `key` - Unique identifier for the cache entry (e.g., "GET /users")
    /// * `data` - The data to cache (must implement Serialize)
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err` if directory creation or file writing fails
    pub fn write<T: Serialize>(&self, key: &str, data: &T) -> std::io::Result<()> {
        self.ensure_dir()?;

        let entry = CacheEntry {
            data,
            cached_at: Utc::now(),
        };

        let json = serde_json::to_string_pretty(&entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        fs::write(self.cache_path(key), json)
    }

    /// Reads data from the cache
    ///
    /// Returns `None` if the cache entry doesn't exist or cannot be parsed as `T`.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<CachedData<T>> {
        let path = self.cache_path(key);
        let content = fs::read_to_string(path).ok()?;
        let entry: CacheEntry<T> = serde_json::from_str(&content).ok()?;

        Some(CachedData {
            data: entry.data,
            cached_at: entry.cached_at,
        })
    }

    /// Removes the entry for `key`; a missing entry is not an error
    pub fn remove(&self, key: &str) -> std::io::Result<()> {
        match fs::remove_file(self.cache_path(key)) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    /// Removes every stored response
    ///
    /// Only `.json` files are touched, so a log file kept in the same
    /// directory survives. A missing directory counts as already clear.
    ///
    /// # Returns
    /// The number of entries removed
    pub fn clear(&self) -> std::io::Result<usize> {
        let entries = match fs::read_dir(&self.cache_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e),
        };

        let mut removed = 0;
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                fs::remove_file(&path)?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TestData {
        name: String,
        value: i32,
    }

    fn create_test_cache() -> (CacheManager, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let cache = CacheManager::with_dir(temp_dir.path().to_path_buf());
        (cache, temp_dir)
    }

    #[test]
    fn test_write_creates_file_in_cache_directory() {
        let (cache, temp_dir) = create_test_cache();
        let data = TestData {
            name: "test".to_string(),
            value: 42,
        };

        cache.write("users", &data).expect("Write should succeed");

        let expected_path = temp_dir.path().join("users.json");
        assert!(expected_path.exists(), "Cache file should exist");

        let content = fs::read_to_string(&expected_path).expect("Should read file");
        assert!(content.contains("\"name\""));
        assert!(content.contains("\"cached_at\""));
        assert!(content.contains("42"));
    }

    #[test]
    fn test_key_is_sanitized_into_file_name() {
        let (cache, temp_dir) = create_test_cache();

        cache
            .write("GET https://example.test/users", &1u8)
            .expect("Write should succeed");

        let files: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(files, vec!["GET_https___example_test_users.json".to_string()]);
    }

    #[test]
    fn test_read_returns_none_for_missing_key() {
        let (cache, _temp_dir) = create_test_cache();

        let result: Option<CachedData<TestData>> = cache.read("nonexistent_key");

        assert!(result.is_none(), "Should return None for missing key");
    }

    #[test]
    fn test_read_returns_none_for_mismatched_shape() {
        let (cache, _temp_dir) = create_test_cache();
        cache.write("shape", &"just a string").unwrap();

        let result: Option<CachedData<TestData>> = cache.read("shape");

        assert!(result.is_none(), "Unparseable entry should be treated as absent");
    }

    #[test]
    fn test_read_returns_written_data() {
        let (cache, _temp_dir) = create_test_cache();
        let original = TestData {
            name: "stored".to_string(),
            value: 12345,
        };

        cache.write("stored_key", &original).expect("Write should succeed");

        let result: CachedData<TestData> = cache.read("stored_key").expect("Should read cache");

        assert_eq!(result.data, original);
    }

    #[test]
    fn test_write_creates_directory_if_missing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested_path = temp_dir.path().join("nested").join("cache").join("dir");
        let cache = CacheManager::with_dir(nested_path.clone());

        cache.write("nested_key", &1u32).expect("Write should succeed");

        assert!(nested_path.exists(), "Nested directory should be created");
        assert!(nested_path.join("nested_key.json").exists(), "Cache file should exist");
    }

    #[test]
    fn test_cached_at_timestamp_is_recorded() {
        let (cache, _temp_dir) = create_test_cache();

        let before = Utc::now();
        cache.write("timestamp_key", &999).expect("Write should succeed");
        let after = Utc::now();

        let result: CachedData<i32> = cache.read("timestamp_key").expect("Should read cache");

        assert!(result.cached_at >= before, "cached_at should be after write started");
        assert!(result.cached_at <= after, "cached_at should be before write finished");
    }

    #[test]
    fn test_new_creates_xdg_compliant_path() {
        if let Some(cache) = CacheManager::new() {
            let path_str = cache.dir().to_string_lossy();
            assert!(
                path_str.contains("postboard"),
                "Cache path should contain project name"
            );
        }
        // Test passes if new() returns None (e.g., no home directory in CI)
    }

    #[test]
    fn test_overwrite_existing_cache() {
        let (cache, _temp_dir) = create_test_cache();

        cache.write("overwrite_key", &1).expect("First write should succeed");
        cache.write("overwrite_key", &2).expect("Second write should succeed");

        let result: CachedData<i32> = cache.read("overwrite_key").expect("Should read cache");

        assert_eq!(result.data, 2, "Cache should contain latest data");
    }

    #[test]
    fn test_clear_removes_json_entries_only() {
        let (cache, temp_dir) = create_test_cache();
        cache.write("posts", &vec![1, 2, 3]).unwrap();
        cache.write("users", &vec![4]).unwrap();
        fs::write(temp_dir.path().join("postboard.log"), "log line").unwrap();

        let removed = cache.clear().expect("Clear should succeed");

        assert_eq!(removed, 2);
        assert!(cache.read::<Vec<i32>>("posts").is_none());
        assert!(temp_dir.path().join("postboard.log").exists());
    }

    #[test]
    fn test_clear_on_missing_directory_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        let cache = CacheManager::with_dir(temp_dir.path().join("never-created"));

        assert_eq!(cache.clear().unwrap(), 0);
    }

    #[test]
    fn test_remove_drops_single_entry() {
        let temp_dir = TempDir::new().unwrap();
        let cache = CacheManager::with_dir(temp_dir.path().to_path_buf());
        cache.write("posts", &vec![1]).unwrap();
        cache.write("users", &vec![2]).unwrap();

        cache.remove("posts").expect("Remove should succeed");
        cache.remove("posts").expect("Removing a missing entry is fine");

        assert!(cache.read::<Vec<u32>>("posts").is_none());
        assert!(cache.read::<Vec<u32>>("users").is_some());
    }
}
