// src/storage/mod.rs
use crate::config::{FaqConfig, InsertPosition, PresentationStyle};
use crate::extractors::FaqItem;
use crate::render::{build_block, build_raw_block, build_schema, to_json, to_script_tag};
use crate::utils::error::StorageError;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};
use tempfile::NamedTempFile;

pub const BLOCK_FILE: &str = "faq_block.html";
pub const SCHEMA_FILE: &str = "faq_schema.json";
pub const META_FILE: &str = "faq_meta.json";
pub const DOCUMENT_FILE: &str = "document.html";

const LOCK_FILE: &str = ".faq.lock";
const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(10);
const LOCK_TIMEOUT: Duration = Duration::from_secs(10);
// A lock older than this was left behind by a crashed writer.
const LOCK_STALE_AFTER: Duration = Duration::from_secs(120);

/// Rendered outputs for one document, as produced by a single generation pass.
#[derive(Debug, Clone)]
pub struct FaqRecord {
    pub doc_id: String,
    pub block_html: String,
    /// Serialized FAQPage JSON; `None` when there is no structured data
    /// (e.g. an unstructured AI reply).
    pub schema_json: Option<String>,
    pub item_count: usize,
    pub presentation_style: PresentationStyle,
    /// What produced the record: "extract" or "ai".
    pub source: String,
}

/// Block and schema as last stored for a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFaq {
    pub block_html: String,
    pub schema_json: Option<String>,
}

/// Result of a publish that actually stored something.
#[derive(Debug, Clone)]
pub struct Published {
    pub dir: PathBuf,
    pub block_html: String,
    /// JSON-LD `<script>` element; absent for unstructured content.
    pub script_tag: Option<String>,
    pub item_count: usize,
}

impl Published {
    /// Block followed by its JSON-LD script, ready for insertion.
    pub fn rendered(&self) -> String {
        match &self.script_tag {
            Some(script) => format!("{}{}", self.block_html, script),
            None => self.block_html.clone(),
        }
    }
}

/// Persists FAQ outputs as files under `<base_dir>/<doc_id>/`.
///
/// Writes for one document are serialized through a lock file in its
/// directory, so concurrent regenerations (threads or processes) never
/// interleave and the stored block and schema always come from one pass.
pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// Directory holding everything stored for `doc_id`.
    pub fn document_dir(&self, doc_id: &str) -> Result<PathBuf, StorageError> {
        validate_doc_id(doc_id)?;
        Ok(self.base_dir.join(doc_id))
    }

    /// Writes block, schema and metadata, replacing any previous generation.
    /// A stale schema file is removed when the new record has none.
    pub fn save_faq(&self, record: &FaqRecord) -> Result<PathBuf, StorageError> {
        let target_dir = self.document_dir(&record.doc_id)?;
        fs::create_dir_all(&target_dir).map_err(StorageError::IoError)?;
        let _lock = DocLock::acquire(&target_dir)?;

        let metadata = serde_json::json!({
            "doc_id": record.doc_id,
            "item_count": record.item_count,
            "presentation_style": record.presentation_style,
            "has_schema": record.schema_json.is_some(),
            "source": record.source,
            "generated_at": chrono::Utc::now().to_rfc3339(),
        });
        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        write_atomic(&target_dir, BLOCK_FILE, record.block_html.as_bytes())?;

        let schema_path = target_dir.join(SCHEMA_FILE);
        match &record.schema_json {
            Some(json) => write_atomic(&target_dir, SCHEMA_FILE, json.as_bytes())?,
            None if schema_path.exists() => fs::remove_file(&schema_path).map_err(StorageError::IoError)?,
            None => {}
        }

        write_atomic(&target_dir, META_FILE, metadata_str.as_bytes())?;

        tracing::info!("Saved FAQ for '{}' to {}", record.doc_id, target_dir.display());
        Ok(target_dir)
    }

    /// Writes the document with the FAQ block inserted.
    pub fn save_document(&self, doc_id: &str, html: &str) -> Result<PathBuf, StorageError> {
        let target_dir = self.document_dir(doc_id)?;
        fs::create_dir_all(&target_dir).map_err(StorageError::IoError)?;
        let _lock = DocLock::acquire(&target_dir)?;

        write_atomic(&target_dir, DOCUMENT_FILE, html.as_bytes())?;
        let path = target_dir.join(DOCUMENT_FILE);
        tracing::info!("Saved document to {}", path.display());
        Ok(path)
    }

    /// Block and schema as stored for `doc_id`, read under the document lock.
    pub fn load_faq(&self, doc_id: &str) -> Result<Option<StoredFaq>, StorageError> {
        let target_dir = self.document_dir(doc_id)?;
        let block_path = target_dir.join(BLOCK_FILE);
        if !block_path.exists() {
            return Ok(None);
        }
        let _lock = DocLock::acquire(&target_dir)?;

        let block_html = fs::read_to_string(&block_path).map_err(StorageError::IoError)?;
        let schema_path = target_dir.join(SCHEMA_FILE);
        let schema_json = if schema_path.exists() {
            Some(fs::read_to_string(&schema_path).map_err(StorageError::IoError)?)
        } else {
            None
        };
        Ok(Some(StoredFaq { block_html, schema_json }))
    }

    /// Previously stored block for `doc_id`, if any.
    pub fn load_block(&self, doc_id: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load_faq(doc_id)?.map(|stored| stored.block_html))
    }
}

/// Renders block and schema from one item list and stores them.
///
/// Returns `Ok(None)` without touching storage when `items` is empty or
/// below `config.min_items`.
pub fn publish(
    storage: &StorageManager,
    config: &FaqConfig,
    doc_id: &str,
    items: &[FaqItem],
    source: &str,
) -> Result<Option<Published>, StorageError> {
    if items.is_empty() {
        tracing::info!("No FAQs found for '{}'; nothing to update", doc_id);
        return Ok(None);
    }
    if !config.meets_minimum(items.len()) {
        tracing::info!(
            "Found {} FAQ(s) for '{}', below the minimum of {}; nothing to update",
            items.len(),
            doc_id,
            config.min_items
        );
        return Ok(None);
    }

    let block_html = build_block(items, &config.block_options());
    let schema = build_schema(items);
    let schema_json = to_json(&schema).map_err(|e| StorageError::SerializationError(e.to_string()))?;
    let script_tag = to_script_tag(&schema).map_err(|e| StorageError::SerializationError(e.to_string()))?;

    let dir = storage.save_faq(&FaqRecord {
        doc_id: doc_id.to_string(),
        block_html: block_html.clone(),
        schema_json: Some(schema_json),
        item_count: items.len(),
        presentation_style: config.presentation_style,
        source: source.to_string(),
    })?;

    Ok(Some(Published { dir, block_html, script_tag: Some(script_tag), item_count: items.len() }))
}

/// Stores unstructured, already-sanitized FAQ content without structured data.
pub fn publish_raw(
    storage: &StorageManager,
    config: &FaqConfig,
    doc_id: &str,
    body_html: &str,
    source: &str,
) -> Result<Option<Published>, StorageError> {
    if body_html.trim().is_empty() {
        tracing::info!("Empty FAQ body for '{}'; nothing to update", doc_id);
        return Ok(None);
    }

    let block_html = build_raw_block(body_html);
    let dir = storage.save_faq(&FaqRecord {
        doc_id: doc_id.to_string(),
        block_html: block_html.clone(),
        schema_json: None,
        item_count: 0,
        presentation_style: config.presentation_style,
        source: source.to_string(),
    })?;

    Ok(Some(Published { dir, block_html, script_tag: None, item_count: 0 }))
}

/// Places `block` before or after `content`, separated by a blank line.
pub fn insert_block(content: &str, block: &str, position: InsertPosition) -> String {
    match position {
        InsertPosition::Prepend => format!("{}\n\n{}", block, content),
        InsertPosition::Append => format!("{}\n\n{}", content, block),
    }
}

fn validate_doc_id(doc_id: &str) -> Result<(), StorageError> {
    let valid = !doc_id.is_empty()
        && doc_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidDocumentId(doc_id.to_string()))
    }
}

// Unique temp file in the same directory, renamed over `name`; removed on failure.
fn write_atomic(dir: &Path, name: &str, contents: &[u8]) -> Result<(), StorageError> {
    let mut tmp = NamedTempFile::new_in(dir).map_err(StorageError::IoError)?;
    tmp.write_all(contents).map_err(StorageError::IoError)?;
    tmp.as_file().sync_all().map_err(StorageError::IoError)?;
    tmp.persist(dir.join(name)).map_err(|e| StorageError::IoError(e.error))?;
    Ok(())
}

/// Exclusive per-document lock file, released on drop.
struct DocLock {
    path: PathBuf,
}

impl DocLock {
    fn acquire(dir: &Path) -> Result<Self, StorageError> {
        let path = dir.join(LOCK_FILE);
        let started = Instant::now();

        loop {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(_) => return Ok(Self { path }),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if is_stale(&path) {
                        tracing::warn!("Removing stale lock {}", path.display());
                        let _ = fs::remove_file(&path);
                        continue;
                    }
                    if started.elapsed() >= LOCK_TIMEOUT {
                        return Err(StorageError::Locked(dir.display().to_string()));
                    }
                    std::thread::sleep(LOCK_RETRY_INTERVAL);
                }
                Err(e) => return Err(StorageError::IoError(e)),
            }
        }
    }
}

impl Drop for DocLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!("Failed to release lock {}: {}", self.path.display(), e);
        }
    }
}

fn is_stale(lock_path: &Path) -> bool {
    fs::metadata(lock_path)
        .and_then(|meta| meta.modified())
        .ok()
        .and_then(|modified| SystemTime::now().duration_since(modified).ok())
        .is_some_and(|age| age > LOCK_STALE_AFTER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn record(schema: Option<&str>) -> FaqRecord {
        FaqRecord {
            doc_id: "post-42".to_string(),
            block_html: "<div class=\"faq-block\"></div>".to_string(),
            schema_json: schema.map(str::to_string),
            item_count: 2,
            presentation_style: PresentationStyle::Static,
            source: "extract".to_string(),
        }
    }

    fn item(q: &str, a: &str) -> FaqItem {
        FaqItem { question: q.to_string(), answer: a.to_string() }
    }

    fn dir_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_save_faq_writes_all_fields() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();

        let target = storage.save_faq(&record(Some("{}"))).unwrap();

        assert_eq!(fs::read_to_string(target.join(SCHEMA_FILE)).unwrap(), "{}");
        assert_eq!(
            storage.load_block("post-42").unwrap().as_deref(),
            Some("<div class=\"faq-block\"></div>")
        );

        let meta: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(target.join(META_FILE)).unwrap()).unwrap();
        assert_eq!(meta["item_count"], 2);
        assert_eq!(meta["presentation_style"], "static");
        assert_eq!(dir_entries(&target), vec![BLOCK_FILE, META_FILE, SCHEMA_FILE]);
    }

    #[test]
    fn test_regeneration_overwrites_and_drops_stale_schema() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();

        let target = storage.save_faq(&record(Some("{\"old\":true}"))).unwrap();
        let mut newer = record(None);
        newer.block_html = "<p>new</p>".to_string();
        storage.save_faq(&newer).unwrap();

        assert_eq!(storage.load_block("post-42").unwrap().as_deref(), Some("<p>new</p>"));
        assert!(!target.join(SCHEMA_FILE).exists());
    }

    #[test]
    fn test_concurrent_regenerations_stay_consistent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(StorageManager::new(dir.path()).unwrap());

        let handles: Vec<_> = (0..2)
            .map(|writer| {
                let storage = Arc::clone(&storage);
                std::thread::spawn(move || {
                    let mut errors = Vec::new();
                    for round in 0..50 {
                        let tag = format!("writer {} round {}", writer, round);
                        let record = FaqRecord {
                            doc_id: "post-1".to_string(),
                            block_html: format!("<p>{}</p>", tag),
                            schema_json: Some(format!("{{\"tag\":\"{}\"}}", tag)),
                            item_count: 1,
                            presentation_style: PresentationStyle::Disclosure,
                            source: "extract".to_string(),
                        };
                        if let Err(e) = storage.save_faq(&record) {
                            errors.push(format!("save {}: {}", tag, e));
                            continue;
                        }

                        match storage.load_faq("post-1") {
                            Ok(Some(stored)) => {
                                let block_tag = stored.block_html.trim_start_matches("<p>").trim_end_matches("</p>").to_string();
                                let expected = format!("{{\"tag\":\"{}\"}}", block_tag);
                                if stored.schema_json.as_deref() != Some(expected.as_str()) {
                                    errors.push(format!("diverged: {:?}", stored));
                                }
                            }
                            other => errors.push(format!("load {}: {:?}", tag, other)),
                        }
                    }
                    errors
                })
            })
            .collect();

        let errors: Vec<String> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
        assert!(errors.is_empty(), "first errors: {:?}", &errors[..errors.len().min(3)]);

        let target = storage.document_dir("post-1").unwrap();
        assert_eq!(dir_entries(&target), vec![BLOCK_FILE, META_FILE, SCHEMA_FILE]);
    }

    #[test]
    fn test_lock_released_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let lock_path = dir.path().join(LOCK_FILE);

        fs::write(&lock_path, "").unwrap();
        assert!(!is_stale(&lock_path), "a fresh lock is honored");
        fs::remove_file(&lock_path).unwrap();

        let missing = DocLock::acquire(&dir.path().join("missing")).map(|_| ());
        assert!(matches!(missing, Err(StorageError::IoError(_))));

        {
            let _held = DocLock::acquire(dir.path()).unwrap();
            assert!(lock_path.exists());
        }
        assert!(!lock_path.exists());
    }

    #[test]
    fn test_publish_skips_empty_and_below_minimum() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();
        let config = FaqConfig { min_items: 2, ..FaqConfig::default() };

        assert!(publish(&storage, &config, "empty", &[], "extract").unwrap().is_none());
        assert!(!dir.path().join("empty").join(BLOCK_FILE).exists());

        let one = [item("Only one?", "<p>Yes.</p>")];
        assert!(publish(&storage, &config, "short", &one, "extract").unwrap().is_none());
        assert!(!dir.path().join("short").join(BLOCK_FILE).exists());

        let zero_min = FaqConfig { min_items: 0, ..FaqConfig::default() };
        assert!(publish(&storage, &zero_min, "empty", &[], "extract").unwrap().is_none());
        assert!(!dir.path().join("empty").exists());
    }

    #[test]
    fn test_publish_stores_block_and_schema_from_same_items() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();
        let items = [item("First?", "<p>One.</p>"), item("Second?", "<p>Two.</p>")];

        let published = publish(&storage, &FaqConfig::default(), "doc", &items, "extract")
            .unwrap()
            .expect("stored");
        assert_eq!(published.item_count, 2);
        assert!(published.rendered().contains("application/ld+json"));

        let stored = storage.load_faq("doc").unwrap().unwrap();
        assert_eq!(stored.block_html, published.block_html);
        let schema: serde_json::Value = serde_json::from_str(stored.schema_json.as_deref().unwrap()).unwrap();
        assert_eq!(schema["mainEntity"][0]["name"], "First?");
        assert_eq!(schema["mainEntity"][1]["acceptedAnswer"]["text"], "Two.");
    }

    #[test]
    fn test_publish_raw_has_no_schema() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();

        assert!(publish_raw(&storage, &FaqConfig::default(), "doc", "  ", "ai").unwrap().is_none());
        let published = publish_raw(&storage, &FaqConfig::default(), "doc", "<p>Free text</p>", "ai")
            .unwrap()
            .unwrap();
        assert_eq!(published.rendered(), published.block_html);
        assert_eq!(storage.load_faq("doc").unwrap().unwrap().schema_json, None);
    }

    #[test]
    fn test_rejects_path_like_doc_ids() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();

        for bad in ["", "../escape", "a/b", "name.html"] {
            assert!(matches!(
                storage.document_dir(bad),
                Err(StorageError::InvalidDocumentId(_))
            ));
        }
        assert!(storage.load_block("missing_doc").unwrap().is_none());
    }

    #[test]
    fn test_insert_block_positions() {
        assert_eq!(insert_block("<p>body</p>", "<faq/>", InsertPosition::Append), "<p>body</p>\n\n<faq/>");
        assert_eq!(insert_block("<p>body</p>", "<faq/>", InsertPosition::Prepend), "<faq/>\n\n<p>body</p>");
    }
}
