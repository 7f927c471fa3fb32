//! JSON response types and formatting for CLI output.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use eternal_memory::SearchHit;

/// Response for a completed `setup`.
#[derive(Serialize)]
pub struct SetupResponse {
    pub status: String,
    pub workspace: PathBuf,
    pub config_path: PathBuf,
    pub store_path: PathBuf,
    pub daily_log_dir: PathBuf,
    pub cloud_enabled: bool,
}

/// Response for `cloud`.
#[derive(Serialize)]
pub struct CloudResponse {
    pub status: String,
    pub cloud_enabled: bool,
    pub url: String,
}

/// Response for a stored memory.
#[derive(Serialize)]
pub struct StoreResponse {
    pub status: String,
    pub id: String,
    pub total: usize,
    pub log_path: Option<PathBuf>,
}

/// Response for search results.
#[derive(Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResultItem>,
}

/// Individual search result item.
#[derive(Serialize)]
pub struct SearchResultItem {
    pub id: String,
    pub text: String,
    pub similarity: f64,
    pub distance: f64,
    pub timestamp: String,
    pub source: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl From<SearchHit> for SearchResultItem {
    fn from(hit: SearchHit) -> Self {
        let similarity = hit.similarity();
        let metadata = hit.record.metadata;
        Self {
            id: hit.record.id,
            text: hit.record.text,
            similarity,
            distance: hit.distance,
            timestamp: metadata.timestamp,
            source: metadata.source,
            metadata: metadata.extra,
        }
    }
}

/// Response for `status`.
#[derive(Serialize)]
pub struct StatusResponse {
    pub workspace: PathBuf,
    pub config_path: PathBuf,
    pub model: String,
    /// Model recorded by the collection, if the store exists.
    pub stored_model: Option<String>,
    pub model_mismatch: bool,
    pub store_path: PathBuf,
    pub collection: String,
    pub count: usize,
    pub daily_logs: bool,
    pub cloud_enabled: bool,
}

/// Response for errors.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// Print a value as formatted JSON to stdout.
pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to serialize JSON: {}", e);
            std::process::exit(1);
        }
    }
}

/// Print search hits in the human-readable layout.
pub fn print_hits(hits: &[SearchHit]) {
    let rule = "=".repeat(60);
    println!("Found {} relevant memories:\n", hits.len());
    println!("{rule}");

    for (i, hit) in hits.iter().enumerate() {
        let metadata = &hit.record.metadata;
        println!("\n{}. Similarity: {:.2}%", i + 1, hit.similarity() * 100.0);
        println!("   Time: {}", metadata.timestamp);
        println!("   Source: {}", metadata.source);
        println!("\n   {}", hit.record.text);
        println!("   {}", "-".repeat(56));
    }

    println!("\n{rule}");
}
