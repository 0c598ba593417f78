//! Advisory Redis cache for scored pairs.
//!
//! Keys embed sha256 fingerprints of both document texts, so any JD or
//! resume mutation changes the key and a stale result can never be served.
//! Redis being down degrades to recompute; scoring is cheap and
//! deterministic, the cache is never load-bearing.

use redis::AsyncCommands;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::matching::scorer::MatchResult;

const CACHE_TTL_SECS: u64 = 3600;

/// First 16 hex chars of sha256(text), enough to distinguish revisions.
pub fn fingerprint(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    digest
        .iter()
        .take(8)
        .map(|b| format!("{b:02x}"))
        .collect()
}

pub fn cache_key(jd_id: Uuid, candidate_id: Uuid, jd_text: &str, candidate_text: &str) -> String {
    format!(
        "match:v1:{jd_id}:{candidate_id}:{}:{}",
        fingerprint(jd_text),
        fingerprint(candidate_text)
    )
}

pub async fn get_cached(client: &redis::Client, key: &str) -> Option<MatchResult> {
    let mut conn = match client.get_multiplexed_async_connection().await {
        Ok(conn) => conn,
        Err(e) => {
            tracing::debug!("Match cache unavailable: {e}");
            return None;
        }
    };
    let raw: Option<String> = conn.get(key).await.ok().flatten();
    raw.and_then(|json| serde_json::from_str(&json).ok())
}

pub async fn put_cached(client: &redis::Client, key: &str, result: &MatchResult) {
    let json = match serde_json::to_string(result) {
        Ok(json) => json,
        Err(e) => {
            tracing::debug!("Failed to serialize match result for cache: {e}");
            return;
        }
    };
    let mut conn = match client.get_multiplexed_async_connection().await {
        Ok(conn) => conn,
        Err(e) => {
            tracing::debug!("Match cache unavailable: {e}");
            return;
        }
    };
    if let Err(e) = conn.set_ex::<_, _, ()>(key, json, CACHE_TTL_SECS).await {
        tracing::debug!("Failed to write match cache entry: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_deterministic() {
        assert_eq!(fingerprint("resume text"), fingerprint("resume text"));
        assert_eq!(fingerprint("resume text").len(), 16);
    }

    #[test]
    fn test_fingerprint_changes_with_content() {
        assert_ne!(fingerprint("v1 of the text"), fingerprint("v2 of the text"));
    }

    #[test]
    fn test_cache_key_embeds_both_fingerprints() {
        let jd = Uuid::from_u128(1);
        let resume = Uuid::from_u128(2);
        let key_a = cache_key(jd, resume, "jd text", "resume text");
        let key_b = cache_key(jd, resume, "jd text", "resume text EDITED");
        assert_ne!(key_a, key_b);
        assert!(key_a.starts_with("match:v1:"));
    }
}
