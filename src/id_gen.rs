//! Memory id generation.

use chrono::Utc;
use uuid::Uuid;

/// Prefix shared by every memory id.
pub const ID_PREFIX: &str = "mem_";

/// Length of the random hex suffix.
const SUFFIX_LEN: usize = 8;

/// Generate a memory id: `mem_<unix micros>_<8 hex chars>`.
///
/// The timestamp keeps ids roughly time ordered; the random suffix separates
/// ids minted within the same microsecond.
pub fn memory_id() -> String {
    let micros = Utc::now().timestamp_micros();
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{ID_PREFIX}{micros}_{}", &suffix[..SUFFIX_LEN])
}
