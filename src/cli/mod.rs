pub mod export;
pub mod forget;
pub mod import;
pub mod maintenance;
pub mod recall;
pub mod remember;
pub mod stats;

/// First eight bytes of an id for display. Imported payloads may carry ids
/// that are short or non-ASCII, so fall back to the whole id when the cut
/// is out of bounds or would split a character.
fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
