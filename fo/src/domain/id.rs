//! Domain id generation
//!
//! Ids use the format `{6-char-hex}-{kind}-{slug}`, e.g.
//! `01a3f2-team-sap-001`. The hex prefix comes from a v7 UUID, so ids
//! sort roughly by creation time, which is all the uniqueness the
//! domain needs.

/// Generate a domain id from a kind and a display label
pub fn generate_id(kind: &str, label: &str) -> String {
    let uuid = uuid::Uuid::now_v7();
    let hex_prefix = &uuid.to_string()[..6];
    format!("{}-{}-{}", hex_prefix, kind, slugify(label))
}

/// Slugify a label for use in ids
fn slugify(label: &str) -> String {
    label
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
