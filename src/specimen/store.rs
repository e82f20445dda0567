use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{MintError, MintResult};
use crate::foundation::layout::ensure_parent_dir;
use crate::specimen::model::Specimen;

/// Persist the specimen list as pretty JSON.
///
/// The document is written next to `path` first and renamed into place, so readers never see
/// a truncated list.
pub fn save_specimens(path: &Path, specimens: &[Specimen]) -> MintResult<()> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(specimens)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)
        .with_context(|| format!("write specimen list '{}'", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("move specimen list into '{}'", path.display()))?;
    Ok(())
}

/// Load a specimen list written by [`save_specimens`] (or an older list with loosely-shaped
/// trait records).
pub fn load_specimens(path: &Path) -> MintResult<Vec<Specimen>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read specimen list '{}'", path.display()))?;
    serde_json::from_str(&text)
        .map_err(|e| MintError::serde(format!("parse specimen list '{}': {e}", path.display())))
}
