use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::metrics::MetricsState;
use crate::{info_time, Result, AUTHORS_FILE, LANGUAGE_FILE};

/// Writes `language.json` and `authors.json` into `dir`, creating it if needed.
/// Keys come out sorted and indented by four spaces so runs diff cleanly.
pub fn save(state: &MetricsState, dir: impl AsRef<Path>) -> Result<(PathBuf, PathBuf)> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    let language_path = dir.join(LANGUAGE_FILE);
    std::fs::write(&language_path, to_pretty_json(&state.language)?)?;
    info_time!("Language data saved to '{}'", language_path.display());

    let authors_path = dir.join(AUTHORS_FILE);
    std::fs::write(&authors_path, to_pretty_json(&state.authors)?)?;
    info_time!("Authors data saved to '{}'", authors_path.display());

    Ok((language_path, authors_path))
}

/// Reads back what [`save`] wrote.
pub fn load(dir: impl AsRef<Path>) -> Result<MetricsState> {
    let dir = dir.as_ref();
    let language = serde_json::from_str(&std::fs::read_to_string(dir.join(LANGUAGE_FILE))?)?;
    let authors = serde_json::from_str(&std::fs::read_to_string(dir.join(AUTHORS_FILE))?)?;
    Ok(MetricsState { authors, language })
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(buf)
}
