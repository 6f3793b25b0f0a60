use crate::cache::FxCache;
use crate::parser::{FxParseError, parse_monthly_rates};
use crate::types::RateSource;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, thiserror::Error)]
pub enum FxLoaderError {
    #[error("Invalid file name for rate period: {name}")]
    InvalidFileName { name: String },
    #[error("Parse error in {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: FxParseError,
    },
}

/// Pre-parsed XML for one month, supplied by a caller-owned directory of
/// HMRC monthly rate files.
#[derive(Debug, Clone)]
pub struct RateFile {
    pub name: PathBuf,
    pub modified: Option<SystemTime>,
    pub xml: String,
}

fn expected_year_month_from_path(path: &Path) -> Result<(i32, u32), FxLoaderError> {
    let stem = path.file_stem().and_then(|s| s.to_str()).ok_or_else(|| {
        FxLoaderError::InvalidFileName {
            name: path.to_string_lossy().into_owned(),
        }
    })?;
    // Allow optional prefixes like "monthly_xml_2024-12"
    let stem = stem.rsplit_once('_').map(|(_, tail)| tail).unwrap_or(stem);
    let mut parts = stem.split('-');
    let year = parts
        .next()
        .and_then(|y| y.parse::<i32>().ok())
        .ok_or_else(|| FxLoaderError::InvalidFileName {
            name: path.to_string_lossy().into_owned(),
        })?;
    let month = parts
        .next()
        .and_then(|m| m.parse::<u32>().ok())
        .ok_or_else(|| FxLoaderError::InvalidFileName {
            name: path.to_string_lossy().into_owned(),
        })?;
    if (1..=12).contains(&month) {
        Ok((year, month))
    } else {
        Err(FxLoaderError::InvalidFileName {
            name: path.to_string_lossy().into_owned(),
        })
    }
}

/// Parse and merge a caller-supplied directory of monthly rate files into
/// a fresh cache, oldest-modified first so a re-published month wins.
pub fn load_cache_from_files(
    files: impl IntoIterator<Item = RateFile>,
) -> Result<FxCache, FxLoaderError> {
    let mut cache = FxCache::new();

    let mut sorted: Vec<RateFile> = files.into_iter().collect();
    sorted.sort_by_key(|f| f.modified.unwrap_or(UNIX_EPOCH));

    for file in sorted {
        let name = file.name.to_string_lossy().into_owned();
        let expected = expected_year_month_from_path(&file.name)?;
        let source = RateSource {
            path: file.name.clone(),
            period: None,
            modified: file.modified,
        };
        let entries = parse_monthly_rates(&file.xml, source, Some(expected)).map_err(|source| {
            FxLoaderError::Parse {
                name: name.clone(),
                source,
            }
        })?;
        cache.extend(entries);
    }

    Ok(cache)
}
