use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::instrument;

use crate::{
    error::{AppError, AppResult},
    models::{PreferenceRecord, Point},
};

use super::{DuplicatePolicy, PreferenceStore};

/// How lines that fail to parse or validate are handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Stop at the first bad line
    #[default]
    Abort,
    /// Log the bad line and keep going
    Skip,
}

/// Options for loading a preference file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    pub duplicate_policy: DuplicatePolicy,
    pub malformed_policy: MalformedPolicy,
}

/// Loads a delimited preference file into a new store
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_preferences(path: impl AsRef<Path>, options: LoadOptions) -> AppResult<PreferenceStore> {
    let file = File::open(path.as_ref())?;
    load_preferences_from_reader(BufReader::new(file), options)
}

/// Loads `userId,itemId,value` lines (comma or tab separated) into a new store
pub fn load_preferences_from_reader<R: BufRead>(
    reader: R,
    options: LoadOptions,
) -> AppResult<PreferenceStore> {
    let mut store = PreferenceStore::with_duplicate_policy(options.duplicate_policy);
    let mut skipped = 0usize;

    for (index, bytes) in reader.split(b'\n').enumerate() {
        let line_number = index + 1;
        let parsed = decode_line(line_number, bytes?).and_then(|line| {
            if is_ignorable(&line) {
                return Ok(None);
            }
            parse_preference_line(line_number, &line).map(Some)
        });

        match parsed {
            Ok(Some(record)) => {
                store.put_record(record)?;
            }
            Ok(None) => {}
            Err(e) if e.is_record_error() && options.malformed_policy == MalformedPolicy::Skip =>
            {
                tracing::warn!(line = line_number, error = %e, "Skipping bad preference record");
                skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    tracing::info!(
        users = store.num_users(),
        items = store.num_items(),
        preferences = store.num_preferences(),
        skipped,
        "Preferences loaded"
    );

    Ok(store)
}

/// Parses one preference line
///
/// A tab anywhere in the line selects tab as the delimiter, otherwise
/// comma is used. Fields are trimmed before parsing.
pub fn parse_preference_line(line_number: usize, line: &str) -> AppResult<PreferenceRecord> {
    let delimiter = if line.contains('\t') { '\t' } else { ',' };
    let fields: Vec<&str> = line.split(delimiter).map(str::trim).collect();

    if fields.len() != 3 {
        return Err(AppError::malformed(
            line_number,
            line,
            format!("expected 3 fields, found {}", fields.len()),
        ));
    }

    let user_id = fields[0]
        .parse::<i64>()
        .map_err(|e| AppError::malformed(line_number, line, format!("invalid user id: {}", e)))?;
    let item_id = fields[1]
        .parse::<i64>()
        .map_err(|e| AppError::malformed(line_number, line, format!("invalid item id: {}", e)))?;
    let value = fields[2].parse::<f64>().map_err(|e| {
        AppError::malformed(line_number, line, format!("invalid preference value: {}", e))
    })?;

    PreferenceRecord::new(user_id, item_id, value).map_err(|e| match e {
        AppError::InvalidRecord(reason) => {
            AppError::InvalidRecord(format!("line {}: {}", line_number, reason))
        }
        other => other,
    })
}

/// Loads a point file (comma-separated coordinates, one point per line)
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_points(path: impl AsRef<Path>) -> AppResult<Vec<Point>> {
    let file = File::open(path.as_ref())?;
    load_points_from_reader(BufReader::new(file))
}

/// Parses points from a reader; all points must share the first point's dimension
pub fn load_points_from_reader<R: BufRead>(reader: R) -> AppResult<Vec<Point>> {
    let mut points: Vec<Point> = Vec::new();

    for (index, bytes) in reader.split(b'\n').enumerate() {
        let line_number = index + 1;
        let line = decode_line(line_number, bytes?)?;

        if is_ignorable(&line) {
            continue;
        }

        let coords = line
            .split(',')
            .map(|field| {
                let field = field.trim();
                match field.parse::<f64>() {
                    Ok(v) if v.is_finite() => Ok(v),
                    Ok(v) => Err(AppError::malformed(
                        line_number,
                        &line,
                        format!("non-finite coordinate {}", v),
                    )),
                    Err(e) => Err(AppError::malformed(
                        line_number,
                        &line,
                        format!("invalid coordinate {:?}: {}", field, e),
                    )),
                }
            })
            .collect::<AppResult<Vec<f64>>>()?;

        if let Some(first) = points.first() {
            if first.dimension() != coords.len() {
                return Err(AppError::malformed(
                    line_number,
                    &line,
                    format!(
                        "expected {} coordinates, found {}",
                        first.dimension(),
                        coords.len()
                    ),
                ));
            }
        }

        points.push(Point::new(coords));
    }

    tracing::info!(count = points.len(), "Points loaded");

    Ok(points)
}

/// Decodes one raw line, dropping a trailing carriage return
fn decode_line(line_number: usize, mut bytes: Vec<u8>) -> AppResult<String> {
    if bytes.last() == Some(&b'\r') {
        bytes.pop();
    }
    String::from_utf8(bytes).map_err(|e| {
        AppError::malformed(
            line_number,
            &String::from_utf8_lossy(e.as_bytes()),
            "invalid UTF-8",
        )
    })
}

fn is_ignorable(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}
