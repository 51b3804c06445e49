//! Bounded, categorized attribute previews for inspection.
//!
//! Attributes are grouped by the first segment of their key (`.translate.translateX`
//! and `.translate[1]` both land in `translate`). Both the number of
//! categories and the entries per category are capped; anything past the
//! caps is left out of the summary but stays in the scene.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::{Deserialize, Serialize};

use crate::scene::NodeRecord;
use crate::value::{AttributeKind, ParsedValue, RawAttributeValue};

/// Category for keys with nothing before the first `.` or `[`.
pub const ROOT_CATEGORY: &str = "(root)";

/// Category for a missing key.
pub const NULL_CATEGORY: &str = "(null)";

/// Category names are cut to this many characters.
pub const MAX_CATEGORY_CHARS: usize = 48;

/// Preview used when building a preview failed.
pub const PREVIEW_ERROR: &str = "(preview error)";

/// Preview for a value without parsed data or tokens.
pub const EMPTY_PREVIEW: &str = "(empty)";

const TOKEN_PREVIEW_LIMIT: usize = 12;
const MAX_PREVIEW_CHARS: usize = 256;

/// Limits for [`AttributeSummary::build_from`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryOptions {
    /// Maximum number of categories (at least 1)
    pub max_categories: usize,

    /// Maximum entries per category (at least 1)
    pub max_entries: usize,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            max_categories: 24,
            max_entries: 32,
        }
    }
}

impl SummaryOptions {
    /// Copy with both limits raised to at least 1.
    pub fn normalized(&self) -> Self {
        Self {
            max_categories: self.max_categories.max(1),
            max_entries: self.max_entries.max(1),
        }
    }
}

/// One previewed attribute.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AttributeEntry {
    pub key: String,
    pub type_tag: String,
    pub preview: String,
}

/// Attributes sharing a key prefix.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AttributeCategory {
    pub name: String,
    pub entries: Vec<AttributeEntry>,
}

/// Per-kind counters over every valid attribute seen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct KindCounts {
    pub bool: usize,
    pub int: usize,
    pub float: usize,
    pub vector2: usize,
    pub vector3: usize,
    pub vector4: usize,
    pub matrix4x4: usize,
    pub string_array: usize,
}

impl KindCounts {
    fn record(&mut self, kind: AttributeKind) {
        match kind {
            AttributeKind::Bool => self.bool += 1,
            AttributeKind::Int => self.int += 1,
            AttributeKind::Float => self.float += 1,
            AttributeKind::Vector2 => self.vector2 += 1,
            AttributeKind::Vector3 => self.vector3 += 1,
            AttributeKind::Vector4 => self.vector4 += 1,
            AttributeKind::Matrix4x4 => self.matrix4x4 += 1,
            AttributeKind::StringArray => self.string_array += 1,
            AttributeKind::Tokens => {}
        }
    }

    pub fn total(&self) -> usize {
        self.bool
            + self.int
            + self.float
            + self.vector2
            + self.vector3
            + self.vector4
            + self.matrix4x4
            + self.string_array
    }
}

/// Bounded category list plus typed counters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AttributeSummary {
    pub categories: Vec<AttributeCategory>,
    pub counts: KindCounts,
    /// Attributes with a usable key
    pub total_attributes: usize,
    /// Attributes left out because a limit was reached
    pub omitted: usize,
}

impl AttributeSummary {
    /// Summarize attributes in iteration order.
    ///
    /// Once `max_categories` categories exist, attributes of new categories
    /// are skipped; existing categories keep accepting entries up to
    /// `max_entries`. Empty keys are ignored entirely.
    pub fn build_from<'a, I>(attributes: I, options: &SummaryOptions) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a RawAttributeValue)>,
    {
        let options = options.normalized();
        let mut summary = Self::default();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for (key, value) in attributes {
            if key.is_empty() {
                continue;
            }
            summary.total_attributes += 1;
            summary.counts.record(value.kind);

            let name = category_name(Some(key));
            let index = match positions.get(&name) {
                Some(&index) => index,
                None if summary.categories.len() >= options.max_categories => {
                    summary.omitted += 1;
                    continue;
                }
                None => {
                    let index = summary.categories.len();
                    summary.categories.push(AttributeCategory {
                        name: name.clone(),
                        entries: Vec::new(),
                    });
                    positions.insert(name, index);
                    index
                }
            };

            let category = &mut summary.categories[index];
            if category.entries.len() >= options.max_entries {
                summary.omitted += 1;
                continue;
            }
            category.entries.push(AttributeEntry {
                key: key.to_string(),
                type_tag: type_tag(value).to_string(),
                preview: preview(value),
            });
        }

        summary
    }

    /// Summarize all attributes of a node record.
    pub fn from_record(record: &NodeRecord, options: &SummaryOptions) -> Self {
        Self::build_from(
            record.attributes.iter().map(|(k, v)| (k.as_str(), v)),
            options,
        )
    }

    /// Number of entries across all categories.
    pub fn entry_count(&self) -> usize {
        self.categories.iter().map(|c| c.entries.len()).sum()
    }

    pub fn category(&self, name: &str) -> Option<&AttributeCategory> {
        self.categories.iter().find(|c| c.name == name)
    }
}

/// Category of an attribute key: the text before the first `.` or `[`
/// (after one leading `.`), capped at [`MAX_CATEGORY_CHARS`] characters.
/// Flat channel names stay apart: `.translateX` is `translateX`, while
/// `.translate.translateX` and `.translate[1]` group under `translate`.
pub fn category_name(key: Option<&str>) -> String {
    let Some(key) = key else {
        return NULL_CATEGORY.to_string();
    };

    let key = key.strip_prefix('.').unwrap_or(key);
    let end = key.find(['.', '[']).unwrap_or(key.len());
    let prefix = &key[..end];

    if prefix.is_empty() {
        return ROOT_CATEGORY.to_string();
    }
    prefix.chars().take(MAX_CATEGORY_CHARS).collect()
}

fn type_tag(value: &RawAttributeValue) -> &'static str {
    match &value.parsed {
        Some(ParsedValue::FloatArray(_)) => "float[]",
        Some(ParsedValue::IntArray(_)) => "int[]",
        Some(ParsedValue::String(_)) => "string",
        _ => value.kind.as_str(),
    }
}

fn join<T: ToString>(values: &[T], separator: &str) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}

fn build_preview(value: &RawAttributeValue) -> String {
    match &value.parsed {
        Some(ParsedValue::FloatArray(values)) if values.len() <= 4 => join(values, ","),
        Some(ParsedValue::FloatArray(values)) => format!("float[{}]", values.len()),
        Some(ParsedValue::IntArray(values)) if values.len() <= 8 => join(values, ","),
        Some(ParsedValue::IntArray(values)) => format!("int[{}]", values.len()),
        Some(ParsedValue::StringArray(values)) if values.len() <= 4 => values.join("|"),
        Some(ParsedValue::StringArray(values)) => format!("string[{}]", values.len()),
        Some(other) => other.to_string(),
        None => match value.tokens.as_slice() {
            [] => EMPTY_PREVIEW.to_string(),
            [single] => single.clone(),
            tokens if tokens.len() > TOKEN_PREVIEW_LIMIT => {
                format!("{} ...", tokens[..TOKEN_PREVIEW_LIMIT].join(" "))
            }
            tokens => tokens.join(" "),
        },
    }
}

fn truncate(preview: String) -> String {
    if preview.chars().count() <= MAX_PREVIEW_CHARS {
        return preview;
    }
    let mut cut: String = preview.chars().take(MAX_PREVIEW_CHARS - 3).collect();
    cut.push_str("...");
    cut
}

/// Short human-readable form of a value. Never fails: a panic while building
/// the preview yields [`PREVIEW_ERROR`].
pub fn preview(value: &RawAttributeValue) -> String {
    guarded(|| truncate(build_preview(value)))
}

fn guarded<F: FnOnce() -> String>(build: F) -> String {
    catch_unwind(AssertUnwindSafe(build)).unwrap_or_else(|_| PREVIEW_ERROR.to_string())
}
