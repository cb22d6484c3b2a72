//! Named-field JSON records for station state.
//!
//! Saving writes every held item with its slot index plus the simulation
//! scalars. Loading never fails: absent keys take their defaults and fields
//! that do not decode are logged and replaced by defaults, so an old or
//! damaged record still yields a usable station.

use emberforge_core::{ItemStack, QUALITY_NEUTRAL};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

use crate::anvil::Anvil;
use crate::forge::Forge;

const KEY_ITEMS: &str = "items";
const KEY_SLOT: &str = "slot";
const KEY_ITEM: &str = "item";
const KEY_TEMPERATURE: &str = "temperature";
const KEY_PROGRESS: &str = "progress";
const KEY_QUALITY: &str = "quality";
const KEY_SMITHING: &str = "smithing";
const KEY_LIT: &str = "lit";

/// Failures at the text or file boundary. Record decoding itself is lenient.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to access save file: {0}")]
    Io(#[from] std::io::Error),
    #[error("save data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("save data must be a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// State that round-trips through a JSON record.
pub trait StationRecord: Sized {
    /// Encode into a named-field record.
    fn save(&self) -> Value;

    /// Decode a record, defaulting anything missing or malformed.
    fn load(record: &Value) -> Self;
}

impl StationRecord for Forge {
    fn save(&self) -> Value {
        json!({
            KEY_ITEMS: save_slots(&self.slots),
            KEY_TEMPERATURE: self.temperature,
            KEY_LIT: self.lit,
        })
    }

    fn load(record: &Value) -> Self {
        let fields = record_fields(record, "forge");
        Forge::from_parts(
            load_slots(fields, "forge"),
            read_i32(fields, KEY_TEMPERATURE, 0),
            read_bool(fields, KEY_LIT, false),
        )
    }
}

impl StationRecord for Anvil {
    fn save(&self) -> Value {
        json!({
            KEY_ITEMS: save_slots(&self.slots),
            KEY_TEMPERATURE: self.temperature,
            KEY_PROGRESS: self.progress,
            KEY_QUALITY: self.quality,
            KEY_SMITHING: self.smithing,
        })
    }

    fn load(record: &Value) -> Self {
        let fields = record_fields(record, "anvil");
        Anvil::from_parts(
            load_slots(fields, "anvil"),
            read_i32(fields, KEY_TEMPERATURE, 0),
            read_i32(fields, KEY_PROGRESS, 0),
            read_i32(fields, KEY_QUALITY, QUALITY_NEUTRAL),
            read_bool(fields, KEY_SMITHING, false),
        )
    }
}

/// Encode a station as pretty JSON text.
pub fn to_json_string<T: StationRecord>(station: &T) -> Result<String, PersistError> {
    Ok(serde_json::to_string_pretty(&station.save())?)
}

/// Parse JSON text into a record, requiring a top-level object.
pub fn parse_record(text: &str) -> Result<Value, PersistError> {
    let value: Value = serde_json::from_str(text)?;
    if !value.is_object() {
        return Err(PersistError::NotAnObject(json_kind(&value)));
    }
    Ok(value)
}

/// Decode a station from JSON text.
pub fn from_json_str<T: StationRecord>(text: &str) -> Result<T, PersistError> {
    parse_record(text).map(|record| T::load(&record))
}

/// Write a record to `path` as pretty JSON.
pub fn write_record(path: &Path, record: &Value) -> Result<(), PersistError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_vec_pretty(record)?)?;
    Ok(())
}

/// Read a record from `path`.
pub fn read_record(path: &Path) -> Result<Value, PersistError> {
    parse_record(&fs::read_to_string(path)?)
}

fn record_fields<'a>(record: &'a Value, kind: &str) -> &'a Value {
    if !record.is_object() {
        warn!(found = json_kind(record), "Ignoring non-object {} record", kind);
    }
    record
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn read_i32(fields: &Value, key: &str, default: i32) -> i32 {
    let Some(value) = fields.get(key) else {
        return default;
    };
    match value.as_i64().and_then(|n| i32::try_from(n).ok()) {
        Some(n) => n,
        None => {
            warn!(%value, "Field {} is not a 32-bit integer; using {}", key, default);
            default
        }
    }
}

fn read_bool(fields: &Value, key: &str, default: bool) -> bool {
    let Some(value) = fields.get(key) else {
        return default;
    };
    match value {
        Value::Bool(flag) => *flag,
        Value::Number(n) if n.as_i64().is_some() => n.as_i64() != Some(0),
        _ => {
            warn!(%value, "Field {} is not a boolean; using {}", key, default);
            default
        }
    }
}

fn save_slots(slots: &[Option<ItemStack>]) -> Value {
    let entries = slots
        .iter()
        .enumerate()
        .filter_map(|(slot, stack)| {
            let stack = stack.as_ref()?;
            match serde_json::to_value(stack) {
                Ok(item) => Some(json!({ KEY_SLOT: slot, KEY_ITEM: item })),
                Err(err) => {
                    warn!(slot, %err, "Dropping unserializable item from save");
                    None
                }
            }
        })
        .collect();
    Value::Array(entries)
}

fn load_slots<const N: usize>(fields: &Value, kind: &str) -> [Option<ItemStack>; N] {
    let mut slots: [Option<ItemStack>; N] = std::array::from_fn(|_| None);
    let Some(entries) = fields.get(KEY_ITEMS) else {
        return slots;
    };
    let Some(entries) = entries.as_array() else {
        warn!("{} record has a non-array item list; loading empty slots", kind);
        return slots;
    };

    for entry in entries {
        let slot = entry
            .get(KEY_SLOT)
            .and_then(Value::as_u64)
            .and_then(|s| usize::try_from(s).ok())
            .filter(|s| *s < N);
        let Some(slot) = slot else {
            warn!(%entry, "Skipping {} item with missing or out-of-range slot", kind);
            continue;
        };
        let Some(item) = entry.get(KEY_ITEM) else {
            warn!(slot, "Skipping {} slot entry without an item", kind);
            continue;
        };
        match serde_json::from_value::<ItemStack>(item.clone()) {
            Ok(mut stack) => {
                stack.sanitize();
                slots[slot] = Some(stack);
            }
            Err(err) => warn!(slot, %err, "Skipping undecodable {} item", kind),
        }
    }
    slots
}
