//! Persisted-state serialization and repair
//!
//! Persisted payloads are untrusted: they may come from an older version,
//! a different tab, or hand-edited storage. Loading therefore never
//! deserializes into the state types directly. The payload is probed as a
//! JSON value and repaired field by field, so a single bad field costs
//! only that field and never the whole state. Loading never fails; the
//! worst outcome is None, which callers treat as "use defaults".

use crate::app::state::{AppState, MAX_COUNTERS};
use crate::config::settings::{
    normalize_group_size, parse_leading_integer, Language, Settings, Theme,
};
use crate::domain::counter::Counter;
use serde_json::Value;
use tracing::{debug, warn};

/// Storage key holding the serialized application state
pub const APP_STATE_KEY: &str = "tallyCounter.appState.v1";
/// Storage key holding the storage-disclosure acknowledgement flag
pub const STORAGE_NOTICE_ACK_KEY: &str = "tallyCounter.storageNoticeAck.v1";
/// Value stored under the acknowledgement key once the notice is dismissed
pub const STORAGE_NOTICE_ACK_VALUE: &str = "yes";

/// Serializes a state for the storage boundary
///
/// # Returns
/// None when serialization fails, which the caller treats the same as a
/// failed storage write: persistence is best-effort
pub fn serialize_state(state: &AppState) -> Option<String> {
    match serde_json::to_string(state) {
        Ok(payload) => Some(payload),
        Err(error) => {
            warn!("failed to serialize app state: {}", error);
            None
        }
    }
}

/// Loads and repairs a persisted state payload
///
/// # Arguments
/// * `raw` - Raw storage value, or None on a storage miss
///
/// # Returns
/// A state satisfying every [`AppState`] invariant, or None when the
/// payload is absent, unparseable, or has no usable counter list; the
/// caller then starts from defaults. Never panics, whatever the input.
pub fn load_state(raw: Option<&str>) -> Option<AppState> {
    let raw = raw.filter(|value| !value.is_empty())?;

    let parsed: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(error) => {
            debug!("discarding unparseable persisted state: {}", error);
            return None;
        }
    };

    let state = normalize_state(&parsed);
    if state.is_none() {
        debug!("discarding persisted state with no usable counters");
    }
    state
}

/// Repairs a parsed payload into a valid state
///
/// Counters beyond the capacity limit are silently dropped; the first
/// three win. Each surviving counter is repaired independently, then the
/// cross-field invariants (active id membership, id-generator floor) are
/// restored from the repaired collection.
fn normalize_state(parsed: &Value) -> Option<AppState> {
    let payload = parsed.as_object()?;
    let raw_counters = payload.get("counters")?.as_array()?;
    if raw_counters.is_empty() {
        return None;
    }

    let mut counters: Vec<Counter> = Vec::with_capacity(MAX_COUNTERS);
    for (position, value) in raw_counters.iter().take(MAX_COUNTERS).enumerate() {
        let counter = normalize_counter(value, position, &counters);
        counters.push(counter);
    }

    let active_counter_id = payload
        .get("activeCounterId")
        .and_then(Value::as_i64)
        .and_then(|id| u32::try_from(id).ok())
        .filter(|id| counters.iter().any(|counter| counter.id == *id))
        .unwrap_or(counters[0].id);

    let max_existing_id = counters
        .iter()
        .map(|counter| counter.id)
        .max()
        .unwrap_or(0);
    let provided_next_id = payload
        .get("nextCounterId")
        .and_then(Value::as_i64)
        .filter(|id| *id > 0)
        .and_then(|id| u32::try_from(id).ok())
        .unwrap_or(2);
    let next_counter_id = max_existing_id.saturating_add(1).max(provided_next_id);

    let settings = normalize_settings(payload.get("settings"));

    Some(AppState::from_parts(
        counters,
        active_counter_id,
        next_counter_id,
        settings,
    ))
}

/// Repairs one persisted counter entry
///
/// Each field falls back independently: a bad id takes the entry's
/// 1-based position, a blank name takes the default for the repaired id,
/// and a count that is not a positive finite number becomes 0 (fractions
/// are floored). An id already claimed by an earlier entry counts as bad
/// too, since ids must stay unique; the entry takes the first free id at or
/// after its position instead.
fn normalize_counter(value: &Value, position: usize, existing: &[Counter]) -> Counter {
    let fallback_id = position as u32 + 1;
    let candidate = value
        .get("id")
        .and_then(Value::as_i64)
        .filter(|id| *id > 0)
        .and_then(|id| u32::try_from(id).ok())
        .unwrap_or(fallback_id);

    let taken = |id: u32| existing.iter().any(|counter| counter.id == id);
    let id = if taken(candidate) {
        let mut fresh = fallback_id;
        while taken(fresh) {
            fresh += 1;
        }
        fresh
    } else {
        candidate
    };

    let name = value
        .get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.trim().is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| format!("Counter {}", id));

    let count = value
        .get("count")
        .and_then(Value::as_f64)
        .filter(|count| count.is_finite() && *count > 0.0)
        .map(|count| count.floor() as u32)
        .unwrap_or(0);

    Counter::with_parts(id, name, count)
}

fn normalize_settings(value: Option<&Value>) -> Settings {
    let theme = value
        .and_then(|settings| settings.get("theme"))
        .and_then(Value::as_str);
    let language = value
        .and_then(|settings| settings.get("language"))
        .and_then(Value::as_str);
    let group_size = value.and_then(|settings| settings.get("talliesPerGroup"));

    Settings {
        theme: Theme::from_persisted(theme),
        tallies_per_group: group_size_from_value(group_size),
        language: Language::from_persisted(language),
    }
}

/// Extracts a group-size candidate from a persisted JSON value
///
/// Numbers are truncated toward zero; strings go through the same
/// leading-integer parse as UI control values. Everything else is
/// non-numeric and takes the default.
fn group_size_from_value(value: Option<&Value>) -> u32 {
    let candidate = match value {
        Some(Value::Number(number)) => number.as_f64().map(|value| value.trunc() as i64),
        Some(Value::String(raw)) => parse_leading_integer(raw),
        _ => None,
    };
    normalize_group_size(candidate)
}
