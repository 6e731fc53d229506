//! Request and response models for the Febos frontend API.
//!
//! Notes
//! - Wire names are camelCase; Rust fields are snake_case.
//! - Required fields are plain types, a missing or mistyped one fails validation.
//! - Optional fields are `Option`; a present `null` reads as `None` and `None` is
//!   never written back out.
//! - Unknown fields are ignored on every entity except `DataAnalysisEntry`, which
//!   keeps them in `extra`.
//! - Timestamps stay strings exactly as the server formats them.

use chrono::Utc;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeSet;

// =====================
// Login
// =====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPostResponse {
    pub auth_list: Vec<String>,
    pub creation_date: String,
    pub email: String,
    pub enabled: bool,
    pub id: i64,
    pub installation_id_list: Vec<i64>,
    pub name: String,
    pub profile_id: i64,
    pub profile_name: String,
    pub tenant_id: i64,
    pub tenant_name: String,
    pub username: String,
}

// =====================
// Installations
// =====================

/// The list endpoint fills the bracketed admin/user/counter fields; the copy embedded
/// in a page config carries only the identity fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Installation {
    pub id: i64,
    pub code: String,
    pub code_name: String,
    pub label: String,
    pub name: String,
    pub tenant_id: i64,
    pub tenant_name: String,
    pub tag_set: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_user_id: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_user_name: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_alarm: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_controller: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_disconnected: Option<i64>,
}

pub type InstallationGetResponse = Vec<Installation>;

// =====================
// Page config topology
// =====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub label: String,
    pub device_type_id: i64,
    pub device_type_name: String,
    pub model_id: i64,
    pub model_name: String,
    pub controller_id: i64,
    pub controller_name: String,
    pub installation_id: i64,
    pub enabled: bool,
    pub ord: i64,
    pub tenant_id: i64,
    pub tenant_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installation_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installation_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thing {
    pub id: i64,
    pub address: String,
    pub code: String,
    pub label: String,
    pub model_id: i64,
    pub model_name: String,
    pub thing_type_code: String,
    pub thing_type_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ord: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Input {
    pub id: i64,
    pub code: String,
    pub label: String,
    pub input_type: String,
    pub category: String,
    pub thing_id: i64,
    pub device_id: i64,
    pub data_offset: i64,
    pub ord: i64,
    pub save_history: bool,
    pub input_option_dto_list: Vec<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_model_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thing_model_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meas_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_int_value: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_get: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub null_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter_editor_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputGroup {
    pub device_id: i64,
    pub input_group_code: String,
    /// Key passed to the real-time and historical endpoints.
    pub input_group_get_code: String,
    pub input_group_id: i64,
    pub input_list: Vec<Input>,
    pub ord: i64,
    pub thing_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    pub code: String,
    pub default_device_id: i64,
    pub default_thing_id: i64,
    pub id: i64,
    pub input_group_get_code_list: Vec<String>,
    pub label: String,
    pub name: String,
    pub ord: i64,
    pub tab_id: i64,
    pub widget_input_group_list: Vec<InputGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub code: String,
    pub id: i64,
    pub input_group_get_code_map: IndexMap<String, Vec<String>>,
    pub label: String,
    pub name: String,
    pub ord: i64,
    pub page_id: i64,
    pub widget_list: Vec<Widget>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub code: String,
    pub code_name: String,
    pub id: i64,
    pub input_group_get_code_list: Vec<String>,
    pub label: String,
    pub name: String,
    pub ord: i64,
    pub page_type: String,
    pub tab_list: Vec<Tab>,
}

/// Maps are keyed by the stringified entity id, in server order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageConfigGetResponse {
    pub device_map: IndexMap<String, Device>,
    pub installation: Installation,
    pub page_map: IndexMap<String, Page>,
    pub thing_map: IndexMap<String, Thing>,
}

impl PageConfigGetResponse {
    pub fn input_groups(&self) -> impl Iterator<Item = &InputGroup> {
        self.page_map
            .values()
            .flat_map(|page| page.tab_list.iter())
            .flat_map(|tab| tab.widget_list.iter())
            .flat_map(|widget| widget.widget_input_group_list.iter())
    }

    pub fn inputs(&self) -> impl Iterator<Item = &Input> {
        self.input_groups().flat_map(|group| group.input_list.iter())
    }

    /// Distinct `inputGroupGetCode` values across all pages, sorted.
    pub fn input_group_codes(&self) -> BTreeSet<String> {
        self.input_groups()
            .map(|group| group.input_group_get_code.clone())
            .collect()
    }
}

// =====================
// Real-time data
// =====================

/// Wrapper around a single reading. `i` is left untyped on purpose: the server sends
/// numbers, strings or other JSON depending on the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Value {
    pub i: JsonValue,
}

impl Value {
    pub fn new(i: impl Into<JsonValue>) -> Self {
        Value { i: i.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeData {
    pub device_id: i64,
    pub thing_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_code: Option<String>,
    pub ts: String,
    pub data: IndexMap<String, Value>,
}

impl RealtimeData {
    /// Entry stamped with the current UTC time, millisecond precision.
    pub fn new(device_id: i64, thing_id: i64, data: IndexMap<String, Value>) -> Self {
        RealtimeData {
            device_id,
            thing_id,
            group_code: None,
            ts: Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            data,
        }
    }
}

pub type RealtimeDataGetResponse = Vec<RealtimeData>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeDataPostResponse {
    pub err_code: i64,
    pub msg: String,
}

// =====================
// Febos device data
// =====================

/// Raw snapshot of a slave unit. Environmental values are unscaled integers
/// (temperatures in tenths of a degree on the devices seen so far).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slave {
    pub indirizzo_slave: String,
    pub nome_slave: String,
    pub temp: i64,
    pub set_temp: i64,
    pub call_temp: i64,
    pub humid: i64,
    pub call_humid: i64,
    pub confort: i64,
    pub stagione: i64,
    pub status_slave: String,
    pub centrallizato: i64,
}

impl Slave {
    /// Numeric fields reported as resources, with their lowercased wire names.
    pub fn readings(&self) -> [(&'static str, i64); 7] {
        [
            ("temp", self.temp),
            ("settemp", self.set_temp),
            ("calltemp", self.call_temp),
            ("humid", self.humid),
            ("callhumid", self.call_humid),
            ("confort", self.confort),
            ("stagione", self.stagione),
        ]
    }
}

pub type GetFebosSlaveGetResponse = Vec<Slave>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetLanguageGetResponse {
    pub ts: String,
    #[serde(rename = "ID_language")]
    pub id_language: String,
}

/// One analysis row: a timestamp plus whatever input codes the device reports,
/// kept in server order. Every code must carry a string value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDataAnalysisEntry")]
pub struct DataAnalysisEntry {
    pub ts: String,
    #[serde(flatten)]
    pub extra: IndexMap<String, String>,
}

// Flattened maps lose the key in serde's error path, so values are checked here.
#[derive(Deserialize)]
struct RawDataAnalysisEntry {
    ts: String,
    #[serde(flatten)]
    extra: IndexMap<String, JsonValue>,
}

impl TryFrom<RawDataAnalysisEntry> for DataAnalysisEntry {
    type Error = String;

    fn try_from(raw: RawDataAnalysisEntry) -> Result<Self, Self::Error> {
        let mut extra = IndexMap::with_capacity(raw.extra.len());
        for (code, value) in raw.extra {
            match value {
                JsonValue::String(s) => {
                    extra.insert(code, s);
                }
                other => return Err(format!("input code {code}: expected a string, got {other}")),
            }
        }
        Ok(DataAnalysisEntry { ts: raw.ts, extra })
    }
}

pub type GetDataAnalysisGetResponse = Vec<DataAnalysisEntry>;

// =====================
// Historical data
// =====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputCode {
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalDataPoint {
    pub ts: String,
    /// Positional: `vs[k]` belongs to `inputArray[k]` of the owning entry.
    pub vs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalDataEntry {
    pub device_id: i64,
    pub thing_id: i64,
    pub group_code: String,
    pub input_array: Vec<InputCode>,
    pub data: Vec<HistoricalDataPoint>,
}

impl HistoricalDataEntry {
    pub fn codes(&self) -> Vec<&str> {
        self.input_array.iter().map(|c| c.code.as_str()).collect()
    }

    /// True when every point carries exactly one value per input code. The schema
    /// does not enforce this, so callers should check before zipping.
    pub fn is_aligned(&self) -> bool {
        self.data.iter().all(|p| p.vs.len() == self.input_array.len())
    }

    /// `(code, value)` pairs for one point, or `None` if its length disagrees with
    /// `input_array`.
    pub fn labelled<'a>(&'a self, point: &'a HistoricalDataPoint) -> Option<Vec<(&'a str, &'a str)>> {
        if point.vs.len() != self.input_array.len() {
            return None;
        }
        Some(
            self.input_array
                .iter()
                .zip(point.vs.iter())
                .map(|(c, v)| (c.code.as_str(), v.as_str()))
                .collect(),
        )
    }
}

pub type HistoricalDataGetResponse = Vec<HistoricalDataEntry>;
