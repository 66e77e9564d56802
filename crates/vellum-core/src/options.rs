//! Typed drawing-command options.
//!
//! Known engine options are addressed through [`ViewOption`]; anything the
//! engine accepts beyond that set goes through [`ViewOption::Custom`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ContextError;

/// A single option value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl OptionValue {
    pub fn kind(&self) -> &'static str {
        match self {
            OptionValue::Bool(_) => "bool",
            OptionValue::Int(_) => "int",
            OptionValue::Float(_) => "float",
            OptionValue::Text(_) => "text",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(v) => Some(*v),
            OptionValue::Int(v) => Some(*v != 0),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            OptionValue::Int(v) => Some(*v as f64),
            OptionValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            OptionValue::Bool(v) => Value::Bool(*v),
            OptionValue::Int(v) => Value::from(*v),
            OptionValue::Float(v) => Value::from(*v),
            OptionValue::Text(v) => Value::String(v.clone()),
        }
    }

    /// Inverse of [`OptionValue::to_json`]. Arrays, objects and null have no option form.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(v) => Some(OptionValue::Bool(*v)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(OptionValue::Int(i)),
                None => n.as_f64().map(OptionValue::Float),
            },
            Value::String(s) => Some(OptionValue::Text(s.clone())),
            _ => None,
        }
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Bool(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        OptionValue::Int(v)
    }
}

impl From<f64> for OptionValue {
    fn from(v: f64) -> Self {
        OptionValue::Float(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        OptionValue::Text(v.to_string())
    }
}

/// Engine option keys.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ViewOption {
    SnapEnabled,
    SnapVertex,
    SnapCenter,
    SnapMidPoint,
    SnapQuadrant,
    SnapNear,
    SnapExtend,
    SnapPerp,
    PerpOut,
    SnapTangent,
    SnapCross,
    SnapParallel,
    SnapGrid,
    SnapPointTol,
    DrawOneShape,
    NewShapeFixedLen,
    NewShapeFixedSize,
    NewShapeLocked,
    ShowGrid,
    DegreeDecimal,
    Custom(String),
}

impl ViewOption {
    const KNOWN: [(ViewOption, &'static str); 20] = [
        (ViewOption::SnapEnabled, "snapEnabled"),
        (ViewOption::SnapVertex, "snapVertex"),
        (ViewOption::SnapCenter, "snapCenter"),
        (ViewOption::SnapMidPoint, "snapMidPoint"),
        (ViewOption::SnapQuadrant, "snapQuadrant"),
        (ViewOption::SnapNear, "snapNear"),
        (ViewOption::SnapExtend, "snapExtend"),
        (ViewOption::SnapPerp, "snapPerp"),
        (ViewOption::PerpOut, "perpOut"),
        (ViewOption::SnapTangent, "snapTangent"),
        (ViewOption::SnapCross, "snapCross"),
        (ViewOption::SnapParallel, "snapParallel"),
        (ViewOption::SnapGrid, "snapGrid"),
        (ViewOption::SnapPointTol, "snapPointTol"),
        (ViewOption::DrawOneShape, "drawOneShape"),
        (ViewOption::NewShapeFixedLen, "newShapeFixedlen"),
        (ViewOption::NewShapeFixedSize, "newShapeFixedsize"),
        (ViewOption::NewShapeLocked, "newShapeLocked"),
        (ViewOption::ShowGrid, "showGrid"),
        (ViewOption::DegreeDecimal, "degreeDecimal"),
    ];

    /// Wire key understood by the engine.
    pub fn key(&self) -> &str {
        if let ViewOption::Custom(key) = self {
            return key;
        }
        Self::KNOWN
            .iter()
            .find(|(opt, _)| opt == self)
            .map(|(_, key)| *key)
            .unwrap_or_default()
    }

    /// Known keys map to their variant; everything else becomes `Custom`.
    pub fn from_key(key: &str) -> Self {
        Self::KNOWN
            .iter()
            .find(|(_, k)| *k == key)
            .map(|(opt, _)| opt.clone())
            .unwrap_or_else(|| ViewOption::Custom(key.to_string()))
    }

    /// Value kind the engine expects, `None` for custom keys.
    pub fn expected_kind(&self) -> Option<&'static str> {
        match self {
            ViewOption::Custom(_) => None,
            ViewOption::SnapPointTol => Some("float"),
            ViewOption::ShowGrid | ViewOption::DegreeDecimal => Some("int"),
            _ => Some("bool"),
        }
    }

    /// Check `value` against the expected kind. Ints are accepted for floats
    /// and for booleans (engine flags are 0/1).
    pub fn check(&self, value: &OptionValue) -> Result<(), ContextError> {
        let Some(expected) = self.expected_kind() else {
            return Ok(());
        };
        let ok = match (expected, value) {
            ("bool", OptionValue::Bool(_) | OptionValue::Int(_)) => true,
            ("int", OptionValue::Int(_) | OptionValue::Bool(_)) => true,
            ("float", OptionValue::Float(_) | OptionValue::Int(_)) => true,
            _ => false,
        };
        if ok {
            Ok(())
        } else {
            Err(ContextError::OptionType {
                key: self.key().to_string(),
                expected,
            })
        }
    }
}

/// Options passed along with a drawing command.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommandOptions {
    values: BTreeMap<ViewOption, OptionValue>,
}

impl CommandOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, rejecting a mismatched kind for known keys.
    pub fn set(&mut self, option: ViewOption, value: impl Into<OptionValue>) -> Result<&mut Self, ContextError> {
        let value = value.into();
        option.check(&value)?;
        self.values.insert(option, value);
        Ok(self)
    }

    pub fn get(&self, option: &ViewOption) -> Option<&OptionValue> {
        self.values.get(option)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ViewOption, &OptionValue)> {
        self.values.iter()
    }

    /// JSON object string for `set_command`. Empty options give `""`.
    pub fn to_json_string(&self) -> String {
        if self.values.is_empty() {
            return String::new();
        }
        let map: Map<String, Value> = self
            .values
            .iter()
            .map(|(k, v)| (k.key().to_string(), v.to_json()))
            .collect();
        Value::Object(map).to_string()
    }

    /// Parse a JSON object; entries with no option form are skipped.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        let map: Map<String, Value> = serde_json::from_str(text)?;
        let values = map
            .iter()
            .filter_map(|(k, v)| OptionValue::from_json(v).map(|v| (ViewOption::from_key(k), v)))
            .collect();
        Ok(Self { values })
    }
}
