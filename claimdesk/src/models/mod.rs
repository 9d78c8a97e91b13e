//! Domain models shared by the collection views and the upload wizard.
//!
//! - [`Role`] - Who is using the dashboard (selects the wizard and API path)
//! - [`Record`] - A generic table row (JSON object, nested fields allowed)
//! - [`EstimateLine`] - A repair-estimate line whose amount is derived

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::view::path::resolve_path;

// =============================================================================
// Role
// =============================================================================

/// Dashboard role.
///
/// Only [`Role::Workshop`] and [`Role::Customer`] run the upload wizard; the
/// other roles browse claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Auditor,
    ClaimsHandler,
    Customer,
    Workshop,
}

impl Role {
    /// Parse a role from its path segment (`"claims_handler"`, ...).
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "auditor" => Some(Self::Auditor),
            "claims_handler" => Some(Self::ClaimsHandler),
            "customer" => Some(Self::Customer),
            "workshop" => Some(Self::Workshop),
            _ => None,
        }
    }

    /// Segment used in `/api/v1/uploads/{role}/...`.
    pub fn as_path(&self) -> &'static str {
        match self {
            Self::Auditor => "auditor",
            Self::ClaimsHandler => "claims_handler",
            Self::Customer => "customer",
            Self::Workshop => "workshop",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_path())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| format!("Unknown role: {}", s))
    }
}

// =============================================================================
// Record
// =============================================================================

/// A generic row shown in a collection view.
///
/// Fields map to scalars; nested objects are kept so dotted sort keys such
/// as `"labourRR.estAmt"` can resolve.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Wrap a JSON value; `None` unless it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Builder-style field assignment.
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    /// Assign a top-level field.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) {
        self.0.insert(field.to_string(), value.into());
    }

    /// Look up a field by name or dotted path.
    pub fn get(&self, path: &str) -> Option<&Value> {
        resolve_path(&self.0, path)
    }

    /// The `id` field rendered as a string, if it is a number or string.
    pub fn id(&self) -> Option<String> {
        match self.0.get("id")? {
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    /// Field rendered for display; missing or null fields render empty.
    pub fn display(&self, path: &str) -> String {
        match self.get(path) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

// =============================================================================
// Estimate Line
// =============================================================================

/// One part on a repair estimate.
///
/// `est_amount` is derived and recomputed on every price or quantity edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateLine {
    pub id: u64,
    pub part: String,
    quantity: u32,
    unit_price: f64,
    labour_amount: f64,
    est_amount: f64,
}

impl EstimateLine {
    pub fn new(id: u64, part: impl Into<String>, quantity: u32, unit_price: f64) -> Self {
        let mut line = Self {
            id,
            part: part.into(),
            quantity,
            unit_price,
            labour_amount: 0.0,
            est_amount: 0.0,
        };
        line.recompute();
        line
    }

    /// Attach a remove-and-refit labour charge.
    pub fn with_labour(mut self, amount: f64) -> Self {
        self.labour_amount = amount;
        self
    }

    pub fn set_unit_price(&mut self, price: f64) {
        self.unit_price = price;
        self.recompute();
    }

    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
        self.recompute();
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit_price(&self) -> f64 {
        self.unit_price
    }

    pub fn est_amount(&self) -> f64 {
        self.est_amount
    }

    pub fn labour_amount(&self) -> f64 {
        self.labour_amount
    }

    fn recompute(&mut self) {
        self.est_amount = self.unit_price * f64::from(self.quantity);
    }

    /// Row shape used by the estimate table, labour nested under `labourRR`.
    pub fn to_record(&self) -> Record {
        Record::new()
            .with("id", self.id)
            .with("part", self.part.clone())
            .with("quantity", self.quantity)
            .with("unitPrice", self.unit_price)
            .with("estAmount", self.est_amount)
            .with("labourRR", serde_json::json!({ "estAmt": self.labour_amount }))
    }
}

/// Bill total: parts plus labour across all lines.
pub fn bill_total(lines: &[EstimateLine]) -> f64 {
    lines.iter().map(|l| l.est_amount + l.labour_amount).sum()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_from_code() {
        assert_eq!(Role::from_code("workshop"), Some(Role::Workshop));
        assert_eq!(Role::from_code("claims_handler"), Some(Role::ClaimsHandler));
        assert_eq!(Role::from_code("nobody"), None);
        for alias in ["garage", "insured", "handler", "Workshop", "claims-handler"] {
            assert_eq!(Role::from_code(alias), None, "{}", alias);
        }
        assert_eq!("customer".parse::<Role>(), Ok(Role::Customer));
    }

    #[test]
    fn test_role_serializes_as_path_segment() {
        assert_eq!(serde_json::to_value(Role::ClaimsHandler).unwrap(), json!("claims_handler"));
        assert_eq!(Role::Workshop.to_string(), "workshop");
    }

    #[test]
    fn test_record_id_and_display() {
        let record = Record::from_value(json!({ "id": 7, "name": "Jane Smith", "meta": { "city": "Pune" } })).unwrap();
        assert_eq!(record.id().as_deref(), Some("7"));
        assert_eq!(record.display("name"), "Jane Smith");
        assert_eq!(record.display("meta.city"), "Pune");
        assert_eq!(record.display("missing"), "");
    }

    #[test]
    fn test_record_from_non_object() {
        assert!(Record::from_value(json!([1, 2])).is_none());
    }

    #[test]
    fn test_estimate_recomputes_on_edit() {
        let mut line = EstimateLine::new(1, "Bumper", 2, 1500.0);
        assert_eq!(line.est_amount(), 3000.0);

        line.set_unit_price(1750.0);
        assert_eq!(line.est_amount(), 3500.0);

        line.set_quantity(1);
        assert_eq!(line.est_amount(), 1750.0);
    }

    #[test]
    fn test_estimate_record_has_nested_labour() {
        let line = EstimateLine::new(3, "Headlamp", 1, 900.0).with_labour(250.0);
        let record = line.to_record();
        assert_eq!(record.get("labourRR.estAmt"), Some(&json!(250.0)));
        assert_eq!(record.get("estAmount"), Some(&json!(900.0)));
    }

    #[test]
    fn test_bill_total() {
        let lines = vec![
            EstimateLine::new(1, "Bumper", 1, 1000.0).with_labour(200.0),
            EstimateLine::new(2, "Mirror", 2, 300.0),
        ];
        assert_eq!(bill_total(&lines), 1800.0);
    }
}
