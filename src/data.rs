use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::Read;
use std::str::FromStr;

/// A single metadata cell: scalar or numeric sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Number(f64),
    Numbers(Vec<f64>),
    Bool(bool),
    Text(String),
    Null,
}

impl MetaValue {
    /// Finite numeric value, or `None` for anything the aggregator must skip.
    pub fn as_finite(&self) -> Option<f64> {
        match self {
            MetaValue::Number(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    /// Interpret a raw text cell (CSV input).
    pub fn from_cell(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("na") {
            return MetaValue::Null;
        }
        match trimmed.parse::<f64>() {
            Ok(v) => MetaValue::Number(v),
            Err(_) => match trimmed {
                "true" | "TRUE" => MetaValue::Bool(true),
                "false" | "FALSE" => MetaValue::Bool(false),
                _ => MetaValue::Text(trimmed.to_string()),
            },
        }
    }

    /// Text form, used for ids and labels.
    pub fn display_text(&self) -> Option<String> {
        match self {
            MetaValue::Text(s) => Some(s.clone()),
            MetaValue::Number(v) => Some(v.to_string()),
            MetaValue::Bool(b) => Some(b.to_string()),
            MetaValue::Numbers(_) | MetaValue::Null => None,
        }
    }

    fn from_json(value: &Value, field: &str) -> Result<Self> {
        Ok(match value {
            Value::Null => MetaValue::Null,
            Value::Bool(b) => MetaValue::Bool(*b),
            Value::Number(n) => n
                .as_f64()
                .map(MetaValue::Number)
                .unwrap_or(MetaValue::Null),
            Value::String(s) => MetaValue::Text(s.clone()),
            Value::Array(items) => {
                let numbers: Option<Vec<f64>> = items.iter().map(Value::as_f64).collect();
                numbers
                    .map(MetaValue::Numbers)
                    .ok_or_else(|| anyhow!("Field '{}' holds a non-numeric array", field))?
            }
            Value::Object(_) => bail!("Unsupported value type for field '{}'", field),
        })
    }
}

/// One forest-plot row as handed over by the data-model layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub id: String,
    pub label: String,
    pub group_id: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, MetaValue>,
}

impl Row {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            group_id: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with(mut self, field: impl Into<String>, value: MetaValue) -> Self {
        self.metadata.insert(field.into(), value);
        self
    }

    pub fn with_number(self, field: impl Into<String>, value: f64) -> Self {
        self.with(field, MetaValue::Number(value))
    }

    pub fn number(&self, field: &str) -> Option<f64> {
        self.metadata.get(field).and_then(MetaValue::as_finite)
    }
}

/// Secondary effect overlaid on every row: names its own point/lower/upper fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectRef {
    pub id: String,
    pub point_col: String,
    pub lower_col: String,
    pub upper_col: String,
}

impl EffectRef {
    pub fn new(id: &str, point_col: &str, lower_col: &str, upper_col: &str) -> Self {
        Self {
            id: id.to_string(),
            point_col: point_col.to_string(),
            lower_col: lower_col.to_string(),
            upper_col: upper_col.to_string(),
        }
    }

    pub fn columns(&self) -> [&str; 3] {
        [&self.point_col, &self.lower_col, &self.upper_col]
    }
}

/// Command-line form: `id:point:lower:upper`.
impl FromStr for EffectRef {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(':').map(str::trim).collect();
        match parts.as_slice() {
            [id, point, lower, upper] if parts.iter().all(|p| !p.is_empty()) => {
                Ok(EffectRef::new(id, point, lower, upper))
            }
            _ => Err(anyhow!(
                "Invalid effect '{}' (expected id:point:lower:upper)",
                s
            )),
        }
    }
}

/// Tabular input before it is shaped into rows.
#[derive(Debug, Clone)]
pub struct PlotData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<MetaValue>>,
}

impl PlotData {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<MetaValue>>) -> Self {
        Self { headers, rows }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.eq_ignore_ascii_case(name))
    }

    /// Read CSV with a header line; numeric-looking cells become numbers.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()
            .context("Failed to read CSV header")?
            .iter()
            .map(str::to_string)
            .collect();

        if headers.is_empty() {
            bail!("CSV input has no header row");
        }

        let mut rows = Vec::new();
        for (row_idx, record) in rdr.records().enumerate() {
            let record =
                record.with_context(|| format!("Failed to read CSV record {}", row_idx + 1))?;
            if record.len() != headers.len() {
                tracing::warn!(
                    row = row_idx + 1,
                    expected = headers.len(),
                    found = record.len(),
                    "CSV record width differs from header; padding with nulls"
                );
            }
            let row = (0..headers.len())
                .map(|i| record.get(i).map(MetaValue::from_cell).unwrap_or(MetaValue::Null))
                .collect();
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    pub fn from_csv_str(input: &str) -> Result<Self> {
        Self::from_csv_reader(input.as_bytes())
    }

    /// Create PlotData from a JSON array of objects.
    ///
    /// Headers are the union of keys in first-seen order; missing keys are null.
    pub fn from_json(value: &Value) -> Result<Self> {
        let array = value
            .as_array()
            .ok_or_else(|| anyhow!("Input data must be a JSON array of objects"))?;

        let mut headers: Vec<String> = Vec::new();
        for item in array {
            let obj = item
                .as_object()
                .ok_or_else(|| anyhow!("Items in array must be objects"))?;
            for key in obj.keys() {
                if !headers.iter().any(|h| h == key) {
                    headers.push(key.clone());
                }
            }
        }

        let mut rows = Vec::with_capacity(array.len());
        for item in array {
            // Checked above.
            let Some(obj) = item.as_object() else { continue };
            let row = headers
                .iter()
                .map(|h| match obj.get(h) {
                    Some(v) => MetaValue::from_json(v, h),
                    None => Ok(MetaValue::Null),
                })
                .collect::<Result<Vec<_>>>()?;
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    pub fn from_json_str(input: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(input).context("Input is not valid JSON")?;
        Self::from_json(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cell_interpretation() {
        assert_eq!(MetaValue::from_cell("1.5"), MetaValue::Number(1.5));
        assert_eq!(MetaValue::from_cell(" -2 "), MetaValue::Number(-2.0));
        assert_eq!(MetaValue::from_cell(""), MetaValue::Null);
        assert_eq!(MetaValue::from_cell("NA"), MetaValue::Null);
        assert_eq!(MetaValue::from_cell("Smith 2019"), MetaValue::Text("Smith 2019".into()));
        assert!(MetaValue::from_cell("NaN").as_finite().is_none());
    }

    #[test]
    fn test_only_finite_numbers_are_usable() {
        assert_eq!(MetaValue::Number(2.0).as_finite(), Some(2.0));
        assert_eq!(MetaValue::Number(f64::INFINITY).as_finite(), None);
        assert_eq!(MetaValue::Text("2".into()).as_finite(), None);
        assert_eq!(MetaValue::Numbers(vec![1.0]).as_finite(), None);
        assert_eq!(MetaValue::Null.as_finite(), None);
    }

    #[test]
    fn test_csv_reader() {
        let data = PlotData::from_csv_str("study,est,lo,hi\nA,1.2,0.8,1.9\nB,,0.5,NA\n").unwrap();
        assert_eq!(data.headers, vec!["study", "est", "lo", "hi"]);
        assert_eq!(data.rows.len(), 2);
        assert_eq!(data.rows[0][1], MetaValue::Number(1.2));
        assert_eq!(data.rows[1][1], MetaValue::Null);
        assert_eq!(data.rows[1][3], MetaValue::Null);
        assert_eq!(data.column_index("EST"), Some(1));
    }

    #[test]
    fn test_json_union_of_keys() {
        let value = json!([
            {"study": "A", "est": 0.5},
            {"study": "B", "est": 0.7, "weights": [1, 2, 3]}
        ]);
        let data = PlotData::from_json(&value).unwrap();
        assert_eq!(data.headers, vec!["est", "study", "weights"]);
        assert_eq!(data.rows[0][2], MetaValue::Null);
        assert_eq!(data.rows[1][2], MetaValue::Numbers(vec![1.0, 2.0, 3.0]));
    }

    #[test]
    fn test_json_rejects_non_array() {
        assert!(PlotData::from_json(&json!({"a": 1})).is_err());
        assert!(PlotData::from_json(&json!([1, 2])).is_err());
        assert!(PlotData::from_json(&json!([{"a": {"nested": 1}}])).is_err());
    }

    #[test]
    fn test_effect_ref_from_str() {
        let effect: EffectRef = "adj:adj_est:adj_lo:adj_hi".parse().unwrap();
        assert_eq!(effect.id, "adj");
        assert_eq!(effect.columns(), ["adj_est", "adj_lo", "adj_hi"]);
        assert!("adj:est:lo".parse::<EffectRef>().is_err());
        assert!("adj::lo:hi".parse::<EffectRef>().is_err());
    }

    #[test]
    fn test_row_deserializes_from_camel_case() {
        let row: Row = serde_json::from_value(json!({
            "id": "r1",
            "label": "Trial 1",
            "groupId": null,
            "metadata": {"est": 1.5, "note": "x", "draws": [0.1, 0.2]}
        }))
        .unwrap();
        assert_eq!(row.number("est"), Some(1.5));
        assert_eq!(row.number("note"), None);
        assert_eq!(row.number("draws"), None);
        assert_eq!(row.number("missing"), None);
    }
}
