use anyhow::{anyhow, Result};

use crate::data::{EffectRef, PlotData};

/// Column references as the caller wrote them.
#[derive(Debug, Clone, Default)]
pub struct ColumnSpec {
    pub point: String,
    pub lower: String,
    pub upper: String,
    pub effects: Vec<EffectRef>,
    pub id_col: Option<String>,
    pub label_col: Option<String>,
    pub group_col: Option<String>,
}

/// Column references checked against the table and spelled as its headers are.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedColumns {
    pub point: String,
    pub lower: String,
    pub upper: String,
    pub effects: Vec<EffectRef>,
    pub id_col: Option<String>,
    pub label_col: Option<String>,
    pub group_col: Option<String>,
}

fn header<'a>(data: &'a PlotData, name: &str) -> Result<&'a str> {
    data.column_index(name)
        .map(|i| data.headers[i].as_str())
        .ok_or_else(|| anyhow!("Column '{}' not found", name))
}

fn optional_header(data: &PlotData, name: &Option<String>) -> Result<Option<String>> {
    name.as_deref().map(|n| header(data, n).map(str::to_string)).transpose()
}

/// Validate every referenced column exists before the axis engine runs.
pub fn resolve_columns(spec: &ColumnSpec, data: &PlotData) -> Result<ResolvedColumns> {
    let effects = spec
        .effects
        .iter()
        .map(|effect| {
            let [point, lower, upper] = effect.columns();
            Ok(EffectRef::new(
                &effect.id,
                header(data, point)?,
                header(data, lower)?,
                header(data, upper)?,
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ResolvedColumns {
        point: header(data, &spec.point)?.to_string(),
        lower: header(data, &spec.lower)?.to_string(),
        upper: header(data, &spec.upper)?.to_string(),
        effects,
        id_col: optional_header(data, &spec.id_col)?,
        label_col: optional_header(data, &spec.label_col)?,
        group_col: optional_header(data, &spec.group_col)?,
    })
}
