//! Input data types.

use serde::Deserialize;

/// Observation value as written in an input file.
///
/// Any TOML value is accepted; see [`RawValue::coerce`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Int(i64),
    Float(f64),
    Text(String),
    Other(toml::Value),
}

impl RawValue {
    /// Convert to an observation, `None` meaning missing.
    ///
    /// NaN, strings that do not parse as a number and non-numeric values
    /// (booleans, datetimes, arrays, tables) are missing.
    pub fn coerce(&self) -> Option<f64> {
        let val = match self {
            RawValue::Int(int) => *int as f64,
            RawValue::Float(float) => *float,
            RawValue::Text(text) => text.trim().parse::<f64>().ok()?,
            RawValue::Other(_) => return None,
        };
        (!val.is_nan()).then_some(val)
    }
}

/// Group label.
///
/// Labels are opaque: only equality matters, so the integer `1`
/// and the string `"1"` are different labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Int(i64),
    Text(String),
}

/// Coerce a whole sequence of raw values.
pub fn coerce_all(raw_vals: &[RawValue]) -> Vec<Option<f64>> {
    raw_vals.iter().map(RawValue::coerce).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_coerce_to_floats() {
        assert_eq!(RawValue::Int(3).coerce(), Some(3.0));
        assert_eq!(RawValue::Float(-1.25).coerce(), Some(-1.25));
        assert_eq!(RawValue::Float(f64::INFINITY).coerce(), Some(f64::INFINITY));
    }

    #[test]
    fn nan_and_junk_are_missing() {
        assert_eq!(RawValue::Float(f64::NAN).coerce(), None);
        assert_eq!(RawValue::Text("NA".into()).coerce(), None);
        assert_eq!(RawValue::Text("nan".into()).coerce(), None);
        assert_eq!(RawValue::Text(String::new()).coerce(), None);
    }

    #[test]
    fn non_numeric_values_are_missing() {
        let doc: toml::Table = toml::from_str("values = [1, true, 3]").expect("failed to parse");
        let values: Vec<RawValue> = doc["values"]
            .clone()
            .try_into()
            .expect("failed to deserialize values");
        assert_eq!(coerce_all(&values), vec![Some(1.0), None, Some(3.0)]);
    }

    #[test]
    fn numeric_strings_are_parsed() {
        assert_eq!(RawValue::Text(" 2.5 ".into()).coerce(), Some(2.5));
        assert_eq!(RawValue::Text("7".into()).coerce(), Some(7.0));
    }

    #[test]
    fn mixed_values_deserialize_from_toml() {
        #[derive(Deserialize)]
        struct Doc {
            values: Vec<RawValue>,
            labels: Vec<Label>,
        }

        let doc: Doc = toml::from_str(
            r#"
values = [1, 2.5, "NA", nan, true, 1979-05-27T07:32:00Z, [4], "3"]
labels = [1, "1", "MA"]
"#,
        )
        .expect("failed to parse document");

        assert_eq!(
            coerce_all(&doc.values),
            vec![Some(1.0), Some(2.5), None, None, None, None, None, Some(3.0)]
        );
        assert_eq!(
            doc.labels,
            vec![Label::Int(1), Label::Text("1".into()), Label::Text("MA".into())]
        );
        assert_ne!(doc.labels[0], doc.labels[1]);
    }
}
