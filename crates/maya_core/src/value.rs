//! Attribute values decoded from Maya value tokens.
//!
//! Every attribute keeps the token list it was read from. Decoding only adds
//! a best-effort typed view on top; it never replaces the tokens.

use std::fmt;

use maya_math::{
    matrix_from_row_major, parse_float, snap_to_integer, DMat4, DVec2, DVec3, DVec4,
    INTEGER_EPSILON,
};

/// Shape of an attribute value as far as the decoder could tell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Bool,
    Int,
    Float,
    Vector2,
    Vector3,
    Vector4,
    Matrix4x4,
    StringArray,
    /// Anything else: strings, numeric arrays, geometry blobs, unknown data types
    Tokens,
}

impl AttributeKind {
    /// Short tag used in summaries and CLI output.
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeKind::Bool => "bool",
            AttributeKind::Int => "int",
            AttributeKind::Float => "float",
            AttributeKind::Vector2 => "float2",
            AttributeKind::Vector3 => "float3",
            AttributeKind::Vector4 => "float4",
            AttributeKind::Matrix4x4 => "matrix",
            AttributeKind::StringArray => "string[]",
            AttributeKind::Tokens => "tokens",
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed attribute value.
#[derive(Clone, Debug, PartialEq)]
pub enum ParsedValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Float2(DVec2),
    Float3(DVec3),
    Float4(DVec4),
    Matrix(DMat4),
    FloatArray(Vec<f64>),
    IntArray(Vec<i64>),
    StringArray(Vec<String>),
    String(String),
}

impl ParsedValue {
    /// Three-component view; scalars are not promoted.
    pub fn as_dvec3(&self) -> Option<DVec3> {
        match self {
            ParsedValue::Float3(v) => Some(*v),
            ParsedValue::FloatArray(values) if values.len() >= 3 => {
                Some(DVec3::new(values[0], values[1], values[2]))
            }
            _ => None,
        }
    }
}

fn write_joined<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    values: &[T],
    separator: &str,
) -> fmt::Result {
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{}", value)?;
    }
    Ok(())
}

impl fmt::Display for ParsedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsedValue::Bool(v) => write!(f, "{}", v),
            ParsedValue::Int(v) => write!(f, "{}", v),
            ParsedValue::Float(v) => write!(f, "{}", v),
            ParsedValue::Float2(v) => write!(f, "({}, {})", v.x, v.y),
            ParsedValue::Float3(v) => write!(f, "({}, {}, {})", v.x, v.y, v.z),
            ParsedValue::Float4(v) => write!(f, "({}, {}, {}, {})", v.x, v.y, v.z, v.w),
            ParsedValue::Matrix(m) => {
                // Printed in Maya's row order, one row per group
                let values = m.to_cols_array();
                f.write_str("[")?;
                for (row, chunk) in values.chunks(4).enumerate() {
                    if row > 0 {
                        f.write_str(" | ")?;
                    }
                    write_joined(f, chunk, " ")?;
                }
                f.write_str("]")
            }
            ParsedValue::FloatArray(values) => {
                f.write_str("[")?;
                write_joined(f, values, ", ")?;
                f.write_str("]")
            }
            ParsedValue::IntArray(values) => {
                f.write_str("[")?;
                write_joined(f, values, ", ")?;
                f.write_str("]")
            }
            ParsedValue::StringArray(values) => {
                f.write_str("[")?;
                write_joined(f, values, ", ")?;
                f.write_str("]")
            }
            ParsedValue::String(s) => f.write_str(s),
        }
    }
}

/// One attribute as read from the scene: its raw tokens plus an optional typed view.
#[derive(Clone, Debug, PartialEq)]
pub struct RawAttributeValue {
    /// Decoded shape
    pub kind: AttributeKind,

    /// Original value tokens, in file order
    pub tokens: Vec<String>,

    /// Best-effort typed value
    pub parsed: Option<ParsedValue>,
}

impl RawAttributeValue {
    /// Create a value from already-decoded parts.
    pub fn new(kind: AttributeKind, tokens: Vec<String>, parsed: Option<ParsedValue>) -> Self {
        Self {
            kind,
            tokens,
            parsed,
        }
    }

    /// Create an undecoded value that only carries tokens.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            AttributeKind::Tokens,
            tokens.into_iter().map(Into::into).collect(),
            None,
        )
    }

    /// Whether a typed value is available.
    pub fn has_parsed_value(&self) -> bool {
        self.parsed.is_some()
    }

    pub fn parsed_value(&self) -> Option<&ParsedValue> {
        self.parsed.as_ref()
    }

    pub fn value_tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Decode tokens, using Maya's `-type` data type name when there is one.
    pub fn decode(type_hint: Option<&str>, tokens: Vec<String>) -> Self {
        let (kind, parsed) = match type_hint {
            Some(hint) => decode_with_hint(hint, &tokens),
            None => decode_by_shape(&tokens),
        };
        Self::new(kind, tokens, parsed)
    }

    /// Decode the values of a multi-element range such as `.pt[0:3]`.
    ///
    /// All numeric tokens become a flat float array; anything else stays raw.
    pub fn decode_array(tokens: Vec<String>) -> Self {
        let parsed = parse_all_numbers(&tokens).map(ParsedValue::FloatArray);
        Self::new(AttributeKind::Tokens, tokens, parsed)
    }
}

fn parse_all_numbers(tokens: &[String]) -> Option<Vec<f64>> {
    if tokens.is_empty() {
        return None;
    }
    tokens.iter().map(|t| parse_float(t)).collect()
}

fn parse_bool(token: &str) -> Option<bool> {
    match token {
        "yes" | "on" | "true" => Some(true),
        "no" | "off" | "false" => Some(false),
        _ => None,
    }
}

/// Split Maya's `count v0 v1 ...` array layout. The count is dropped when present.
fn array_payload(tokens: &[String]) -> &[String] {
    match tokens.split_first() {
        Some((count, rest)) if count.parse::<usize>().is_ok() => rest,
        _ => tokens,
    }
}

fn decode_with_hint(hint: &str, tokens: &[String]) -> (AttributeKind, Option<ParsedValue>) {
    match hint {
        "double2" | "float2" | "long2" | "short2" => {
            let parsed = parse_all_numbers(tokens)
                .filter(|v| v.len() == 2)
                .map(|v| ParsedValue::Float2(DVec2::from_slice(&v)));
            (AttributeKind::Vector2, parsed)
        }
        "double3" | "float3" | "long3" | "short3" => {
            let parsed = parse_all_numbers(tokens)
                .filter(|v| v.len() == 3)
                .map(|v| ParsedValue::Float3(DVec3::from_slice(&v)));
            (AttributeKind::Vector3, parsed)
        }
        "double4" => {
            let parsed = parse_all_numbers(tokens)
                .filter(|v| v.len() == 4)
                .map(|v| ParsedValue::Float4(DVec4::from_slice(&v)));
            (AttributeKind::Vector4, parsed)
        }
        "matrix" => {
            // The "xform" layout is a component list, not a plain matrix
            if tokens.first().map(String::as_str) == Some("xform") {
                return (AttributeKind::Tokens, None);
            }
            let parsed = parse_all_numbers(tokens)
                .and_then(|v| matrix_from_row_major(&v))
                .map(ParsedValue::Matrix);
            (AttributeKind::Matrix4x4, parsed)
        }
        "string" => {
            let parsed = match tokens {
                [] => None,
                [single] => Some(ParsedValue::String(single.clone())),
                many => Some(ParsedValue::String(many.join(" "))),
            };
            (AttributeKind::Tokens, parsed)
        }
        "stringArray" => {
            let values = array_payload(tokens).to_vec();
            (AttributeKind::StringArray, Some(ParsedValue::StringArray(values)))
        }
        "doubleArray" | "floatArray" => {
            let payload = array_payload(tokens);
            let parsed = if payload.is_empty() {
                Some(ParsedValue::FloatArray(Vec::new()))
            } else {
                parse_all_numbers(payload).map(ParsedValue::FloatArray)
            };
            (AttributeKind::Tokens, parsed)
        }
        "Int32Array" => {
            let payload = array_payload(tokens);
            let parsed: Option<Vec<i64>> = payload.iter().map(|t| t.parse::<i64>().ok()).collect();
            (AttributeKind::Tokens, parsed.map(ParsedValue::IntArray))
        }
        _ => (AttributeKind::Tokens, None),
    }
}

fn decode_by_shape(tokens: &[String]) -> (AttributeKind, Option<ParsedValue>) {
    if let [single] = tokens {
        if let Some(b) = parse_bool(single) {
            return (AttributeKind::Bool, Some(ParsedValue::Bool(b)));
        }
        if let Ok(i) = single.parse::<i64>() {
            return (AttributeKind::Int, Some(ParsedValue::Int(i)));
        }
        if let Some(f) = parse_float(single) {
            return (AttributeKind::Float, Some(ParsedValue::Float(f)));
        }
        return (AttributeKind::Tokens, None);
    }

    match parse_all_numbers(tokens) {
        Some(v) if v.len() == 2 => (
            AttributeKind::Vector2,
            Some(ParsedValue::Float2(DVec2::from_slice(&v))),
        ),
        Some(v) if v.len() == 3 => (
            AttributeKind::Vector3,
            Some(ParsedValue::Float3(DVec3::from_slice(&v))),
        ),
        Some(v) if v.len() == 4 => (
            AttributeKind::Vector4,
            Some(ParsedValue::Float4(DVec4::from_slice(&v))),
        ),
        Some(v) if v.len() == 16 => (
            AttributeKind::Matrix4x4,
            matrix_from_row_major(&v).map(ParsedValue::Matrix),
        ),
        _ => (AttributeKind::Tokens, None),
    }
}

/// Numeric fallback used when an attribute has no typed value.
///
/// Non-numeric tokens are skipped, then the count of numbers decides:
///
/// - 0 or 2: `None`
/// - 1: `Int` when within [`INTEGER_EPSILON`] of an integer, else `Float`
/// - 3 to 15: `Float3` of the first three numbers, the rest are ignored
/// - 16 or more: `FloatArray` of every number
///
/// Arrays of 4 to 15 numbers degrade to their first three components.
/// Downstream consumers rely on this, so it is kept as is.
pub fn fallback_decode(tokens: &[String]) -> Option<ParsedValue> {
    let numbers: Vec<f64> = tokens
        .iter()
        .flat_map(|t| t.split_whitespace())
        .filter_map(parse_float)
        .collect();

    match numbers.len() {
        0 => None,
        1 => {
            let value = numbers[0];
            Some(match snap_to_integer(value, INTEGER_EPSILON) {
                Some(i) => ParsedValue::Int(i),
                None => ParsedValue::Float(value),
            })
        }
        3..=15 => Some(ParsedValue::Float3(DVec3::new(
            numbers[0], numbers[1], numbers[2],
        ))),
        n if n >= 4 => Some(ParsedValue::FloatArray(numbers)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_fallback_vector3() {
        let value = RawAttributeValue::from_tokens(["1.0", "2.0", "3.0"]);
        assert!(!value.has_parsed_value());
        assert_eq!(
            fallback_decode(value.value_tokens()),
            Some(ParsedValue::Float3(DVec3::new(1.0, 2.0, 3.0)))
        );
    }

    #[test]
    fn test_fallback_integer_snap() {
        assert_eq!(fallback_decode(&toks(&["5"])), Some(ParsedValue::Int(5)));
        assert_eq!(
            fallback_decode(&toks(&["5.0000001"])),
            Some(ParsedValue::Int(5))
        );
        assert_eq!(
            fallback_decode(&toks(&["5.25"])),
            Some(ParsedValue::Float(5.25))
        );
    }

    #[test]
    fn test_fallback_counts() {
        assert_eq!(fallback_decode(&toks(&[])), None);
        assert_eq!(fallback_decode(&toks(&["abc", "def"])), None);
        assert_eq!(fallback_decode(&toks(&["1", "2"])), None);

        // 4..=15 numbers degrade to the first three
        let ten: Vec<String> = (0..10).map(|i| i.to_string()).collect();
        assert_eq!(
            fallback_decode(&ten),
            Some(ParsedValue::Float3(DVec3::new(0.0, 1.0, 2.0)))
        );

        let sixteen: Vec<String> = (0..16).map(|i| i.to_string()).collect();
        match fallback_decode(&sixteen) {
            Some(ParsedValue::FloatArray(values)) => assert_eq!(values.len(), 16),
            other => panic!("Expected FloatArray, got {:?}", other),
        }
    }

    #[test]
    fn test_fallback_skips_words_and_splits_joined_tokens() {
        assert_eq!(
            fallback_decode(&toks(&["x", "1 2 3"])),
            Some(ParsedValue::Float3(DVec3::new(1.0, 2.0, 3.0)))
        );
    }

    #[test]
    fn test_decode_by_shape() {
        let v = RawAttributeValue::decode(None, toks(&["no"]));
        assert_eq!(v.kind, AttributeKind::Bool);
        assert_eq!(v.parsed, Some(ParsedValue::Bool(false)));

        let v = RawAttributeValue::decode(None, toks(&["7"]));
        assert_eq!(v.kind, AttributeKind::Int);

        let v = RawAttributeValue::decode(None, toks(&["0.5"]));
        assert_eq!(v.kind, AttributeKind::Float);

        let v = RawAttributeValue::decode(None, toks(&["1", "2"]));
        assert_eq!(v.kind, AttributeKind::Vector2);

        let v = RawAttributeValue::decode(None, toks(&["1", "2", "3", "4"]));
        assert_eq!(v.kind, AttributeKind::Vector4);

        let v = RawAttributeValue::decode(None, toks(&["1", "two", "3"]));
        assert_eq!(v.kind, AttributeKind::Tokens);
        assert!(!v.has_parsed_value());
        assert_eq!(v.tokens.len(), 3);
    }

    #[test]
    fn test_decode_with_hint() {
        let v = RawAttributeValue::decode(Some("double3"), toks(&["1", "2", "3"]));
        assert_eq!(v.kind, AttributeKind::Vector3);
        assert_eq!(v.parsed, Some(ParsedValue::Float3(DVec3::new(1.0, 2.0, 3.0))));

        let v = RawAttributeValue::decode(Some("double3"), toks(&["1", "2"]));
        assert_eq!(v.kind, AttributeKind::Vector3);
        assert!(!v.has_parsed_value());

        let v = RawAttributeValue::decode(Some("string"), toks(&["pCube1"]));
        assert_eq!(v.kind, AttributeKind::Tokens);
        assert_eq!(v.parsed, Some(ParsedValue::String("pCube1".into())));

        let v = RawAttributeValue::decode(Some("stringArray"), toks(&["2", "a", "b"]));
        assert_eq!(v.kind, AttributeKind::StringArray);
        assert_eq!(
            v.parsed,
            Some(ParsedValue::StringArray(vec!["a".into(), "b".into()]))
        );

        let v = RawAttributeValue::decode(Some("Int32Array"), toks(&["3", "4", "5", "6"]));
        assert_eq!(v.parsed, Some(ParsedValue::IntArray(vec![4, 5, 6])));

        let v = RawAttributeValue::decode(Some("mesh"), toks(&["1", "2"]));
        assert_eq!(v.kind, AttributeKind::Tokens);
        assert!(!v.has_parsed_value());
    }

    #[test]
    fn test_decode_matrix() {
        let identity = toks(&[
            "1", "0", "0", "0", "0", "1", "0", "0", "0", "0", "1", "0", "2", "3", "4", "1",
        ]);
        let v = RawAttributeValue::decode(Some("matrix"), identity);
        assert_eq!(v.kind, AttributeKind::Matrix4x4);
        match v.parsed {
            Some(ParsedValue::Matrix(m)) => {
                assert_eq!(m.w_axis, DVec4::new(2.0, 3.0, 4.0, 1.0));
            }
            other => panic!("Expected Matrix, got {:?}", other),
        }

        let v = RawAttributeValue::decode(Some("matrix"), toks(&["xform", "1", "1", "1"]));
        assert_eq!(v.kind, AttributeKind::Tokens);
    }

    #[test]
    fn test_decode_array_range() {
        let v = RawAttributeValue::decode_array(toks(&["0", "0.5", "1"]));
        assert_eq!(v.parsed, Some(ParsedValue::FloatArray(vec![0.0, 0.5, 1.0])));
    }

    #[test]
    fn test_display_forms() {
        assert_eq!(ParsedValue::Float3(DVec3::new(1.0, 2.5, 3.0)).to_string(), "(1, 2.5, 3)");
        assert_eq!(ParsedValue::IntArray(vec![1, 2]).to_string(), "[1, 2]");
        assert_eq!(ParsedValue::Bool(true).to_string(), "true");
    }
}
