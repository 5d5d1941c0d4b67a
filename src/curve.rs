//! Piecewise-linear curves.
//!
//! Text form is `time:value` pairs separated by commas (`"0:0.1, 1:0.9"`),
//! or one bare number meaning a single point at time 0. The interchange form
//! is an array of `{time, value}` objects.

use crate::error::ValueError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// One control point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub time: f32,
    pub value: f32,
}

impl CurvePoint {
    pub fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}

/// Ordered list of control points. Order is kept as given; nothing sorts it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Curve {
    points: Vec<CurvePoint>,
}

impl Curve {
    pub fn new(points: Vec<CurvePoint>) -> Self {
        Self { points }
    }

    /// A curve with one point at time 0.
    pub fn constant(value: f32) -> Self {
        Self::new(vec![CurvePoint::new(0.0, value)])
    }

    pub fn from_pairs(pairs: &[(f32, f32)]) -> Self {
        Self::new(pairs.iter().map(|&(t, v)| CurvePoint::new(t, v)).collect())
    }

    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Parse the text encoding. All whitespace is ignored.
    pub fn parse(text: &str) -> Result<Self, ValueError> {
        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return Ok(Self::default());
        }

        let segments: Vec<&str> = compact.split(',').collect();
        if segments.len() == 1 && !segments[0].contains(':') {
            let value = segments[0]
                .parse::<f32>()
                .map_err(|_| ValueError::CurveSegment(segments[0].to_string()))?;
            return Ok(Self::constant(value));
        }

        let mut points = Vec::with_capacity(segments.len());
        for segment in segments {
            let (time, value) = segment
                .split_once(':')
                .ok_or_else(|| ValueError::CurveSegment(segment.to_string()))?;
            let time = time
                .parse::<f32>()
                .map_err(|_| ValueError::CurveSegment(segment.to_string()))?;
            let value = value
                .parse::<f32>()
                .map_err(|_| ValueError::CurveSegment(segment.to_string()))?;
            points.push(CurvePoint::new(time, value));
        }
        Ok(Self { points })
    }

    /// Render the text encoding.
    pub fn encode(&self) -> String {
        match self.points.as_slice() {
            [] => String::new(),
            [single] => single.value.to_string(),
            points => points
                .iter()
                .map(|p| format!("{}:{}", p.time, p.value))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Copy with every time multiplied by `factor`.
    ///
    /// Used where two schemas measure the time axis in different units.
    pub fn scaled_time(&self, factor: f32) -> Self {
        Self::new(
            self.points
                .iter()
                .map(|p| CurvePoint::new(p.time * factor, p.value))
                .collect(),
        )
    }

    /// Sample the curve at `time`, clamping outside the first/last key.
    ///
    /// Assumes ascending time. An empty curve evaluates to 0.
    pub fn evaluate(&self, time: f32) -> f32 {
        let Some(first) = self.points.first() else {
            return 0.0;
        };
        if time <= first.time {
            return first.value;
        }
        for pair in self.points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if time <= b.time {
                let span = b.time - a.time;
                if span <= f32::EPSILON {
                    return b.value;
                }
                return a.value + (b.value - a.value) * (time - a.time) / span;
            }
        }
        self.points[self.points.len() - 1].value
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for Curve {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// Older exports wrote a bare number instead of a point list.
#[derive(Deserialize)]
#[serde(untagged)]
enum CurveRepr {
    Number(f32),
    Points(Vec<CurvePoint>),
}

impl<'de> Deserialize<'de> for Curve {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<CurveRepr>::deserialize(deserializer)? {
            None => Curve::default(),
            Some(CurveRepr::Number(value)) => Curve::constant(value),
            Some(CurveRepr::Points(points)) => Curve::new(points),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_pairs_ignores_whitespace() {
        let curve = Curve::parse(" 0 : 0.1 ,\t1:0.9 ").unwrap();
        assert_eq!(curve, Curve::from_pairs(&[(0.0, 0.1), (1.0, 0.9)]));
    }

    #[test]
    fn test_parse_bare_number() {
        assert_eq!(Curve::parse("3.5").unwrap(), Curve::constant(3.5));
    }

    #[test]
    fn test_parse_empty() {
        assert!(Curve::parse("").unwrap().is_empty());
        assert!(Curve::parse("   ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_bare_number_among_pairs() {
        assert!(Curve::parse("0:1, 2").is_err());
        assert!(Curve::parse("a:b").is_err());
        assert!(Curve::parse("0:1,").is_err());
    }

    #[test]
    fn test_encode_shapes() {
        assert_eq!(Curve::default().encode(), "");
        assert_eq!(Curve::constant(2.0).encode(), "2");
        assert_eq!(
            Curve::from_pairs(&[(1.0, 0.5), (0.0, 0.25)]).encode(),
            "1:0.5, 0:0.25"
        );
    }

    #[test]
    fn test_text_roundtrip_keeps_order() {
        for text in ["0:0.1, 1:0.9", "0.5:-2, 0.25:7, 1:0", "0.3", ""] {
            let curve = Curve::parse(text).unwrap();
            assert_eq!(Curve::parse(&curve.encode()).unwrap(), curve);
        }
    }

    #[test]
    fn test_json_forms() {
        let points: Curve =
            serde_json::from_value(json!([{"time": 0.0, "value": 1.0}, {"time": 1.0, "value": 2.0}]))
                .unwrap();
        assert_eq!(points, Curve::from_pairs(&[(0.0, 1.0), (1.0, 2.0)]));

        let legacy: Curve = serde_json::from_value(json!(4.0)).unwrap();
        assert_eq!(legacy, Curve::constant(4.0));

        let null: Curve = serde_json::from_value(json!(null)).unwrap();
        assert!(null.is_empty());

        assert_eq!(
            serde_json::to_value(&Curve::constant(4.0)).unwrap(),
            json!([{"time": 0.0, "value": 4.0}])
        );
    }

    #[test]
    fn test_evaluate_interpolates_and_clamps() {
        let curve = Curve::from_pairs(&[(0.0, 0.0), (1.0, 10.0)]);
        assert_eq!(curve.evaluate(-1.0), 0.0);
        assert_eq!(curve.evaluate(0.5), 5.0);
        assert_eq!(curve.evaluate(2.0), 10.0);
        assert_eq!(Curve::default().evaluate(0.5), 0.0);
    }

    #[test]
    fn test_scaled_time() {
        let curve = Curve::from_pairs(&[(1.0, 0.5), (2.0, 0.25)]).scaled_time(10.0);
        assert_eq!(curve, Curve::from_pairs(&[(10.0, 0.5), (20.0, 0.25)]));
    }
}
