//! Bounding region normalisation
//!
//! Turns every shape a [`RawBoundingRegion`] can take into one canonical
//! [`BoundingRegion`]. Parsing never fails loudly: an unusable region simply
//! means the field gets no highlight.

use lazy_static::lazy_static;
use regex::Regex;
use shared_types::{
    page_number_from_value, BoundingRegion, PolygonRepr, PolygonToken, RawBoundingRegion,
};
use tracing::debug;

use crate::error::RegionError;

/// Page assumed when a region does not say which page it is on
pub const DEFAULT_PAGE_NUMBER: u32 = 1;

/// Numbers in a canonical polygon (4 corners)
pub const POLYGON_LEN: usize = 8;

lazy_static! {
    /// `'pageNumber': 2`, `"pageNumber":2`, `page_number=2`
    static ref PAGE_NUMBER_PATTERN: Regex =
        Regex::new(r#"(?i)page_?number['"]?\s*[:=]\s*['"]?(\d+)"#).unwrap();

    /// `'polygon': [1.0, 2.0, ...]`, capturing the bracket body
    static ref POLYGON_PATTERN: Regex =
        Regex::new(r#"(?i)polygon['"]?\s*[:=]\s*\[([^\]]*)\]"#).unwrap();

    /// `{'x': 1.0, 'y': 2.0}` or `Point(x=1.0, y=2.0)` inside a polygon body
    static ref POINT_PATTERN: Regex = Regex::new(
        r#"(?i)\bx['"]?\s*[:=]\s*([^,\s}]+)\s*,\s*['"]?y['"]?\s*[:=]\s*([^,\s})]+)"#
    )
    .unwrap();
}

/// Normalise a raw region, or `None` when it cannot be highlighted
pub fn parse(raw: &RawBoundingRegion) -> Option<BoundingRegion> {
    match try_parse(raw) {
        Ok(region) => Some(region),
        Err(e) => {
            debug!(error = %e, "bounding region has no usable polygon");
            None
        }
    }
}

/// Strict form of [`parse`] reporting why a region was rejected
pub fn try_parse(raw: &RawBoundingRegion) -> Result<BoundingRegion, RegionError> {
    let numbers = match raw {
        RawBoundingRegion::Structured(region) => match &region.polygon {
            Some(polygon) => polygon_numbers(polygon)?,
            None => return Err(RegionError::MissingPolygon),
        },
        RawBoundingRegion::Encoded(text) => {
            let body = POLYGON_PATTERN
                .captures(text)
                .and_then(|caps| caps.get(1))
                .ok_or(RegionError::MissingPolygon)?;
            parse_polygon_body(body.as_str())?
        }
        RawBoundingRegion::Other(_) => return Err(RegionError::UnknownShape),
    };

    let polygon: [f64; POLYGON_LEN] = numbers
        .as_slice()
        .try_into()
        .map_err(|_| RegionError::WrongArity(numbers.len()))?;

    Ok(BoundingRegion {
        page_number: page_number(raw).unwrap_or(DEFAULT_PAGE_NUMBER),
        polygon,
    })
}

/// Page number stated by a region, independent of whether its polygon is usable.
///
/// Returns `None` when the region does not carry a positive page number;
/// callers fall back to [`DEFAULT_PAGE_NUMBER`].
pub fn page_number(raw: &RawBoundingRegion) -> Option<u32> {
    let page = match raw {
        RawBoundingRegion::Structured(region) => region.page_number,
        RawBoundingRegion::Encoded(text) => PAGE_NUMBER_PATTERN
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok()),
        RawBoundingRegion::Other(value) => value
            .get("pageNumber")
            .or_else(|| value.get("page_number"))
            .and_then(page_number_from_value),
    };
    page.filter(|&p| p > 0)
}

/// Page number of a field's first region, defaulting to page 1
pub fn page_number_or_default(raw: Option<&RawBoundingRegion>) -> u32 {
    raw.and_then(page_number).unwrap_or(DEFAULT_PAGE_NUMBER)
}

fn polygon_numbers(polygon: &PolygonRepr) -> Result<Vec<f64>, RegionError> {
    match polygon {
        PolygonRepr::Numbers(numbers) => {
            if numbers.iter().all(|n| n.is_finite()) {
                Ok(numbers.clone())
            } else {
                Err(RegionError::InvalidNumber("non-finite".to_string()))
            }
        }
        PolygonRepr::Points(points) => {
            let mut numbers = Vec::with_capacity(points.len() * 2);
            for point in points {
                numbers.push(finite(point.x)?);
                numbers.push(finite(point.y)?);
            }
            Ok(numbers)
        }
        PolygonRepr::Tokens(tokens) => tokens
            .iter()
            .map(|token| match token {
                PolygonToken::Number(n) => finite(*n),
                PolygonToken::Text(text) => parse_number(text),
            })
            .collect(),
        PolygonRepr::Joined(text) => parse_number_list(text),
    }
}

/// Parse the text between the polygon brackets.
///
/// Handles both a flat number list and a list of printed points.
fn parse_polygon_body(body: &str) -> Result<Vec<f64>, RegionError> {
    if !body.contains(['x', 'X']) {
        return parse_number_list(body);
    }

    let mut numbers = Vec::new();
    for caps in POINT_PATTERN.captures_iter(body) {
        numbers.push(parse_number(&caps[1])?);
        numbers.push(parse_number(&caps[2])?);
    }
    if numbers.is_empty() {
        return Err(RegionError::InvalidNumber(body.trim().to_string()));
    }
    Ok(numbers)
}

fn parse_number_list(text: &str) -> Result<Vec<f64>, RegionError> {
    text.split(',').map(parse_number).collect()
}

fn parse_number(token: &str) -> Result<f64, RegionError> {
    let token = token.trim();
    token
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| RegionError::InvalidNumber(token.to_string()))
}

fn finite(n: f64) -> Result<f64, RegionError> {
    if n.is_finite() {
        Ok(n)
    } else {
        Err(RegionError::InvalidNumber(n.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shared_types::{PolygonPoint, StructuredRegion};

    const SQUARE: [f64; 8] = [1.0, 1.0, 2.0, 1.0, 2.0, 2.0, 1.0, 2.0];

    fn encoded(s: &str) -> RawBoundingRegion {
        RawBoundingRegion::Encoded(s.to_string())
    }

    #[test]
    fn test_parse_structured_numbers() {
        let raw = RawBoundingRegion::structured(2, SQUARE.to_vec());
        assert_eq!(
            parse(&raw),
            Some(BoundingRegion {
                page_number: 2,
                polygon: SQUARE
            })
        );
    }

    #[test]
    fn test_parse_structured_joined_string() {
        let raw = RawBoundingRegion::Structured(StructuredRegion {
            page_number: Some(3),
            polygon: Some(PolygonRepr::Joined(" 1, 1 ,2,1, 2,2,1 , 2 ".to_string())),
        });
        let region = parse(&raw).unwrap();
        assert_eq!(region.page_number, 3);
        assert_eq!(region.polygon, SQUARE);
    }

    #[test]
    fn test_parse_structured_points() {
        let points = SQUARE
            .chunks(2)
            .map(|c| PolygonPoint { x: c[0], y: c[1] })
            .collect();
        let raw = RawBoundingRegion::Structured(StructuredRegion {
            page_number: Some(1),
            polygon: Some(PolygonRepr::Points(points)),
        });
        assert_eq!(parse(&raw).unwrap().polygon, SQUARE);
    }

    #[test]
    fn test_parse_encoded_python_repr() {
        let raw = encoded(
            "{'pageNumber': 1, 'polygon': [1.2695, 0.6988, 2.6009, 0.6985, 2.6009, 1.1626, 1.2663, 1.1626]}",
        );
        let region = parse(&raw).unwrap();
        assert_eq!(region.page_number, 1);
        assert_eq!(
            region.polygon,
            [1.2695, 0.6988, 2.6009, 0.6985, 2.6009, 1.1626, 1.2663, 1.1626]
        );
    }

    #[test]
    fn test_parse_encoded_json_quotes() {
        let raw = encoded(r#"{"pageNumber": 4, "polygon": [1,1,2,1,2,2,1,2]}"#);
        assert_eq!(
            parse(&raw),
            Some(BoundingRegion {
                page_number: 4,
                polygon: SQUARE
            })
        );
    }

    #[test]
    fn test_parse_encoded_printed_points() {
        let raw = encoded(
            "{'page_number': 2, 'polygon': [Point(x=1, y=1), Point(x=2, y=1), Point(x=2, y=2), Point(x=1, y=2)]}",
        );
        let region = parse(&raw).unwrap();
        assert_eq!(region.page_number, 2);
        assert_eq!(region.polygon, SQUARE);
    }

    #[test]
    fn test_encoded_without_page_defaults_to_first_page() {
        let raw = encoded("{'polygon': [1,1,2,1,2,2,1,2]}");
        assert_eq!(parse(&raw).unwrap().page_number, DEFAULT_PAGE_NUMBER);
    }

    #[test]
    fn test_structured_page_zero_defaults_to_first_page() {
        let raw = RawBoundingRegion::structured(0, SQUARE.to_vec());
        assert_eq!(parse(&raw).unwrap().page_number, 1);
    }

    #[test]
    fn test_short_polygon_is_absent() {
        let raw = encoded("{'pageNumber': 1, 'polygon': [1, 2, 3, 4, 5, 6]}");
        assert_eq!(try_parse(&raw), Err(RegionError::WrongArity(6)));
        assert_eq!(parse(&raw), None);
    }

    #[test]
    fn test_long_polygon_is_absent() {
        let raw = RawBoundingRegion::structured(1, vec![0.0; 10]);
        assert_eq!(try_parse(&raw), Err(RegionError::WrongArity(10)));
    }

    #[test]
    fn test_malformed_number_is_absent() {
        let raw = encoded("{'pageNumber': 1, 'polygon': [1, 2, abc, 4, 5, 6, 7, 8]}");
        assert_eq!(
            try_parse(&raw),
            Err(RegionError::InvalidNumber("abc".to_string()))
        );

        let raw = encoded("{'pageNumber': 1, 'polygon': [1, 2, 3, 4, 5, 6, 7, NaN]}");
        assert!(parse(&raw).is_none());
    }

    #[test]
    fn test_missing_brackets_is_absent() {
        let raw = encoded("{'pageNumber': 1, 'polygon': 1, 2, 3, 4, 5, 6, 7, 8}");
        assert_eq!(try_parse(&raw), Err(RegionError::MissingPolygon));
    }

    #[test]
    fn test_unknown_shape_is_absent() {
        let raw = RawBoundingRegion::Other(serde_json::json!([1, 2, 3]));
        assert_eq!(try_parse(&raw), Err(RegionError::UnknownShape));
    }

    #[test]
    fn test_page_number_survives_bad_polygon() {
        let raw = encoded("{'pageNumber': 3, 'polygon': [garbage]}");
        assert!(parse(&raw).is_none());
        assert_eq!(page_number(&raw), Some(3));
        assert_eq!(page_number_or_default(Some(&raw)), 3);
    }

    #[test]
    fn test_page_number_from_other_shape() {
        let raw = RawBoundingRegion::Other(serde_json::json!({"pageNumber": 5, "polygon": [null]}));
        assert_eq!(page_number(&raw), Some(5));
    }

    #[test]
    fn test_parse_string_token_polygon() {
        let raw: RawBoundingRegion = serde_json::from_str(
            r#"{"pageNumber": 2, "polygon": ["1", "1", "2", "1", " 2 ", "2", 1, "2"]}"#,
        )
        .unwrap();
        assert_eq!(
            parse(&raw),
            Some(BoundingRegion {
                page_number: 2,
                polygon: SQUARE
            })
        );

        let raw: RawBoundingRegion = serde_json::from_str(
            r#"{"pageNumber": 2, "polygon": ["1", "1", "2", "1", "2", "2", "1", "two"]}"#,
        )
        .unwrap();
        assert_eq!(
            try_parse(&raw),
            Err(RegionError::InvalidNumber("two".to_string()))
        );
        assert_eq!(page_number(&raw), Some(2));
    }

    #[test]
    fn test_parse_loose_page_numbers() {
        for text in [
            r#"{"pageNumber": 2.0, "polygon": [1,1,2,1,2,2,1,2]}"#,
            r#"{"pageNumber": "2", "polygon": [1,1,2,1,2,2,1,2]}"#,
        ] {
            let raw: RawBoundingRegion = serde_json::from_str(text).unwrap();
            assert_eq!(
                parse(&raw),
                Some(BoundingRegion {
                    page_number: 2,
                    polygon: SQUARE
                }),
                "{}",
                text
            );
        }
    }

    #[test]
    fn test_page_number_from_other_shape_is_lenient() {
        let raw = RawBoundingRegion::Other(serde_json::json!({"pageNumber": "4", "polygon": [null]}));
        assert_eq!(page_number(&raw), Some(4));
        let raw = RawBoundingRegion::Other(serde_json::json!({"page_number": 4.0}));
        assert_eq!(page_number(&raw), Some(4));
    }

    #[test]
    fn test_page_number_default() {
        assert_eq!(page_number_or_default(None), 1);
        assert_eq!(page_number_or_default(Some(&encoded("no page here"))), 1);
    }
}
