//! Text conversion for scalar values.
//!
//! Format specs follow the placeholder's `:` suffix:
//!
//! | value     | specs |
//! |-----------|-------|
//! | integer   | `x`, `X`, `D<n>`, `000` (zero padding), `N` (grouping), any float spec |
//! | float     | `F<n>`, `N<n>`, `P<n>`, `0.00` / `#,##0.0` patterns |
//! | bool      | `yes|no` style pairs |
//! | timestamp | strftime patterns (`%Y-%m-%d`) |
//! | uuid      | `D` (hyphenated), `N` (simple), `B` (braced) |

use chrono::format::{Item, StrftimeItems};

use crate::error::{RenderError, RenderResult};
use crate::value::Value;

const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DEFAULT_DECIMALS: usize = 2;
/// Largest width or precision a format spec may ask for.
const MAX_DIGITS: usize = 99;

/// Convert a scalar value to text, honouring an optional format spec.
///
/// Structural values (lists, nodes, images, bytes) have no text form here
/// and are rejected.
pub fn format_scalar(value: &Value<'_>, spec: Option<&str>) -> RenderResult<String> {
    match value {
        Value::Null => Ok(String::new()),
        Value::Text(s) => Ok(s.clone()),
        Value::Integer(i) => format_integer(*i, spec),
        Value::Float(x) => format_float(*x, spec),
        Value::Bool(b) => format_bool(*b, spec),
        Value::Timestamp(t) => {
            let pattern = spec.unwrap_or(DEFAULT_TIMESTAMP_FORMAT);
            if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
                return Err(RenderError::invalid_format(pattern, "timestamp"));
            }
            Ok(t.format(pattern).to_string())
        }
        Value::Uuid(u) => match spec {
            None | Some("D") | Some("d") => Ok(u.hyphenated().to_string()),
            Some("N") | Some("n") => Ok(u.simple().to_string()),
            Some("B") | Some("b") => Ok(u.braced().to_string()),
            Some(other) => Err(RenderError::invalid_format(other, "uuid")),
        },
        Value::Object(obj) => obj.to_text(spec),
        other => Err(RenderError::invalid_format(spec.unwrap_or(""), other.kind())),
    }
}

fn format_integer(i: i64, spec: Option<&str>) -> RenderResult<String> {
    let Some(spec) = spec else {
        return Ok(i.to_string());
    };
    match spec {
        "x" => Ok(format!("{:x}", i)),
        "X" => Ok(format!("{:X}", i)),
        "N" | "n" => Ok(group_thousands(&i.to_string())),
        _ if spec.chars().all(|c| c == '0') => {
            Ok(zero_pad(i, check_digits(spec.len(), spec, "integer")?))
        }
        _ => {
            let mut chars = spec.chars();
            let kind = chars.next().unwrap_or(' ');
            let digits = chars.as_str();

            // Fixed-point specs are written from the integer itself so large
            // values keep every digit.
            let wide = i128::from(i);
            match kind {
                'D' | 'd' => {
                    let width = parse_digits(digits, spec, "integer")?.unwrap_or(0);
                    Ok(zero_pad(i, width))
                }
                'F' | 'f' => {
                    let decimals =
                        parse_digits(digits, spec, "integer")?.unwrap_or(DEFAULT_DECIMALS);
                    Ok(with_zero_fraction(wide, decimals))
                }
                'N' | 'n' => {
                    let decimals =
                        parse_digits(digits, spec, "integer")?.unwrap_or(DEFAULT_DECIMALS);
                    Ok(group_thousands(&with_zero_fraction(wide, decimals)))
                }
                'P' | 'p' => {
                    let decimals =
                        parse_digits(digits, spec, "integer")?.unwrap_or(DEFAULT_DECIMALS);
                    Ok(format!("{}%", with_zero_fraction(wide * 100, decimals)))
                }
                '0' | '#' if is_numeric_pattern(spec) => {
                    let text = with_zero_fraction(wide, pattern_decimals(spec, "integer")?);
                    if spec.contains(',') {
                        Ok(group_thousands(&text))
                    } else {
                        Ok(text)
                    }
                }
                _ => Err(RenderError::invalid_format(spec, "integer")),
            }
        }
    }
}

fn format_bool(b: bool, spec: Option<&str>) -> RenderResult<String> {
    match spec {
        None => Ok(b.to_string()),
        Some(spec) => match spec.split_once('|') {
            Some((yes, no)) => Ok(if b { yes } else { no }.to_string()),
            None => Err(RenderError::invalid_format(spec, "bool")),
        },
    }
}

fn parse_digits(digits: &str, spec: &str, kind: &str) -> RenderResult<Option<usize>> {
    if digits.is_empty() {
        return Ok(None);
    }
    let n = digits
        .parse::<usize>()
        .map_err(|_| RenderError::invalid_format(spec, kind))?;
    check_digits(n, spec, kind).map(Some)
}

/// Reject widths and precisions above [`MAX_DIGITS`].
fn check_digits(n: usize, spec: &str, kind: &str) -> RenderResult<usize> {
    if n > MAX_DIGITS {
        return Err(RenderError::invalid_format(spec, kind));
    }
    Ok(n)
}

/// Decimal places of a `0.00` style pattern.
fn pattern_decimals(spec: &str, kind: &str) -> RenderResult<usize> {
    let decimals = spec
        .split_once('.')
        .map(|(_, frac)| frac.len())
        .unwrap_or(0);
    check_digits(decimals, spec, kind)
}

fn with_zero_fraction(n: i128, decimals: usize) -> String {
    if decimals == 0 {
        n.to_string()
    } else {
        format!("{}.{}", n, "0".repeat(decimals))
    }
}

fn is_numeric_pattern(spec: &str) -> bool {
    spec.chars().all(|c| matches!(c, '0' | '#' | ',' | '.'))
        && spec.matches('.').count() <= 1
        && spec
            .split_once('.')
            .map(|(_, frac)| frac.chars().all(|c| matches!(c, '0' | '#')))
            .unwrap_or(true)
}

fn zero_pad(i: i64, width: usize) -> String {
    if i < 0 {
        format!("-{:0width$}", i.unsigned_abs(), width = width)
    } else {
        format!("{:0width$}", i, width = width)
    }
}

/// Insert `,` between groups of three digits of the integer part.
fn group_thousands(number: &str) -> String {
    let (sign, unsigned) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}
