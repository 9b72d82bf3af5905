//! Parser for the whitespace-delimited Auto MPG table.
//!
//! Layout (no header, one record per line):
//!
//! ```text
//! mpg cylinders displacement horsepower weight acceleration model_year origin "car name"
//! ```
//!
//! The first eight fields are whitespace-separated tokens. The car name is the
//! rest of the line and may contain spaces; surrounding double quotes are
//! stripped. Horsepower may be the literal `?` missing-value marker.

use crate::domain::RawRecord;
use crate::error::AppError;

/// Token used in the source for a missing horsepower value.
pub const MISSING_MARKER: &str = "?";

const NUMERIC_FIELDS: usize = 8;

/// A line that could not be parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    /// 1-based line number in the source text.
    pub line: usize,
    pub message: String,
}

/// Parse output: valid rows plus the lines we skipped.
#[derive(Debug, Clone)]
pub struct ParsedTable {
    pub records: Vec<RawRecord>,
    pub row_errors: Vec<RowError>,
    /// Non-blank lines seen.
    pub rows_read: usize,
}

impl ParsedTable {
    /// Rows whose horsepower field held the missing marker.
    pub fn missing_horsepower(&self) -> usize {
        self.records.iter().filter(|r| r.horsepower.is_none()).count()
    }
}

/// Parse the full table text.
///
/// Malformed lines are recorded in `row_errors` and skipped. An input with no
/// valid rows at all is an error.
pub fn parse_table(text: &str) -> Result<ParsedTable, AppError> {
    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        rows_read += 1;
        match parse_line(line) {
            Ok(r) => records.push(r),
            Err(message) => row_errors.push(RowError {
                line: idx + 1,
                message,
            }),
        }
    }

    if records.is_empty() {
        return Err(AppError::no_data(format!(
            "No valid rows in dataset ({rows_read} lines read, {} rejected).",
            row_errors.len()
        )));
    }

    Ok(ParsedTable {
        records,
        row_errors,
        rows_read,
    })
}

/// Parse a single non-blank line.
pub fn parse_line(line: &str) -> Result<RawRecord, String> {
    let (fields, rest) = split_fields(line)
        .ok_or_else(|| format!("expected at least {} fields plus a car name", NUMERIC_FIELDS))?;

    let car_name = rest.trim().trim_matches('"').trim().to_string();
    if car_name.is_empty() {
        return Err("missing car name".to_string());
    }

    Ok(RawRecord {
        mpg: parse_f64("mpg", fields[0])?,
        cylinders: parse_int("cylinders", fields[1])?,
        displacement: parse_f64("displacement", fields[2])?,
        horsepower: parse_horsepower(fields[3])?,
        weight: parse_f64("weight", fields[4])?,
        acceleration: parse_f64("acceleration", fields[5])?,
        model_year: parse_int("model_year", fields[6])?,
        origin: parse_int("origin", fields[7])?,
        car_name,
    })
}

/// Split off the first eight whitespace-separated tokens and return the rest.
fn split_fields(line: &str) -> Option<([&str; NUMERIC_FIELDS], &str)> {
    let mut fields = [""; NUMERIC_FIELDS];
    let mut rest = line;
    for slot in fields.iter_mut() {
        let trimmed = rest.trim_start();
        if trimmed.is_empty() {
            return None;
        }
        let end = trimmed
            .find(char::is_whitespace)
            .unwrap_or(trimmed.len());
        *slot = &trimmed[..end];
        rest = &trimmed[end..];
    }
    Some((fields, rest))
}

fn parse_f64(name: &str, raw: &str) -> Result<f64, String> {
    let v = raw
        .parse::<f64>()
        .map_err(|e| format!("invalid {name} '{raw}': {e}"))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("non-finite {name} '{raw}'"))
    }
}

/// Integer columns are sometimes written with a trailing `.0`.
fn parse_int<T: TryFrom<i64>>(name: &str, raw: &str) -> Result<T, String> {
    let v = parse_f64(name, raw)?;
    if v.fract() != 0.0 {
        return Err(format!("{name} '{raw}' is not an integer"));
    }
    T::try_from(v as i64).map_err(|_| format!("{name} '{raw}' is out of range"))
}

fn parse_horsepower(raw: &str) -> Result<Option<f64>, String> {
    if raw == MISSING_MARKER {
        return Ok(None);
    }
    parse_f64("horsepower", raw).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = concat!(
        "18.0   8   307.0      130.0      3504.      12.0   70  1\t\"chevrolet chevelle malibu\"\n",
        "25.0   4   98.00      ?          2046.      19.0   71  1\t\"ford pinto\"\n",
        "\n",
        "not a row\n",
        "32.0   4   83.00      61.00      2003.      19.0   74  3\t\"datsun 710\"\n",
    );

    #[test]
    fn parses_rows_and_names_with_spaces() {
        let table = parse_table(SAMPLE).unwrap();
        assert_eq!(table.rows_read, 4);
        assert_eq!(table.records.len(), 3);
        assert_eq!(table.records[0].car_name, "chevrolet chevelle malibu");
        assert_eq!(table.records[0].weight, 3504.0);
        assert_eq!(table.records[0].model_year, 70);
        assert_eq!(table.records[2].origin, 3);
    }

    #[test]
    fn question_mark_is_missing_horsepower() {
        let table = parse_table(SAMPLE).unwrap();
        assert_eq!(table.records[1].horsepower, None);
        assert_eq!(table.missing_horsepower(), 1);
    }

    #[test]
    fn malformed_lines_are_reported_with_line_numbers() {
        let table = parse_table(SAMPLE).unwrap();
        assert_eq!(table.row_errors.len(), 1);
        assert_eq!(table.row_errors[0].line, 4);
    }

    #[test]
    fn empty_input_is_an_error() {
        let err = parse_table("\n\n").unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_NO_DATA);
    }

    #[test]
    fn unquoted_names_are_accepted() {
        let r = parse_line("15 8 350 165 3693 11.5 70 1 buick skylark 320").unwrap();
        assert_eq!(r.car_name, "buick skylark 320");
        assert_eq!(r.cylinders, 8);
    }
}
