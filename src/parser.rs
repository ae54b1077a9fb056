use std::path::Path;

use csv::{ReaderBuilder, StringRecord};

use crate::domain::{is_headquarter_code, BankRecord};
use crate::error::ParseError;

const COUNTRY_CODE_HEADER: &str = "COUNTRY ISO2 CODE";
const SWIFT_CODE_HEADER: &str = "SWIFT CODE";
const BANK_NAME_HEADER: &str = "NAME";
const ADDRESS_HEADER: &str = "ADDRESS";
const COUNTRY_NAME_HEADER: &str = "COUNTRY NAME";

/// Column indices resolved from the header row, so a reordered export still
/// parses correctly.
struct Columns {
    country_code: usize,
    swift_code: usize,
    name: usize,
    address: usize,
    country_name: usize,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self, ParseError> {
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or(ParseError::MissingColumn(name))
        };

        Ok(Self {
            country_code: find(COUNTRY_CODE_HEADER)?,
            swift_code: find(SWIFT_CODE_HEADER)?,
            name: find(BANK_NAME_HEADER)?,
            address: find(ADDRESS_HEADER)?,
            country_name: find(COUNTRY_NAME_HEADER)?,
        })
    }
}

/// Parse the bulk swift code CSV into records, in file order.
///
/// The header row is consumed to resolve column positions and is not part of
/// the output. Rows are not deduplicated; the store's uniqueness rule handles
/// repeated codes. `is_headquarter` is derived from each row's code.
pub fn parse_swift_csv(path: &Path) -> Result<Vec<BankRecord>, ParseError> {
    let mut reader = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|source| ParseError::SourceUnavailable {
            path: path.display().to_string(),
            source,
        })?;

    let columns = Columns::resolve(reader.headers()?)?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        let field = |idx: usize| row.get(idx).ok_or(ParseError::MalformedRow { line });

        let swift_code = field(columns.swift_code)?.to_string();
        records.push(BankRecord {
            address: field(columns.address)?.to_string(),
            name: field(columns.name)?.to_string(),
            country_code: field(columns.country_code)?.to_string(),
            country_name: field(columns.country_name)?.to_string(),
            is_headquarter: is_headquarter_code(&swift_code),
            swift_code,
        });
    }

    Ok(records)
}
