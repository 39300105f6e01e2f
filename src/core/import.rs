//! Bulk reconciliation of spreadsheet exports into the ledger.
//!
//! Column meaning is inferred from normalized header names. Parts are upserted
//! with partial-field semantics: a cell that is missing or blank never
//! overwrites stored data. On-hand quantities are applied through
//! [`Ledger::set_quantity`], so an import is a correction and never raises a
//! low-stock alert. A bad row is reported in its own result and the batch
//! carries on.

use crate::{
    core::{
        directory::{self, PartPatch},
        ledger::{Ledger, MAX_QUANTITY},
    },
    entities::location,
    errors::{Error, Result},
};
use sea_orm::TransactionTrait;
use serde::Serialize;
use tracing::{info, warn};

const PART_NUMBER_HEADERS: &[&str] = &[
    "partnumber",
    "partno",
    "partnr",
    "part",
    "pn",
    "sku",
    "itemnumber",
    "itemno",
    "item",
    "articlenumber",
    "varenummer",
    "varenr",
    "delenummer",
    "delenr",
    "artikkelnummer",
    "artnr",
];
const DESCRIPTION_HEADERS: &[&str] = &[
    "description",
    "desc",
    "name",
    "partname",
    "itemname",
    "beskrivelse",
    "navn",
    "tekst",
];
const MIN_QTY_HEADERS: &[&str] = &[
    "minqty",
    "min",
    "minimum",
    "minquantity",
    "minstock",
    "minlevel",
    "reorderlevel",
    "minbeholdning",
    "minantall",
];
const QUANTITY_HEADERS: &[&str] = &[
    "qty",
    "quantity",
    "onhand",
    "onhandqty",
    "stock",
    "count",
    "antall",
    "beholdning",
    "lagerbeholdning",
];
const LOCATION_HEADERS: &[&str] = &[
    "location",
    "locationcode",
    "loc",
    "bin",
    "shelf",
    "lokasjon",
    "plassering",
    "lagerplass",
    "hylle",
];

/// Lowercases a header and drops everything that is not a letter or digit.
#[must_use]
pub fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn is_known_header(cell: &str) -> bool {
    let normalized = normalize_header(cell);
    [
        PART_NUMBER_HEADERS,
        DESCRIPTION_HEADERS,
        MIN_QTY_HEADERS,
        QUANTITY_HEADERS,
        LOCATION_HEADERS,
    ]
    .iter()
    .any(|set| set.contains(&normalized.as_str()))
}

/// Which column holds which logical field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMapping {
    /// Part number column
    pub part_number: usize,
    /// Description column
    pub description: Option<usize>,
    /// Minimum quantity column
    pub min_qty: Option<usize>,
    /// On-hand quantity column
    pub quantity: Option<usize>,
    /// Location code column
    pub location: Option<usize>,
    /// No part-number header was recognized; the first columns were used by position
    pub positional: bool,
}

impl ColumnMapping {
    /// Infers the mapping from a header row, or `None` when no part-number column matches.
    #[must_use]
    pub fn from_headers(headers: &[String]) -> Option<Self> {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
        let mut taken = vec![false; normalized.len()];
        let mut find = |synonyms: &[&str]| {
            let index = normalized
                .iter()
                .enumerate()
                .position(|(i, h)| !taken[i] && synonyms.contains(&h.as_str()))?;
            taken[index] = true;
            Some(index)
        };

        let part_number = find(PART_NUMBER_HEADERS)?;
        Some(Self {
            part_number,
            description: find(DESCRIPTION_HEADERS),
            min_qty: find(MIN_QTY_HEADERS),
            quantity: find(QUANTITY_HEADERS),
            location: find(LOCATION_HEADERS),
            positional: false,
        })
    }

    /// First column is the part number, second the description.
    #[must_use]
    pub fn positional(columns: usize) -> Self {
        Self {
            part_number: 0,
            description: (columns > 1).then_some(1),
            min_qty: None,
            quantity: None,
            location: None,
            positional: true,
        }
    }
}

/// One interpreted data row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportRow {
    /// 1-based line in the payload
    pub line: u64,
    /// Part number cell
    pub part_number: String,
    /// Description, if present and non-empty
    pub description: Option<String>,
    /// Minimum quantity, if present and non-empty
    pub min_qty: Option<i64>,
    /// On-hand quantity, if present and non-empty
    pub quantity: Option<i64>,
    /// Location code, if present and non-empty
    pub location: Option<String>,
    /// Why the row cannot be applied, if it cannot
    pub problem: Option<String>,
}

/// Dry-run output: how the payload would be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportPreview {
    /// Header row as read (empty when the columns were taken by position)
    pub headers: Vec<String>,
    /// Inferred column meaning
    pub mapping: ColumnMapping,
    /// Interpreted data rows
    pub rows: Vec<ImportRow>,
    /// Data rows dropped for having no part number
    pub skipped: usize,
}

/// Outcome of applying one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    /// A new part was created
    Created,
    /// An existing part was updated
    Updated,
    /// Nothing was applied for this row
    Failed,
}

/// Per-row result of an applied import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowResult {
    /// 1-based line in the payload
    pub line: u64,
    /// Part number from the row
    pub part_number: String,
    /// What happened
    pub status: RowStatus,
    /// Quantity written, when the row carried one
    pub quantity_set: Option<i64>,
    /// Barcode the quantity was written at
    pub location: Option<String>,
    /// Failure reason
    pub error: Option<String>,
}

/// Aggregate counts of an applied import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Data rows considered
    pub rows: usize,
    /// Parts created
    pub created: usize,
    /// Parts updated
    pub updated: usize,
    /// Stock quantities written
    pub quantities_set: usize,
    /// Rows that failed
    pub failed: usize,
    /// Rows dropped for having no part number
    pub skipped: usize,
}

/// Results of an applied import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Column mapping used
    pub mapping: ColumnMapping,
    /// One entry per data row
    pub results: Vec<RowResult>,
    /// Aggregate counts
    pub summary: ImportSummary,
}

/// Either a dry-run preview or the applied results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ImportOutcome {
    /// Nothing was written
    Preview(ImportPreview),
    /// Rows were applied
    Applied(ImportReport),
}

fn sniff_delimiter(payload: &[u8]) -> u8 {
    let first_line = payload.split(|b| *b == b'\n').next().unwrap_or_default();
    [b',', b';', b'\t']
        .into_iter()
        .max_by_key(|d| first_line.iter().filter(|b| *b == d).count())
        .filter(|d| first_line.contains(d))
        .unwrap_or(b',')
}

fn read_records(payload: &[u8]) -> Result<Vec<(u64, Vec<String>)>> {
    let payload = payload.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(payload);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(sniff_delimiter(payload))
        .from_reader(payload);

    let mut records = Vec::new();
    for record in reader.byte_records() {
        let record = record?;
        let line = record.position().map_or(0, csv::Position::line);
        let cells: Vec<String> = record
            .iter()
            .map(|cell| String::from_utf8_lossy(cell).trim().to_string())
            .collect();
        if cells.iter().all(String::is_empty) {
            continue;
        }
        records.push((line, cells));
    }
    Ok(records)
}

fn cell(cells: &[String], index: Option<usize>) -> Option<String> {
    index
        .and_then(|i| cells.get(i))
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

/// Reads a whole number, tolerating spreadsheet renderings like `10.0` or `10,00`.
///
/// Three or more digits after a separator are refused: `1.000` may be a
/// thousands grouping or a decimal and the two readings differ a thousandfold.
fn parse_count(field: &str, raw: &str) -> std::result::Result<i64, String> {
    let compact = raw.replace(' ', "");
    let whole = match compact.split_once(['.', ',']) {
        Some((whole, fraction))
            if (1..=2).contains(&fraction.len()) && fraction.bytes().all(|b| b == b'0') =>
        {
            whole
        }
        Some(_) => return Err(format!("{field} must be a whole number, got \"{raw}\"")),
        None => compact.as_str(),
    };
    match whole.parse::<i64>() {
        Ok(value) if (0..=MAX_QUANTITY).contains(&value) => Ok(value),
        Ok(value) => Err(format!(
            "{field} must be between 0 and {MAX_QUANTITY}, got {value}"
        )),
        Err(_) => Err(format!("{field} must be a whole number >= 0, got \"{raw}\"")),
    }
}

fn interpret(line: u64, cells: &[String], mapping: &ColumnMapping) -> Option<ImportRow> {
    let part_number = cell(cells, Some(mapping.part_number))?;
    let mut problems = Vec::new();
    let mut count = |field: &str, index: Option<usize>| {
        cell(cells, index).and_then(|raw| {
            parse_count(field, &raw)
                .map_err(|problem| problems.push(problem))
                .ok()
        })
    };
    let min_qty = count("min_qty", mapping.min_qty);
    let quantity = count("quantity", mapping.quantity);

    Some(ImportRow {
        line,
        part_number,
        description: cell(cells, mapping.description),
        min_qty,
        quantity,
        location: cell(cells, mapping.location),
        problem: (!problems.is_empty()).then(|| problems.join("; ")),
    })
}

/// Parses the payload and infers its column mapping without touching the ledger.
pub fn preview(payload: &[u8]) -> Result<ImportPreview> {
    let records = read_records(payload)?;
    let Some((_, first)) = records.first() else {
        return Err(Error::Import {
            message: "payload contains no rows".to_string(),
        });
    };

    let (headers, mapping, data) = match ColumnMapping::from_headers(first) {
        Some(mapping) => (first.clone(), mapping, &records[1..]),
        None => {
            let columns = records.iter().map(|(_, c)| c.len()).max().unwrap_or(0);
            (Vec::new(), ColumnMapping::positional(columns), &records[..])
        }
    };

    let mut rows = Vec::new();
    let mut skipped = 0;
    for (line, cells) in data {
        // A header row the mapping did not catch
        if mapping.positional && cells.first().is_some_and(|c| is_known_header(c)) {
            continue;
        }
        match interpret(*line, cells, &mapping) {
            Some(row) => rows.push(row),
            None => skipped += 1,
        }
    }

    Ok(ImportPreview {
        headers,
        mapping,
        rows,
        skipped,
    })
}

/// Previews (`apply == false`) or applies a tabular payload.
pub async fn import(
    ledger: &Ledger,
    payload: &[u8],
    apply: bool,
    user: Option<&str>,
) -> Result<ImportOutcome> {
    let preview = preview(payload)?;
    if !apply {
        return Ok(ImportOutcome::Preview(preview));
    }
    Ok(ImportOutcome::Applied(apply_preview(ledger, preview, user).await))
}

/// Applies already-interpreted rows one by one.
pub async fn apply_preview(
    ledger: &Ledger,
    preview: ImportPreview,
    user: Option<&str>,
) -> ImportReport {
    let mut summary = ImportSummary {
        rows: preview.rows.len(),
        skipped: preview.skipped,
        ..ImportSummary::default()
    };
    let mut results = Vec::with_capacity(preview.rows.len());

    for row in &preview.rows {
        let result = match apply_row(ledger, row, user).await {
            Ok(result) => result,
            Err(e) => {
                warn!(line = row.line, part_number = %row.part_number, "Import row failed: {}", e);
                RowResult {
                    line: row.line,
                    part_number: row.part_number.clone(),
                    status: RowStatus::Failed,
                    quantity_set: None,
                    location: None,
                    error: Some(e.to_string()),
                }
            }
        };
        match result.status {
            RowStatus::Created => summary.created += 1,
            RowStatus::Updated => summary.updated += 1,
            RowStatus::Failed => summary.failed += 1,
        }
        if result.quantity_set.is_some() {
            summary.quantities_set += 1;
        }
        results.push(result);
    }

    info!(
        rows = summary.rows,
        created = summary.created,
        updated = summary.updated,
        quantities = summary.quantities_set,
        failed = summary.failed,
        "Import applied"
    );
    ImportReport {
        mapping: preview.mapping,
        results,
        summary,
    }
}

/// Applies one row inside its own database transaction.
///
/// Any failure rolls the whole row back, including a location it created.
async fn apply_row(ledger: &Ledger, row: &ImportRow, user: Option<&str>) -> Result<RowResult> {
    if let Some(problem) = &row.problem {
        return Err(Error::validation(problem.clone()));
    }
    let settings = ledger.settings();
    let txn = ledger.storage().connection().begin().await?;

    let existing = directory::find_part(&txn, &row.part_number).await?;
    let existing_fixed = match existing.as_ref().and_then(|p| p.fixed_location_id) {
        Some(id) => directory::find_location_by_id(&txn, id).await?,
        None => None,
    };
    let location = match &row.location {
        Some(code) => Some(directory::get_or_create_location(&txn, code).await?.0),
        None => None,
    };

    if let (Some(row_location), Some(fixed)) = (&location, &existing_fixed) {
        if row_location.id != fixed.id {
            return Err(Error::FixedLocationConflict {
                part_number: row.part_number.clone(),
                fixed_location: fixed.barcode.clone(),
                requested_location: row_location.barcode.clone(),
            });
        }
    }

    let quantity_location: Option<&location::Model> = location.as_ref().or(existing_fixed.as_ref());
    if row.quantity.is_some() && quantity_location.is_none() {
        return Err(Error::validation(format!(
            "quantity given for {} but no location in the row and no fixed location",
            row.part_number
        )));
    }

    let patch = PartPatch {
        part_number: None,
        description: row.description.clone(),
        min_qty: row.min_qty,
        fixed_location_id: None,
    };
    let (mut part, created) =
        directory::upsert_part(&txn, &row.part_number, patch, settings.min_qty_default).await?;
    if let Some(row_location) = &location {
        if part.fixed_location_id.is_none() && settings.auto_assign_fixed_location {
            part = directory::claim_fixed_location(&txn, &part, row_location).await?.0;
        }
    }

    let mut written_at = None;
    if let (Some(quantity), Some(target)) = (row.quantity, quantity_location) {
        ledger
            .set_quantity_within(&txn, &part.part_number, &target.barcode, quantity, user)
            .await?;
        written_at = Some(target.barcode.clone());
    }
    txn.commit().await?;

    Ok(RowResult {
        line: row.line,
        part_number: part.part_number,
        status: if created {
            RowStatus::Created
        } else {
            RowStatus::Updated
        },
        quantity_set: written_at.as_ref().and(row.quantity),
        location: written_at,
        error: None,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::directory::{
        add_alias, create_location, find_location_by_barcode, find_part_by_number,
    };
    use crate::core::ledger::MovementRequest;
    use crate::entities::{Part, Transaction};
    use crate::test_utils::*;
    use sea_orm::EntityTrait;

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header(" Part No. "), "partno");
        assert_eq!(normalize_header("Min_Qty"), "minqty");
        assert_eq!(normalize_header("ON-HAND"), "onhand");
    }

    #[test]
    fn test_mapping_from_synonyms() {
        let headers: Vec<String> = ["Varenummer", "Beskrivelse", "Antall", "Lokasjon", "Min"]
            .iter()
            .map(ToString::to_string)
            .collect();
        let mapping = ColumnMapping::from_headers(&headers).unwrap();
        assert_eq!(mapping.part_number, 0);
        assert_eq!(mapping.description, Some(1));
        assert_eq!(mapping.quantity, Some(2));
        assert_eq!(mapping.location, Some(3));
        assert_eq!(mapping.min_qty, Some(4));
        assert!(!mapping.positional);
    }

    #[test]
    fn test_preview_semicolon_payload() {
        let payload = "\u{feff}Part Number;Description;Qty;Location\nP-1;Bolt;10;L1\n;orphan;1;L1\nP-2;;x;\n";
        let preview = preview(payload.as_bytes()).unwrap();
        assert_eq!(preview.headers.len(), 4);
        assert_eq!(preview.rows.len(), 2);
        assert_eq!(preview.skipped, 1);

        let first = &preview.rows[0];
        assert_eq!(first.line, 2);
        assert_eq!(first.quantity, Some(10));
        assert_eq!(first.location.as_deref(), Some("L1"));
        assert_eq!(first.problem, None);

        let second = &preview.rows[1];
        assert_eq!(second.description, None);
        assert!(second.problem.as_deref().unwrap().contains("quantity"));
    }

    #[test]
    fn test_positional_fallback_skips_stray_header() {
        let payload = "P-1,Bolt\nPart Number,Description\nP-2,Nut\n";
        let preview = preview(payload.as_bytes()).unwrap();
        assert!(preview.mapping.positional);
        assert!(preview.headers.is_empty());
        let numbers: Vec<&str> = preview.rows.iter().map(|r| r.part_number.as_str()).collect();
        assert_eq!(numbers, ["P-1", "P-2"]);
        assert_eq!(preview.rows[1].description.as_deref(), Some("Nut"));
    }

    #[test]
    fn test_parse_count_accepts_spreadsheet_numbers() {
        assert_eq!(parse_count("qty", "10"), Ok(10));
        assert_eq!(parse_count("qty", "10.0"), Ok(10));
        assert_eq!(parse_count("qty", "10,00"), Ok(10));
        assert_eq!(parse_count("qty", "1 000"), Ok(1000));
        assert!(parse_count("qty", "2.5").is_err());
        assert!(parse_count("qty", "-1").is_err());
        assert!(parse_count("qty", "99999999999").is_err());
    }

    #[test]
    fn test_parse_count_refuses_ambiguous_separators() {
        assert!(parse_count("qty", "1.000").is_err());
        assert!(parse_count("qty", "1,000").is_err());
        assert!(parse_count("qty", "1.000.000").is_err());
    }

    #[test]
    fn test_empty_payload_is_an_error() {
        assert!(matches!(preview(b"\n\n"), Err(Error::Import { .. })));
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() -> Result<()> {
        let (ledger, _, _) = setup_test_ledger().await?;
        let outcome = import(&ledger, b"part,qty,location\nX,10,L1\n", false, None).await?;
        assert!(matches!(outcome, ImportOutcome::Preview(_)));
        let db = ledger.storage().connection();
        assert!(find_part_by_number(db, "X").await?.is_none());
        assert!(find_location_by_barcode(db, "L1").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_new_part_with_quantity_is_set_without_movement() -> Result<()> {
        let (ledger, notifier, _) = setup_test_ledger().await?;
        let outcome = import(&ledger, b"part,qty,location\nX,10,L1\n", true, Some("import")).await?;
        let ImportOutcome::Applied(report) = outcome else {
            panic!("expected applied import");
        };
        assert_eq!(report.summary.created, 1);
        assert_eq!(report.summary.quantities_set, 1);
        assert_eq!(report.results[0].location.as_deref(), Some("L1"));

        let db = ledger.storage().connection();
        let part = find_part_by_number(db, "X").await?.unwrap();
        let location = find_location_by_barcode(db, "L1").await?.unwrap();
        assert_eq!(location.name, "L1");
        assert_eq!(part.fixed_location_id, Some(location.id));

        let stock = ledger.stock_for_part("X").await?;
        assert_eq!(stock.total, 10);
        let actions: Vec<String> = Transaction::find()
            .all(db)
            .await?
            .into_iter()
            .map(|t| t.action)
            .collect();
        assert_eq!(actions, ["set"]);
        assert!(notifier.sent().await.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_partial_update_keeps_absent_fields() -> Result<()> {
        let (ledger, _, _) = setup_test_ledger().await?;
        let db = ledger.storage().connection();
        create_test_part(db, "P-1", 4).await?;
        let shelf = create_location(db, "Shelf A", "A").await?;
        ledger
            .scan_in(MovementRequest::new("P-1", Some("A"), 5))
            .await?;

        import(&ledger, b"part number,description\nP-1,Hex bolt M8\n", true, None).await?;

        let part = find_part_by_number(db, "P-1").await?.unwrap();
        assert_eq!(part.description, "Hex bolt M8");
        assert_eq!(part.min_qty, 4);
        assert_eq!(part.fixed_location_id, Some(shelf.id));
        assert_eq!(ledger.total_quantity(part.id).await?, 5);
        Ok(())
    }

    #[tokio::test]
    async fn test_row_failures_are_isolated() -> Result<()> {
        let (ledger, _, _) = setup_test_ledger().await?;
        let db = ledger.storage().connection();
        create_test_part(db, "PINNED", 0).await?;
        create_location(db, "Shelf A", "A").await?;
        ledger
            .scan_in(MovementRequest::new("PINNED", Some("A"), 1))
            .await?;

        let payload = "part,min,qty,location\n\
                       GOOD,2,3,B\n\
                       PINNED,,4,B\n\
                       NOLOC,,4,\n\
                       BADQTY,,lots,B\n\
                       ALSO-GOOD,1,,\n";
        let ImportOutcome::Applied(report) = import(&ledger, payload.as_bytes(), true, None).await?
        else {
            panic!("expected applied import");
        };

        let statuses: Vec<RowStatus> = report.results.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            [
                RowStatus::Created,
                RowStatus::Failed,
                RowStatus::Failed,
                RowStatus::Failed,
                RowStatus::Created,
            ]
        );
        assert!(report.results[1].error.as_deref().unwrap().contains("fixed"));
        assert_eq!(report.summary.failed, 3);
        assert_eq!(report.summary.created, 2);
        assert_eq!(report.summary.quantities_set, 1);

        let pinned = find_part_by_number(db, "PINNED").await?.unwrap();
        assert_eq!(ledger.total_quantity(pinned.id).await?, 1);
        assert!(find_part_by_number(db, "NOLOC").await?.is_none());
        assert_eq!(find_part_by_number(db, "ALSO-GOOD").await?.unwrap().min_qty, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_alias_row_updates_the_aliased_part() -> Result<()> {
        let (ledger, _, _) = setup_test_ledger().await?;
        let db = ledger.storage().connection();
        let part = create_test_part(db, "P-1", 0).await?;
        add_alias(db, "P-1", "7031234567890").await?;

        let ImportOutcome::Applied(report) = import(
            &ledger,
            b"part,description\n7031234567890,Scanned EAN\n",
            true,
            None,
        )
        .await?
        else {
            panic!("expected applied import");
        };

        assert_eq!(report.results[0].status, RowStatus::Updated);
        assert_eq!(report.results[0].part_number, "P-1");
        assert_eq!(Part::find().all(db).await?.len(), 1);
        assert!(find_part_by_number(db, "7031234567890").await?.is_none());
        let part = find_part_by_number(db, "P-1").await?.unwrap();
        assert_eq!(part.description, "Scanned EAN");
        assert_eq!(
            ledger.stock_for_part("7031234567890").await?.part.id,
            part.id
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_row_writes_nothing() -> Result<()> {
        let (ledger, _, _) = setup_test_ledger().await?;
        let db = ledger.storage().connection();
        create_test_part(db, "PINNED", 0).await?;
        create_location(db, "Shelf A", "A").await?;
        ledger
            .scan_in(MovementRequest::new("PINNED", Some("A"), 1))
            .await?;

        let ImportOutcome::Applied(report) = import(
            &ledger,
            b"part,description,qty,location\nPINNED,Renamed,4,NEWLOC\n",
            true,
            None,
        )
        .await?
        else {
            panic!("expected applied import");
        };

        assert_eq!(report.results[0].status, RowStatus::Failed);
        assert!(find_location_by_barcode(db, "NEWLOC").await?.is_none());
        let pinned = find_part_by_number(db, "PINNED").await?.unwrap();
        assert_eq!(pinned.description, "Test part");
        assert_eq!(ledger.total_quantity(pinned.id).await?, 1);
        assert_eq!(Transaction::find().all(db).await?.len(), 1);
        Ok(())
    }
}
