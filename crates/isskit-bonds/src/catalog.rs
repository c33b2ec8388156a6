//! Exchange-wide listings: the traded bond universe and index collections.

use isskit_fetch::{IssSource, cast_columns, fetch_document, fetch_typed, take_table, url};
use isskit_types::{Cell, Result, Row, TypedTable};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Board groups whose boards carry the traded bond list.
pub const BOND_BOARD_GROUPS: [u32; 4] = [58, 193, 207, 245];

const BOND_TABLES: [&str; 3] = ["securities", "marketdata", "marketdata_yields"];

/// Yield columns taken from `marketdata_yields`.
const YIELD_COLUMNS: [&str; 8] = [
    "SECID",
    "BOARDID",
    "PRICE",
    "EFFECTIVEYIELD",
    "YIELDDATETYPE",
    "DURATION",
    "ZSPREADBP",
    "GSPREADBP",
];

fn join_key(row: &Row<'_>) -> Option<(String, String)> {
    Some((row.string("SECID")?, row.string("BOARDID")?))
}

fn without_column(table: TypedTable, name: &str) -> TypedTable {
    let Some(dropped) = table.column_index(name) else {
        return table;
    };
    let mut columns = table.columns().to_vec();
    columns.remove(dropped);
    let rows = table
        .rows()
        .iter()
        .map(|cells| {
            let mut cells = cells.clone();
            if dropped < cells.len() {
                cells.remove(dropped);
            }
            cells
        })
        .collect();
    TypedTable::new(columns, rows)
}

/// Left-joins `right` onto `left` by security and board.
///
/// Columns already present in `left` are kept; `only` restricts which
/// columns of `right` are considered. The first matching row of `right` wins.
fn left_join(left: &TypedTable, right: &TypedTable, only: Option<&[&str]>) -> TypedTable {
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    for (i, row) in right.iter().enumerate() {
        if let Some(key) = join_key(&row) {
            index.entry(key).or_insert(i);
        }
    }

    let added: Vec<usize> = right
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, name)| {
            !left.has_column(name)
                && only.is_none_or(|cols| cols.iter().any(|c| c.eq_ignore_ascii_case(name)))
        })
        .map(|(i, _)| i)
        .collect();

    let mut columns = left.columns().to_vec();
    columns.extend(added.iter().map(|&i| right.columns()[i].clone()));

    let rows = left
        .iter()
        .map(|row| {
            let matched = join_key(&row)
                .and_then(|key| index.get(&key))
                .map(|&i| &right.rows()[i]);
            let mut cells = row.cells().to_vec();
            cells.extend(
                added
                    .iter()
                    .map(|&c| matched.and_then(|r| r.get(c)).cloned().unwrap_or(Cell::Missing)),
            );
            cells
        })
        .collect();
    TypedTable::new(columns, rows)
}

/// Returns every bond traded on the bond boards, with market data and yields.
///
/// `securities`, `marketdata` and `marketdata_yields` of the bond market are
/// joined on `SECID`/`BOARDID`; `DURATION` comes from the yields table. Rows
/// on boards outside [`BOND_BOARD_GROUPS`] are dropped.
///
/// # Errors
///
/// Returns a transport error or [`IssError::IncompleteData`](isskit_types::IssError)
/// if a table is missing.
pub async fn bonds_list<S: IssSource + ?Sized>(source: &S) -> Result<TypedTable> {
    let mut doc = fetch_document(source, url::BONDS_SECURITIES, &[], &BOND_TABLES, &[]).await?;
    let securities = without_column(cast_columns(take_table(&mut doc, "securities")?), "DURATION");
    let marketdata = without_column(cast_columns(take_table(&mut doc, "marketdata")?), "DURATION");
    let yields = cast_columns(take_table(&mut doc, "marketdata_yields")?);

    let joined = left_join(&securities, &marketdata, None);
    let mut bonds = left_join(&joined, &yields, Some(&YIELD_COLUMNS[..]));

    let boards = fetch_typed(source, url::BONDS_BOARDS, &[], "boards", &[]).await?;
    let traded: HashSet<String> = boards
        .iter()
        .filter(|row| {
            row.f64("board_group_id")
                .is_some_and(|g| BOND_BOARD_GROUPS.iter().any(|&id| f64::from(id) == g))
        })
        .filter_map(|row| row.string("boardid"))
        .collect();

    bonds.retain(|row| row.text("BOARDID").is_some_and(|b| traded.contains(b)));
    debug!(bonds = bonds.len(), boards = traded.len(), "Fetched bond list");
    Ok(bonds)
}

/// Lists the stock index collections, or the indices of one collection.
///
/// # Errors
///
/// Returns a transport error or [`IssError::IncompleteData`](isskit_types::IssError)
/// if the table is missing.
pub async fn indices_groups<S: IssSource + ?Sized>(
    source: &S,
    collection: Option<&str>,
) -> Result<TypedTable> {
    let table = match collection {
        Some(name) => {
            let vars = [("collection", name.to_string())];
            fetch_typed(source, url::INDEX_COLLECTION_SECURITIES, &vars, "securities", &[]).await?
        }
        None => fetch_typed(source, url::INDEX_COLLECTIONS, &[], "collections", &[]).await?,
    };
    Ok(table)
}

/// Returns the constituents of an index with their weights.
///
/// # Errors
///
/// Returns a transport error or [`IssError::IncompleteData`](isskit_types::IssError)
/// if the analytics table is missing.
pub async fn index_tickers<S: IssSource + ?Sized>(source: &S, index: &str) -> Result<TypedTable> {
    let vars = [("ticker", index.to_string())];
    Ok(fetch_typed(source, url::INDEX_ANALYTICS, &vars, "analytics", &[]).await?)
}
