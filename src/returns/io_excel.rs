use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::returns::config_reader::FileSource;
use crate::returns::io_common::{simplify_file_name, OFFICIAL_SCHEMA};
use crate::returns::*;

fn get_range(path: &str, cfs: &FileSource) -> BReturnsResult<calamine::Range<DataType>> {
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        path, &cfs.excel_worksheet_name
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    let wrange = match &cfs.excel_worksheet_name {
        // A worksheet name was provided, use it.
        Some(name) => workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { path, name })?
            .context(OpeningExcelSnafu { path })?,
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })?,
    };
    Ok(wrange)
}

// The text of a cell. None for the cells that cannot hold a name or a count.
fn cell_text(cell: &DataType) -> Option<String> {
    match cell {
        DataType::String(s) => Some(s.clone()),
        DataType::Int(i) => Some(i.to_string()),
        DataType::Float(f) => Some(f.to_string()),
        DataType::Empty => Some("".to_string()),
        _ => None,
    }
}

/// Reads the rows of an official export saved as a spreadsheet.
///
/// The first row of the worksheet is the header.
pub fn read_excel_rows(path: &str, cfs: &FileSource) -> BReturnsResult<Vec<RawVoteRow>> {
    let file_name = simplify_file_name(path);
    let wrange = get_range(path, cfs)?;

    let mut iter = wrange.rows();
    let header: Vec<String> = iter
        .next()
        .context(EmptyExcelSnafu { path })?
        .iter()
        .map(|c| cell_text(c).unwrap_or_default())
        .collect();
    debug!("read_excel_rows: header: {:?}", header);
    let columns = OFFICIAL_SCHEMA.columns(&header, path)?;

    let mut res: Vec<RawVoteRow> = Vec::new();
    for (idx, row) in iter.enumerate() {
        // Lines are numbered from 1, after the header.
        let lineno = idx + 2;
        let cells: Option<Vec<String>> = row.iter().map(cell_text).collect();
        let cells = match cells {
            Some(c) => c,
            None => {
                warn!(
                    "{}:{}: unexpected cell type, skipping the line: {:?}",
                    file_name, lineno, row
                );
                continue;
            }
        };
        if cells.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        if let Some(r) = columns.row(&cells, lineno, &file_name) {
            res.push(r);
        }
    }
    debug!("read_excel_rows: {}: {} rows", file_name, res.len());
    Ok(res)
}
