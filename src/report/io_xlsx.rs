use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::report::{io_common::simplify_file_name, *};

/// Reads the first worksheet of a workbook. Numbers are written back as
/// integers when they have no fractional part.
pub fn read_xlsx_table(path: &str) -> AppResult<RawTable> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange = workbook
        .worksheet_range_at(0)
        .context(EmptyTableSnafu { path })?
        .context(OpeningExcelSnafu { path })?;

    let first_line = header_lineno(wrange.start());
    let mut iter = wrange.rows();
    let header_row = iter.next().context(EmptyTableSnafu { path })?;
    let header = header_row
        .iter()
        .map(|cell| read_cell(cell, path, first_line).map(|s| s.trim().to_string()))
        .collect::<AppResult<Vec<String>>>()?;
    debug!("read_xlsx_table: header: {:?}", header);

    let mut table = RawTable::new(&simplify_file_name(path), header);
    for (idx, row) in iter.enumerate() {
        let lineno = first_line + idx + 1;
        let cells = row
            .iter()
            .map(|cell| read_cell(cell, path, lineno))
            .collect::<AppResult<Vec<String>>>()?;
        // The range is rectangular: short rows come padded with empty cells,
        // so the width of a workbook line cannot be checked.
        if cells.iter().all(|c| c.is_empty()) {
            debug!("read_xlsx_table: skipping empty line {}", lineno);
            continue;
        }
        table.push_row(lineno, cells);
    }
    info!(
        "read_xlsx_table: {:?}: {} rows",
        table.source,
        table.rows.len()
    );
    Ok(table)
}

/// The range starts at its first used cell, not at the top of the sheet.
fn header_lineno(start: Option<(u32, u32)>) -> usize {
    start.map_or(1, |(row, _)| row as usize + 1)
}

fn read_cell(cell: &DataType, path: &str, lineno: usize) -> AppResult<String> {
    match cell {
        DataType::String(s) => Ok(s.clone()),
        DataType::Int(i) => Ok(i.to_string()),
        DataType::Float(f) if f.fract() == 0.0 => Ok(format!("{}", *f as i64)),
        DataType::Float(f) => Ok(f.to_string()),
        DataType::Bool(b) => Ok(b.to_string()),
        DataType::Empty => Ok(String::new()),
        _ => ExcelWrongCellTypeSnafu {
            path,
            lineno,
            content: format!("{:?}", cell),
        }
        .fail(),
    }
}
