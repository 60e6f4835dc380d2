// Primitives for reading tab-separated result tables.

use std::fs::File;

use crate::report::{io_common::simplify_file_name, *};

/// Reads every line of a table. Widths are not checked here: the table
/// contract reports short or long lines with their line number.
pub fn read_tsv_table(path: &str) -> AppResult<RawTable> {
    let mut records = get_records(path)?;
    let header: Vec<String> = match records.next() {
        Some(line_r) => line_r
            .context(CsvLineParseSnafu { path, lineno: 1_usize })?
            .iter()
            .map(|s| s.trim().to_string())
            .collect(),
        None => return EmptyTableSnafu { path }.fail(),
    };
    debug!("read_tsv_table: header: {:?}", header);

    let mut table = RawTable::new(&simplify_file_name(path), header);
    for (idx, line_r) in records.enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { path, lineno })?;
        debug!("read_tsv_table: lineno: {:?} row: {:?}", lineno, line);
        table.push_row(lineno, line.iter().map(|s| s.to_string()).collect());
    }
    info!(
        "read_tsv_table: {:?}: {} rows",
        table.source,
        table.rows.len()
    );
    Ok(table)
}

fn get_records(path: &str) -> AppResult<csv::StringRecordsIntoIter<File>> {
    let rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_path(path)
        .context(OpeningCsvSnafu { path })?;
    Ok(rdr.into_records())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_lines_with_their_numbers() {
        let _ = env_logger::try_init();
        let dir = std::env::temp_dir().join(format!("results-reporter-tsv-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("contest_1.tsv");
        fs::write(
            &path,
            "area_id\tsubtotal_type\tRSTot\t11:Yes\t12:No\n\
             ALL\tTO\t790\t500\t290\n\
             P1\tMV\t247\t150\n",
        )
        .unwrap();

        let table = read_tsv_table(&path.display().to_string()).unwrap();
        assert_eq!(table.source, "contest_1.tsv");
        assert_eq!(table.header.len(), 5);
        assert_eq!(table.header[3], "11:Yes");
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].lineno, 2);
        assert_eq!(table.rows[0].cells[4], "290");
        // Short lines are kept as they are.
        assert_eq!(table.rows[1].lineno, 3);
        assert_eq!(table.rows[1].cells.len(), 4);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn quotes_are_plain_text() {
        let dir = std::env::temp_dir().join(format!("results-reporter-quotes-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("contest_2.tsv");
        fs::write(
            &path,
            "area_id\tsubtotal_type\t\"Ed Lee\t22\n\
             ALL\tTO\t10\t20\n",
        )
        .unwrap();

        let table = read_tsv_table(&path.display().to_string()).unwrap();
        assert_eq!(table.header.len(), 4);
        assert_eq!(table.header[2], "\"Ed Lee");
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].cells, vec!["ALL", "TO", "10", "20"]);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_fails() {
        assert!(matches!(
            read_tsv_table("no-such-file.tsv"),
            Err(AppError::OpeningCsv { .. })
        ));
    }
}
