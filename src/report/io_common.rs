use crate::report::io_tsv::read_tsv_table;
use crate::report::io_xlsx::read_xlsx_table;
use crate::report::*;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
        .to_string()
}

/// The file formats result tables can be read from.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ResultsFormat {
    Tsv,
    Xlsx,
}

impl ResultsFormat {
    pub fn parse(format: &str) -> AppResult<ResultsFormat> {
        match format.to_lowercase().as_str() {
            "tsv" => Ok(ResultsFormat::Tsv),
            "xlsx" => Ok(ResultsFormat::Xlsx),
            _ => UnknownFormatSnafu { format }.fail(),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ResultsFormat::Tsv => "tsv",
            ResultsFormat::Xlsx => "xlsx",
        }
    }
}

/// A directory with one file per result table, named after the table.
#[derive(Debug, Clone)]
pub struct TableDirectory {
    dir: PathBuf,
    format: ResultsFormat,
}

impl TableDirectory {
    pub fn new(dir: PathBuf, format: ResultsFormat) -> TableDirectory {
        TableDirectory { dir, format }
    }

    pub fn table_path(&self, name: &str) -> String {
        let file_name = format!("{}.{}", name, self.format.extension());
        self.dir.join(file_name).display().to_string()
    }

    fn read(&self, name: &str) -> AppResult<RawTable> {
        let path = self.table_path(name);
        info!("Attempting to read results file {:?}", path);
        match self.format {
            ResultsFormat::Tsv => read_tsv_table(&path),
            ResultsFormat::Xlsx => read_xlsx_table(&path),
        }
    }
}

impl ResultsSource for TableDirectory {
    fn read_table(&self, name: &str) -> ResultsResult<RawTable> {
        self.read(name).map_err(|e| ResultsError::SourceFailed {
            item: name.to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names() {
        assert_eq!(simplify_file_name("results/contest_12.tsv"), "contest_12.tsv");
        assert_eq!(simplify_file_name("turnout.xlsx"), "turnout.xlsx");
        let dir = TableDirectory::new(PathBuf::from("results"), ResultsFormat::Xlsx);
        assert_eq!(
            dir.table_path("contest_12"),
            Path::new("results").join("contest_12.xlsx").display().to_string()
        );
        assert_eq!(ResultsFormat::parse("TSV").unwrap(), ResultsFormat::Tsv);
    }

    #[test]
    fn missing_file_is_a_source_failure() {
        let dir = TableDirectory::new(PathBuf::from("no-such-directory"), ResultsFormat::Tsv);
        assert!(matches!(
            dir.read_table("turnout"),
            Err(ResultsError::SourceFailed { .. })
        ));
    }
}
