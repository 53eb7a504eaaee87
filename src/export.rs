use std::{fs::File, io::Write, path::Path};

use csv::{Writer, WriterBuilder};
use tracing::info;

use crate::{
    dataset::{Dataset, DisasterRecord, DATE_FORMAT},
    error::{DashboardError, Result},
};

/// File name offered for the download.
pub const DEFAULT_EXPORT_NAME: &str = "filtered_disaster_data.csv";

/// Source row with the cleaned date and duration swapped in.
fn export_row(dataset: &Dataset, record: &DisasterRecord) -> Vec<String> {
    let width = dataset.headers.len().max(record.fields.len());
    let mut row: Vec<String> = (0..width)
        .map(|i| record.fields.get(i).cloned().unwrap_or_default())
        .collect();
    if let Some(cell) = row.get_mut(dataset.date_column) {
        *cell = record.date.format(DATE_FORMAT).to_string();
    }
    if let Some(cell) = row.get_mut(dataset.duration_column) {
        *cell = record.duration.map(|d| d.to_string()).unwrap_or_default();
    }
    row
}

/// Write `records` as UTF-8 CSV with the dataset's header row.
pub fn write_csv<W: Write>(
    dataset: &Dataset,
    records: &[DisasterRecord],
    out: W,
) -> std::result::Result<(), csv::Error> {
    let mut wtr: Writer<W> = WriterBuilder::new().flexible(true).from_writer(out);
    wtr.write_record(&dataset.headers)?;
    for record in records {
        wtr.write_record(export_row(dataset, record))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_to_path(dataset: &Dataset, records: &[DisasterRecord], path: &Path) -> Result<()> {
    let to_err = |source: csv::Error| DashboardError::Export {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(|e| to_err(csv::Error::from(e)))?;
    write_csv(dataset, records, file).map_err(to_err)?;
    info!(path = %path.display(), rows = records.len(), "exported filtered records");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{read_dataset, ColumnNames};
    use std::fs;
    use tempfile::tempdir;

    fn dataset() -> Dataset {
        let text = "Title,Duration,Disaster_Info,Date\n\
                    Fani,4 May,\"Cyclone, severe\",2019\u{2013}05\u{2013}03\n\
                    Heat,none,Heat wave,2015-05-20\n";
        read_dataset(text.as_bytes(), Path::new("t.csv"), &ColumnNames::default()).unwrap()
    }

    #[test]
    fn writes_header_and_cleaned_values() {
        let ds = dataset();
        let mut buf = Vec::new();
        write_csv(&ds, &ds.records, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "Title,Duration,Disaster_Info,Date\n\
             Fani,4,\"Cyclone, severe\",2019-05-03\n\
             Heat,,Heat wave,2015-05-20\n"
        );
    }

    #[test]
    fn empty_subset_still_has_header() {
        let ds = dataset();
        let mut buf = Vec::new();
        write_csv(&ds, &[], &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "Title,Duration,Disaster_Info,Date\n");
    }

    #[test]
    fn exports_to_file() {
        let ds = dataset();
        let tmp = tempdir().unwrap();
        let path = tmp.path().join(DEFAULT_EXPORT_NAME);
        export_to_path(&ds, &ds.records[..1], &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);

        let err = export_to_path(&ds, &ds.records, &tmp.path().join("missing/out.csv"))
            .unwrap_err();
        assert!(matches!(err, DashboardError::Export { .. }));
    }
}
