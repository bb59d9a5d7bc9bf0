// Exporting the filtered assignments as CSV.

use std::fs::File;
use std::io::Write;

use crate::dash::*;

/// Writes the header and then each record in sheet order.
/// Rows are padded or truncated to the width of the header.
pub fn write_filtered<W: Write>(table: &AssignmentTable, out: W) -> DashResult<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(&table.headers).context(CsvWriteSnafu {})?;
    let width = table.headers.len();
    for record in table.records.iter() {
        let mut line: Vec<String> = record.cells.iter().take(width).map(|c| c.to_string()).collect();
        line.resize(width, String::new());
        wtr.write_record(&line).context(CsvWriteSnafu {})?;
    }
    wtr.flush()
        .map_err(csv::Error::from)
        .context(CsvWriteSnafu {})?;
    Ok(())
}

pub fn to_csv_string(table: &AssignmentTable) -> DashResult<String> {
    let mut buf: Vec<u8> = Vec::new();
    write_filtered(table, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub fn export_csv(table: &AssignmentTable, path: &str) -> BDashResult<()> {
    info!("Exporting {} assignments to {:?}", table.len(), path);
    let file = File::create(path).context(WritingFileSnafu { path })?;
    write_filtered(table, file)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use spectrum_occupancy::builder::Builder;

    fn table() -> AssignmentTable {
        let headers: Vec<String> = [
            "Request ID",
            "Venue Code",
            "Attributed Frequency TX (MHz)",
            "Channel Bandwidth (kHz)",
            "Transmission Power (W)",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let mut b = Builder::new(&ColumnNames::default(), &headers).unwrap();
        b.add_row(vec![
            Cell::Text("R1".to_string()),
            Cell::Text("STA, north".to_string()),
            Cell::Number(401.5),
            Cell::Number(200.0),
            Cell::Number(1.0),
        ])
        .unwrap();
        b.add_row(vec![Cell::Text("R2".to_string()), Cell::Text("AQU".to_string())])
            .unwrap();
        b.build()
    }

    #[test]
    fn header_then_rows() {
        let s = to_csv_string(&table()).unwrap();
        let expected = "\
Request ID,Venue Code,Attributed Frequency TX (MHz),Channel Bandwidth (kHz),Transmission Power (W)
R1,\"STA, north\",401.5,200,1
R2,AQU,,,
";
        assert_eq!(s, expected);
    }

    #[test]
    fn empty_tables_keep_the_header() {
        let t = table().with_records(vec![]);
        let s = to_csv_string(&t).unwrap();
        assert_eq!(s.lines().count(), 1);
    }

    #[test]
    fn export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("out.csv");
        export_csv(&table(), p.to_str().unwrap()).unwrap();
        let s = fs::read_to_string(&p).unwrap();
        assert!(s.starts_with("Request ID,"));
        assert_eq!(s.lines().count(), 3);
    }
}
