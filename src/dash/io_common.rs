use calamine::DataType;
use spectrum_occupancy::Cell;

pub fn read_cell(cell: &DataType) -> Cell {
    match cell {
        DataType::Int(i) => Cell::Number(*i as f64),
        DataType::Float(f) => Cell::Number(*f),
        // Excel serial date, kept as a number.
        DataType::DateTime(f) => Cell::Number(*f),
        DataType::String(s) => Cell::Text(s.clone()),
        DataType::Bool(b) => Cell::Text(b.to_string()),
        DataType::Error(_) | DataType::Empty => Cell::Empty,
    }
}

pub fn read_row(row: &[DataType]) -> Vec<Cell> {
    row.iter().map(read_cell).collect()
}

/// The names of the columns. Blank header cells get an empty name.
pub fn read_header(row: &[DataType]) -> Vec<String> {
    row.iter()
        .map(|c| read_cell(c).as_label().unwrap_or_default())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_keep_their_types() {
        assert_eq!(read_cell(&DataType::Int(3)), Cell::Number(3.0));
        assert_eq!(read_cell(&DataType::Float(2.5)), Cell::Number(2.5));
        assert_eq!(
            read_cell(&DataType::String("MoD".to_string())),
            Cell::Text("MoD".to_string())
        );
        assert_eq!(read_cell(&DataType::Empty), Cell::Empty);
    }

    #[test]
    fn numeric_headers_become_labels() {
        let header = read_header(&[
            DataType::String(" Venue Code ".to_string()),
            DataType::Float(2024.0),
            DataType::Empty,
        ]);
        assert_eq!(header, vec!["Venue Code", "2024", ""]);
    }
}
