// Reading the assignment and capacity sheets of the workbook.

use calamine::{open_workbook, DataType, Range, Reader, Xlsx};
use spectrum_occupancy::builder::{Builder, CapacityBuilder};

use std::fs::File;
use std::io::BufReader;

use crate::dash::io_common::{read_header, read_row};
use crate::dash::*;

pub fn read_workbook(path: &Path, sheets: &SheetNames, columns: &ColumnNames) -> BDashResult<Dataset> {
    let path_s = path.display().to_string();
    info!("Attempting to read workbook {:?}", path_s);
    let mut workbook: Xlsx<BufReader<File>> =
        open_workbook(path).context(OpeningExcelSnafu { path: path_s.clone() })?;

    let assignment_range = get_range(&mut workbook, &path_s, &sheets.assignments)?;
    let assignments = read_assignments(&assignment_range, &sheets.assignments, columns)?;
    let capacity_range = get_range(&mut workbook, &path_s, &sheets.capacity)?;
    let capacity = read_capacity(&capacity_range, &sheets.capacity, columns)?;
    info!(
        "read_workbook: {} assignments, {} bands",
        assignments.len(),
        capacity.len()
    );
    Ok(Dataset {
        assignments,
        capacity,
    })
}

fn get_range(
    workbook: &mut Xlsx<BufReader<File>>,
    path: &str,
    sheet: &str,
) -> BDashResult<Range<DataType>> {
    let available: Vec<String> = workbook.sheet_names().to_vec();
    debug!("get_range: path: {:?} worksheets: {:?}", path, available);
    match workbook.worksheet_range(sheet) {
        Some(wrange) => Ok(wrange.context(OpeningExcelSnafu { path })?),
        None => Err(Box::new(DashError::MissingSheet {
            sheet: sheet.to_string(),
            path: path.to_string(),
            available,
        })),
    }
}

pub fn read_assignments(
    wrange: &Range<DataType>,
    sheet: &str,
    columns: &ColumnNames,
) -> BDashResult<AssignmentTable> {
    let mut iter = wrange.rows();
    let header = iter.next().context(EmptySheetSnafu { sheet })?;
    let headers = read_header(header);
    debug!("read_assignments: header: {:?}", headers);
    let mut builder = Builder::new(columns, &headers).context(InvalidSheetSnafu { sheet })?;
    for row in iter {
        builder
            .add_row(read_row(row))
            .context(InvalidSheetSnafu { sheet })?;
    }
    Ok(builder.build())
}

pub fn read_capacity(
    wrange: &Range<DataType>,
    sheet: &str,
    columns: &ColumnNames,
) -> BDashResult<Vec<CapacityRecord>> {
    let mut iter = wrange.rows();
    let header = iter.next().context(EmptySheetSnafu { sheet })?;
    let headers = read_header(header);
    debug!("read_capacity: header: {:?}", headers);
    let mut builder = CapacityBuilder::new(columns, &headers).context(InvalidSheetSnafu { sheet })?;
    for (idx, row) in iter.enumerate() {
        // The index starts at 1 to respect the conventions of the excel world, after the header.
        builder.add_row(idx + 2, &read_row(row));
    }
    Ok(builder.build())
}
