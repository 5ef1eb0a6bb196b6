use serde_json::Value;
use std::io;

use super::{flatten, headers, primary, row};

/// Write output as CSV to stdout. Records become rows; a single record
/// becomes `field,value` pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let written = match primary(value) {
        Value::Array(records) => write_records(&mut wtr, records),
        Value::Object(map) => match map.get("periods") {
            Some(Value::Array(periods)) => write_records(&mut wtr, periods),
            _ => {
                let mut result = wtr.write_record(["field", "value"]);
                for (key, val) in flatten(map) {
                    result = result.and_then(|_| wtr.write_record([key, val]));
                }
                result
            }
        },
        other => wtr.write_record([super::scalar(other)]),
    };

    if let Err(e) = written.and_then(|_| wtr.flush().map_err(csv::Error::from)) {
        eprintln!("CSV write error: {}", e);
    }
}

fn write_records(
    wtr: &mut csv::Writer<io::StdoutLock<'_>>,
    records: &[Value],
) -> Result<(), csv::Error> {
    let headers = headers(records);
    if headers.is_empty() {
        return Ok(());
    }
    wtr.write_record(&headers)?;
    for record in records {
        wtr.write_record(row(record, &headers))?;
    }
    Ok(())
}
