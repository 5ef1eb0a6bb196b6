use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{flatten, headers, primary, record_arrays, row};

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    match primary(value) {
        Value::Object(map) => print_record(map),
        Value::Array(records) => print_records(records),
        other => println!("{}", other),
    }

    if let Some(envelope) = value.as_object() {
        print_envelope_notes(envelope);
    }
}

fn print_record(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in flatten(map) {
        builder.push_record([key, val]);
    }
    println!("{}", Table::from(builder));

    for (name, records) in record_arrays(map) {
        println!("\n{name}:");
        print_records(records);
    }
}

fn print_records(records: &[Value]) {
    if records.is_empty() {
        println!("(empty)");
        return;
    }
    let headers = headers(records);
    let mut builder = Builder::default();
    builder.push_record(headers.clone());
    for record in records {
        builder.push_record(row(record, &headers));
    }
    println!("{}", Table::from(builder));
}

fn print_envelope_notes(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }
    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}
