use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{flatten, result_of, warnings_of};

/// Format the result as a Field/Value table, followed by any warnings and
/// the methodology line.
pub fn print_table(value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (field, val) in flatten(result_of(value)) {
        builder.push_record([field, val]);
    }
    println!("{}", Table::from(builder));

    let warnings = warnings_of(value);
    if !warnings.is_empty() {
        println!("\nWarnings:");
        for w in warnings {
            println!("  - {}", w);
        }
    }

    if let Some(Value::String(meth)) = value.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
    Ok(())
}
