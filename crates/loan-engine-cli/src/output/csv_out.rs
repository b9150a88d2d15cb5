use serde_json::Value;
use std::io;

use super::{flatten, result_of};

/// Write the result as two-column `field,value` CSV to stdout.
pub fn print_csv(value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_writer(io::stdout().lock());
    wtr.write_record(["field", "value"])?;
    for (field, val) in flatten(result_of(value)) {
        wtr.write_record([field.as_str(), val.as_str()])?;
    }
    wtr.flush()?;
    Ok(())
}
