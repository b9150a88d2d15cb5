use serde_json::Value;

use super::{result_of, scalar_text};

/// Fields printed by `--output minimal`, first present one wins.
const PRIORITY_KEYS: [&str; 6] = [
    "loan_amount",
    "formatted",
    "amount",
    "property_insurance_rate",
    "records",
    "total_interest_for_period",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    let result = result_of(value);

    if let Value::Object(map) = result {
        for key in PRIORITY_KEYS {
            if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
                println!("{}", scalar_text(val));
                return Ok(());
            }
        }
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, scalar_text(val));
            return Ok(());
        }
    }

    println!("{}", scalar_text(result));
    Ok(())
}
