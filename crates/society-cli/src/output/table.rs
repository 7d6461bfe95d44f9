use serde_json::Value;
use tabled::{builder::Builder, Table};

/// Format output as tables using the tabled crate.
///
/// Scalar fields render as Field/Value rows; any array-of-objects field
/// (a loan schedule, a ledger listing) gets its own table beneath.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            let mut builder = Builder::default();
            builder.push_record(["Field", "Value"]);
            let mut nested: Vec<(&str, &Vec<Value>)> = Vec::new();

            for (key, val) in map {
                match val {
                    Value::Array(arr) if arr.first().map_or(false, Value::is_object) => {
                        nested.push((key, arr));
                    }
                    Value::Object(inner) => {
                        for (inner_key, inner_val) in inner {
                            match inner_val {
                                Value::Array(arr)
                                    if arr.first().map_or(false, Value::is_object) =>
                                {
                                    nested.push((inner_key, arr));
                                }
                                _ => builder
                                    .push_record([inner_key.as_str(), &format_value(inner_val)]),
                            }
                        }
                    }
                    _ => builder.push_record([key.as_str(), &format_value(val)]),
                }
            }

            println!("{}", Table::from(builder));
            for (name, arr) in nested {
                println!("\n{}:", name);
                print_array_table(arr);
            }
        }
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
