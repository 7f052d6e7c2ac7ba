//! JSON serialization for reports and diff dumps.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::errors::Result;

/// Serialize a value as JSON with 4-space indentation.
pub fn to_json_4sp<T: Serialize>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::GroupedRecord;

    #[test]
    fn test_four_space_indent() {
        let records = vec![GroupedRecord {
            headerfile: "mylib.h".to_string(),
            name: "E".to_string(),
            description: "Enumerator removed: 'E.C'".to_string(),
            changetype: "Compatibility Changed".to_string(),
            compatibility: "backward_incompatible".to_string(),
        }];
        let json = to_json_4sp(&records).unwrap();
        assert!(json.contains("    \"headerfile\""));
        assert!(!json.contains("  \"headerfile\": \"mylib.h\"\n"));

        let reparsed: Vec<GroupedRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(reparsed, records);
    }

    #[test]
    fn test_empty_array() {
        let json = to_json_4sp(&Vec::<GroupedRecord>::new()).unwrap();
        assert_eq!(json, "[]");
    }
}
