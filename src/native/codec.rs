// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Record encoding for native sinks

use serde_json::Value;

use super::{PayloadFormat, SinkPayload};
use crate::error::{Error, Result};
use crate::network::NetworkRecord;

/// Nesting limit shared with serde_json's own parser; payloads deeper than
/// this cannot be read back on the native side.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Encodes records for one payload format
#[derive(Debug, Clone, Copy)]
pub struct RecordCodec {
    format: PayloadFormat,
    max_depth: usize,
}

impl RecordCodec {
    pub fn new(format: PayloadFormat) -> Self {
        Self {
            format,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the nesting limit
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn format(&self) -> PayloadFormat {
        self.format
    }

    /// Encode a record. Fails without side effects when the record cannot
    /// be represented.
    pub fn encode(&self, record: &NetworkRecord) -> Result<SinkPayload> {
        let value = serde_json::to_value(record)?;

        let depth = nesting_depth(&value);
        if depth > self.max_depth {
            return Err(Error::encode(
                format!("payload nests deeper than {} levels", self.max_depth),
                depth,
            ));
        }

        Ok(match self.format {
            PayloadFormat::Structured => SinkPayload::Structured(value),
            PayloadFormat::Encoded => SinkPayload::Encoded(serde_json::to_string(&value)?),
        })
    }
}

/// Depth of the deepest container; scalars are depth 0
fn nesting_depth(value: &Value) -> usize {
    // Iterative so hostile payloads cannot exhaust the stack
    let mut deepest = 0;
    let mut stack = vec![(value, 0usize)];
    while let Some((value, depth)) = stack.pop() {
        match value {
            Value::Array(items) => {
                deepest = deepest.max(depth + 1);
                stack.extend(items.iter().map(|v| (v, depth + 1)));
            }
            Value::Object(map) => {
                deepest = deepest.max(depth + 1);
                stack.extend(map.values().map(|v| (v, depth + 1)));
            }
            _ => {}
        }
    }
    deepest
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn nested(levels: usize) -> Value {
        let mut value = json!("leaf");
        for _ in 0..levels {
            value = json!({ "body": value });
        }
        value
    }

    #[test]
    fn test_depth() {
        assert_eq!(nesting_depth(&json!(1)), 0);
        assert_eq!(nesting_depth(&json!({"a": [1, {"b": 2}]})), 3);
    }

    #[test]
    fn test_structured_encoding() {
        let record = NetworkRecord::new("https://api.instabug.com", "GET");
        let payload = RecordCodec::new(PayloadFormat::Structured).encode(&record).unwrap();
        assert_eq!(
            payload,
            SinkPayload::Structured(serde_json::to_value(&record).unwrap())
        );
    }

    #[test]
    fn test_string_encoding() {
        let record = NetworkRecord::new("https://api.instabug.com", "GET");
        let payload = RecordCodec::new(PayloadFormat::Encoded).encode(&record).unwrap();
        assert_eq!(
            payload,
            SinkPayload::Encoded(serde_json::to_string(&record).unwrap())
        );
    }

    #[test]
    fn test_rejects_overly_nested_record() {
        let mut record = NetworkRecord::new("https://api.instabug.com", "GET");
        record.response_body = nested(200);

        let err = RecordCodec::new(PayloadFormat::Encoded)
            .encode(&record)
            .unwrap_err();
        assert!(matches!(err, Error::Encode { depth: 201, .. }));
    }

    #[test]
    fn test_custom_depth_limit() {
        let mut record = NetworkRecord::new("https://api.instabug.com", "GET");
        record.response_body = nested(3);

        let codec = RecordCodec::new(PayloadFormat::Structured).max_depth(3);
        assert!(codec.encode(&record).is_err());
        assert!(codec.max_depth(4).encode(&record).is_ok());
    }
}
