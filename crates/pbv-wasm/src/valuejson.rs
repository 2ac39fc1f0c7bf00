/// Schema-guided JSON-to-[`MessageValue`] bridge, adapted from `pbv-cli`'s
/// smoke-test bridge for use from a JS host (: the real wire
/// codec is out of scope, so a WASM build exercising a schema's rules
/// against a payload needs the same JSON stand-in the CLI uses).
use serde_json::Value as Json;

use pbv_core::{Cardinality, Field, FieldType, FieldValue, Message, MessageValue, Schema};

pub fn build_message_value(schema: &Schema, message: &Message, json: &Json) -> Result<MessageValue, String> {
    let obj = json.as_object().ok_or_else(|| format!("{} payload must be a JSON object", message.name))?;
    let mut value = MessageValue::new();
    for field in &message.fields {
        let Some(raw) = obj.get(&field.name) else {
            continue;
        };
        if raw.is_null() {
            continue;
        }
        let field_value = build_field_value(schema, field, raw)?;
        value = value.with_field(field.name.clone(), field_value);
    }
    Ok(value)
}

fn build_field_value(schema: &Schema, field: &Field, raw: &Json) -> Result<FieldValue, String> {
    if field.cardinality == Cardinality::Repeated {
        let items = raw.as_array().ok_or_else(|| format!("field '{}' must be a JSON array", field.name))?;
        let mut values = Vec::with_capacity(items.len());
        for item in items {
            values.push(build_scalar_value(schema, field, item)?);
        }
        return Ok(FieldValue::Repeated(values));
    }
    build_scalar_value(schema, field, raw)
}

fn build_scalar_value(schema: &Schema, field: &Field, raw: &Json) -> Result<FieldValue, String> {
    match &field.field_type {
        FieldType::Scalar(scalar) => build_scalar_number(field, *scalar, raw),
        FieldType::String => raw
        .as_str()
        .map(|s| FieldValue::String(s.to_string()))
        .ok_or_else(|| format!("field '{}' must be a JSON string", field.name)),
        FieldType::Bytes => build_bytes_value(field, raw),
        FieldType::Enum { .. } => raw
        .as_i64()
        .map(|v| FieldValue::Enum(v as i32))
        .ok_or_else(|| format!("field '{}' must be a JSON integer", field.name)),
        FieldType::Message { type_name, .. } if type_name == "google.protobuf.Any" => build_any_value(field, raw),
        FieldType::Message { type_name, .. } if type_name == "google.protobuf.Timestamp" => build_timestamp_value(field, raw),
        FieldType::Message { type_name, .. } => {
            let (_, nested) = schema
            .find_message(type_name)
            .ok_or_else(|| format!("field '{}' references unknown message type '{type_name}'", field.name))?;
            let nested_value = build_message_value(schema, nested, raw)?;
            Ok(FieldValue::Message(Box::new(nested_value)))
        }
    }
}

fn build_scalar_number(field: &Field, scalar: pbv_core::ScalarType, raw: &Json) -> Result<FieldValue, String> {
    use pbv_core::ScalarType;
    let err = || format!("field '{}' must be a JSON number", field.name);
    match scalar {
        ScalarType::I32 => raw.as_i64().map(|v| FieldValue::I32(v as i32)).ok_or_else(err),
        ScalarType::I64 => raw.as_i64().map(FieldValue::I64).ok_or_else(err),
        ScalarType::U32 => raw.as_u64().map(|v| FieldValue::U32(v as u32)).ok_or_else(err),
        ScalarType::U64 => raw.as_u64().map(FieldValue::U64).ok_or_else(err),
        ScalarType::F32 => raw.as_f64().map(|v| FieldValue::F32(v as f32)).ok_or_else(err),
        ScalarType::F64 => raw.as_f64().map(FieldValue::F64).ok_or_else(err),
        ScalarType::Bool => raw.as_bool().map(FieldValue::Bool).ok_or_else(|| format!("field '{}' must be a JSON boolean", field.name)),
    }
}

fn build_bytes_value(field: &Field, raw: &Json) -> Result<FieldValue, String> {
    let items = raw.as_array().ok_or_else(|| format!("field '{}' must be a JSON array of byte values", field.name))?;
    let mut bytes = Vec::with_capacity(items.len());
    for item in items {
        let byte = item
        .as_u64()
        .filter(|v| *v <= u64::from(u8::MAX))
        .ok_or_else(|| format!("field '{}' byte values must be integers in 0..=255", field.name))?;
        bytes.push(byte as u8);
    }
    Ok(FieldValue::Bytes(bytes))
}

fn build_any_value(field: &Field, raw: &Json) -> Result<FieldValue, String> {
    let obj = raw.as_object().ok_or_else(|| format!("field '{}' (Any) must be a JSON object", field.name))?;
    let type_url = obj
    .get("type_url")
    .and_then(Json::as_str)
    .ok_or_else(|| format!("field '{}' (Any) requires a string 'type_url'", field.name))?;
    let value_bytes = match obj.get("value") {
        Some(raw_value) => {
            let items = raw_value
            .as_array()
            .ok_or_else(|| format!("field '{}' (Any) 'value' must be a JSON array of byte values", field.name))?;
            let mut bytes = Vec::with_capacity(items.len());
            for item in items {
                let byte = item
                .as_u64()
                .filter(|v| *v <= u64::from(u8::MAX))
                .ok_or_else(|| format!("field '{}' (Any) 'value' bytes must be integers in 0..=255", field.name))?;
                bytes.push(byte as u8);
            }
            bytes
        }
        None => Vec::new(),
    };
    let inner = MessageValue::new()
    .with_field("type_url", FieldValue::String(type_url.to_string()))
    .with_field("value", FieldValue::Bytes(value_bytes));
    Ok(FieldValue::Message(Box::new(inner)))
}

fn build_timestamp_value(field: &Field, raw: &Json) -> Result<FieldValue, String> {
    let obj = raw.as_object().ok_or_else(|| format!("field '{}' (Timestamp) must be a JSON object", field.name))?;
    let seconds = obj
    .get("seconds")
    .and_then(Json::as_i64)
    .ok_or_else(|| format!("field '{}' (Timestamp) requires an integer 'seconds'", field.name))?;
    let nanos = obj.get("nanos").and_then(Json::as_i64).unwrap_or(0);
    let inner = MessageValue::new().with_field("seconds", FieldValue::I64(seconds)).with_field("nanos", FieldValue::I64(nanos));
    Ok(FieldValue::Message(Box::new(inner)))
}
