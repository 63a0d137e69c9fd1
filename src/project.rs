//! Loader for Scratch 3 `project.json` documents.
//!
//! Only the parts the runtime executes are read: targets, their block graphs
//! and costumes. Costume bytes come from a caller-supplied lookup keyed by the
//! asset file name (`md5ext`), so archives and directories work the same way.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::blocks::{Block, BlockGraph, Input, Opcode};
use crate::costume::{Costume, DataFormat};
use crate::error::{RuntimeError, RuntimeResult};
use crate::target::Target;

#[derive(Deserialize)]
struct ProjectJson {
    targets: Vec<TargetJson>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TargetJson {
    #[serde(default)]
    is_stage: bool,
    name: String,
    #[serde(default)]
    blocks: BTreeMap<String, Value>,
    #[serde(default)]
    costumes: Vec<CostumeJson>,
    #[serde(default)]
    current_costume: usize,
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
    #[serde(default = "default_direction")]
    direction: f32,
    #[serde(default = "default_size")]
    size: f32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CostumeJson {
    name: String,
    #[serde(default)]
    asset_id: String,
    md5ext: Option<String>,
    data_format: String,
    #[serde(default = "default_resolution")]
    bitmap_resolution: u32,
    #[serde(default)]
    rotation_center_x: f32,
    #[serde(default)]
    rotation_center_y: f32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockJson {
    opcode: String,
    next: Option<String>,
    parent: Option<String>,
    #[serde(default)]
    inputs: BTreeMap<String, Value>,
    #[serde(default)]
    fields: BTreeMap<String, Value>,
    #[serde(default)]
    shadow: bool,
    #[serde(default)]
    top_level: bool,
    mutation: Option<MutationJson>,
}

#[derive(Deserialize)]
struct MutationJson {
    proccode: Option<String>,
    /// JSON-encoded array of input names.
    argumentids: Option<String>,
}

fn default_direction() -> f32 {
    90.0
}

fn default_size() -> f32 {
    100.0
}

fn default_resolution() -> u32 {
    1
}

/// Parse every target of a `project.json` document.
///
/// `assets` maps an asset file name such as `"bcf454acf82e4504149f7ffe07081dbc.svg"`
/// to its bytes.
pub fn load_targets(
    json: &str,
    mut assets: impl FnMut(&str) -> Option<Vec<u8>>,
) -> RuntimeResult<Vec<Target>> {
    let project: ProjectJson = serde_json::from_str(json)
        .map_err(|e| RuntimeError::project(format!("invalid project.json: {e}")))?;

    project
        .targets
        .into_iter()
        .map(|t| load_target(t, &mut assets))
        .collect()
}

fn load_target(
    json: TargetJson,
    assets: &mut impl FnMut(&str) -> Option<Vec<u8>>,
) -> RuntimeResult<Target> {
    let mut blocks = BlockGraph::new();
    for (id, value) in json.blocks {
        // Top-level variable/list reporters are stored as bare arrays.
        if !value.is_object() {
            continue;
        }
        let block: BlockJson = serde_json::from_value(value)
            .map_err(|e| RuntimeError::project(format!("block '{id}' in '{}': {e}", json.name)))?;
        blocks.insert(convert_block(id, block)?);
    }

    let costumes = json
        .costumes
        .into_iter()
        .map(|c| {
            let file = c
                .md5ext
                .clone()
                .unwrap_or_else(|| format!("{}.{}", c.asset_id, c.data_format));
            let data = assets(&file).ok_or_else(|| {
                RuntimeError::project(format!("missing asset '{file}' for costume '{}'", c.name))
            })?;
            Ok(Costume::new(&c.name, data, DataFormat::from_tag(&c.data_format))
                .with_bitmap_resolution(c.bitmap_resolution)
                .with_rotation_center(c.rotation_center_x, c.rotation_center_y))
        })
        .collect::<RuntimeResult<Vec<_>>>()?;

    Ok(Target {
        name: json.name,
        is_stage: json.is_stage,
        blocks,
        costumes,
        current_costume: json.current_costume,
        x: json.x,
        y: json.y,
        direction: json.direction,
        size: json.size,
    })
}

fn convert_block(id: String, json: BlockJson) -> RuntimeResult<Block> {
    let mut block = Block::new(id, &json.opcode);
    block.next = json.next;
    block.parent = json.parent;
    block.shadow = json.shadow;
    block.top_level = json.top_level;
    block.inputs = json
        .inputs
        .iter()
        .map(|(name, v)| (name.clone(), parse_input(v)))
        .collect();
    block.fields = json
        .fields
        .iter()
        .filter_map(|(name, v)| field_value(v).map(|s| (name.clone(), s)))
        .collect();

    if let Some(mutation) = json.mutation {
        block.proccode = mutation.proccode;
        if let Some(ids) = mutation.argumentids {
            block.argument_ids = serde_json::from_str(&ids).map_err(|e| {
                RuntimeError::project(format!("block '{}': bad argumentids: {e}", block.id))
            })?;
        }
    }
    if block.opcode == Opcode::ProceduresCall && block.proccode.is_none() {
        return Err(RuntimeError::project(format!(
            "block '{}': procedures_call without proccode",
            block.id
        )));
    }
    Ok(block)
}

/// Primitive types 12 and 13 are variable and list reporters, not literals.
const VARIABLE_PRIMITIVE: u64 = 12;
const LIST_PRIMITIVE: u64 = 13;

/// Decode the sb3 input encoding `[shadow_kind, value, obscured_shadow?]`.
///
/// A string is a block id; an array is a primitive `[type, value, ..]`.
/// Variable and list reporters are not evaluated, so an input holding one
/// reads the shadow it covers.
fn parse_input(value: &Value) -> Input {
    let mut input = Input::default();
    let Some(parts) = value.as_array() else {
        return input;
    };
    for part in parts.iter().skip(1) {
        match part {
            Value::String(id) if input.block.is_none() => input.block = Some(id.clone()),
            Value::Array(_) if is_reporter_primitive(part) => {}
            Value::Array(_) if input.literal.is_none() => input.literal = primitive_value(part),
            _ => {}
        }
    }
    input
}

fn is_reporter_primitive(value: &Value) -> bool {
    matches!(
        value.get(0).and_then(Value::as_u64),
        Some(VARIABLE_PRIMITIVE | LIST_PRIMITIVE)
    )
}

fn primitive_value(value: &Value) -> Option<String> {
    scalar_text(value.as_array()?.get(1)?)
}

/// First element of an sb3 field entry `[value, id?]`.
fn field_value(value: &Value) -> Option<String> {
    match value {
        Value::Array(parts) => scalar_text(parts.first()?),
        other => scalar_text(other),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn primitive_inputs_become_literals() {
        let input = parse_input(&json!([1, [4, "10"]]));
        assert_eq!(input, Input::literal("10"));
    }

    #[test]
    fn numeric_json_primitives_are_stringified() {
        let input = parse_input(&json!([1, [5, 2.5]]));
        assert_eq!(input.literal.as_deref(), Some("2.5"));
    }

    #[test]
    fn obscured_shadow_keeps_block_and_literal() {
        let input = parse_input(&json!([3, "reporter", [4, "7"]]));
        assert_eq!(input.block.as_deref(), Some("reporter"));
        assert_eq!(input.literal.as_deref(), Some("7"));
    }

    #[test]
    fn variable_over_shadow_reads_the_shadow() {
        let input = parse_input(&json!([3, [12, "my var", "varid"], [4, "10"]]));
        assert_eq!(input.literal.as_deref(), Some("10"));
        assert_eq!(input.block, None);

        let list = parse_input(&json!([3, [13, "items", "listid"], [10, "hello"]]));
        assert_eq!(list.literal.as_deref(), Some("hello"));
    }

    #[test]
    fn bare_variable_input_is_empty() {
        assert!(parse_input(&json!([3, [12, "my var", "varid"]])).is_empty());
    }

    #[test]
    fn empty_substack_has_no_block() {
        assert!(parse_input(&json!([2, null])).is_empty());
    }

    #[test]
    fn field_takes_first_element() {
        assert_eq!(field_value(&json!(["space", null])).as_deref(), Some("space"));
    }
}
