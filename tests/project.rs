use std::collections::HashMap;
use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use scratch_runtime::prelude::*;

fn png(w: u32, h: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(w, h, Rgba([0, 0, 255, 255]));
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

const PROJECT: &str = r#"{
  "targets": [
    {
      "isStage": true,
      "name": "Stage",
      "blocks": {},
      "costumes": [
        { "name": "backdrop1", "assetId": "stage", "md5ext": "stage.png", "dataFormat": "png" }
      ],
      "currentCostume": 0
    },
    {
      "isStage": false,
      "name": "Sprite1",
      "x": 12,
      "y": -8,
      "direction": 45,
      "currentCostume": 1,
      "costumes": [
        { "name": "costume1", "assetId": "cat", "md5ext": "cat.png", "dataFormat": "png",
          "rotationCenterX": 8, "rotationCenterY": 4 },
        { "name": "costume2", "assetId": "cat2", "dataFormat": "png", "bitmapResolution": 2 }
      ],
      "blocks": {
        "flag": { "opcode": "event_whenflagclicked", "next": "move", "parent": null,
                  "inputs": {}, "fields": {}, "shadow": false, "topLevel": true, "x": 0, "y": 0 },
        "move": { "opcode": "motion_gotoxy", "next": "log", "parent": "flag",
                  "inputs": { "X": [1, [4, "10"]], "Y": [3, "rep", [4, "-5"]] },
                  "fields": {}, "shadow": false, "topLevel": false },
        "rep": { "opcode": "operator_add", "next": null, "parent": "move",
                 "inputs": {}, "fields": {}, "shadow": false, "topLevel": false },
        "log": { "opcode": "procedures_call", "next": null, "parent": "move",
                 "inputs": { "arg0": [1, [10, "hi"]] }, "fields": {},
                 "shadow": false, "topLevel": false,
                 "mutation": { "tagName": "mutation", "children": [],
                               "proccode": "\u200b\u200blog\u200b\u200b %s",
                               "argumentids": "[\"arg0\"]", "warp": "false" } },
        "key": { "opcode": "event_whenkeypressed", "next": null, "parent": null,
                 "inputs": {}, "fields": { "KEY_OPTION": ["space", null] },
                 "shadow": false, "topLevel": true },
        "var": [12, "score", "abc", 10, 20]
      }
    }
  ]
}"#;

fn assets() -> HashMap<&'static str, Vec<u8>> {
    HashMap::from([
        ("stage.png", png(480, 360)),
        ("cat.png", png(16, 8)),
        ("cat2.png", png(32, 16)),
    ])
}

fn load() -> Vec<Target> {
    let assets = assets();
    load_targets(PROJECT, |file| assets.get(file).cloned()).unwrap()
}

#[test]
fn loads_targets_in_document_order() {
    let targets = load();
    assert_eq!(targets.len(), 2);
    assert!(targets[0].is_stage);
    assert_eq!(targets[0].name, "Stage");
    assert_eq!(targets[1].name, "Sprite1");
}

#[test]
fn target_state_is_copied() {
    let sprite = &load()[1];
    assert_eq!((sprite.x, sprite.y), (12.0, -8.0));
    assert_eq!(sprite.direction, 45.0);
    assert_eq!(sprite.current_costume, 1);
    assert_eq!(sprite.size, 100.0);
}

#[test]
fn costumes_carry_format_and_pivot() {
    let sprite = &load()[1];
    let first = &sprite.costumes[0];
    assert_eq!(first.name, "costume1");
    assert_eq!(first.data_format, DataFormat::Png);
    assert_eq!(first.rotation_center, glam::Vec2::new(8.0, 4.0));
    assert_eq!(first.bitmap_resolution, 1);
    assert_eq!(sprite.costumes[1].bitmap_resolution, 2);
}

#[test]
fn asset_falls_back_to_asset_id_and_format() {
    let sprite = &load()[1];
    assert_eq!(sprite.costumes[1].data, png(32, 16));
}

#[test]
fn bare_array_blocks_are_skipped() {
    let sprite = &load()[1];
    assert_eq!(sprite.blocks.len(), 5);
    assert!(!sprite.blocks.contains("var"));
    assert!(sprite.blocks.validate().is_ok());
}

#[test]
fn inputs_fields_and_links_are_decoded() {
    let g = &load()[1].blocks;
    let move_block = g.get("move").unwrap();
    assert_eq!(move_block.opcode, Opcode::MotionGoToXY);
    assert_eq!(move_block.parent.as_deref(), Some("flag"));
    assert_eq!(move_block.next.as_deref(), Some("log"));
    assert_eq!(move_block.inputs["X"], Input::literal("10"));
    // Obscured shadow: the reporter plus the literal behind it.
    assert_eq!(move_block.inputs["Y"].block.as_deref(), Some("rep"));
    assert_eq!(g.input_integer(move_block, "Y").unwrap(), -5);

    let key = g.get("key").unwrap();
    assert_eq!(key.field("KEY_OPTION"), Some("space"));
    assert!(key.top_level);
}

#[test]
fn procedure_calls_keep_signature_and_arguments() {
    let g = &load()[1].blocks;
    let log = g.get("log").unwrap();
    assert_eq!(log.proccode.as_deref(), Some(scratch_runtime::interpreter::LOG_PROCCODE));
    assert_eq!(log.argument_ids, vec!["arg0"]);
    assert_eq!(g.input_text(log, "arg0").unwrap(), "hi");
}

#[test]
fn hats_are_the_top_level_event_blocks() {
    let g = &load()[1].blocks;
    let hats: Vec<_> = g.hats().map(|b| b.id.as_str()).collect();
    assert_eq!(hats, vec!["flag", "key"]);
}

#[test]
fn missing_asset_is_a_project_error() {
    let err = load_targets(PROJECT, |_| None).unwrap_err();
    assert!(matches!(err, RuntimeError::Project(ref m) if m.contains("stage.png")));
}

#[test]
fn malformed_document_is_a_project_error() {
    let err = load_targets("{\"targets\": 3}", |_| None).unwrap_err();
    assert!(matches!(err, RuntimeError::Project(_)));
}

#[test]
fn call_without_proccode_is_rejected() {
    let json = r#"{ "targets": [ { "name": "S", "costumes": [], "blocks": {
        "c": { "opcode": "procedures_call", "next": null, "parent": null,
               "inputs": {}, "fields": {}, "topLevel": true }
    } } ] }"#;
    let err = load_targets(json, |_| None).unwrap_err();
    assert!(matches!(err, RuntimeError::Project(ref m) if m.contains("proccode")));
}

#[test]
fn loaded_project_runs() {
    let mut runtime = Runtime::new(
        load(),
        std::sync::Arc::new(ImageDecoder),
        &RuntimeConfig::default(),
        Catalog::english(),
    )
    .unwrap();
    runtime.start();
    let input = InputState::new();
    for _ in 0..3 {
        runtime.tick(std::time::Duration::from_millis(33), &input);
    }
    let sprite = runtime.sprite("Sprite1").unwrap();
    assert_eq!((sprite.x(), sprite.y()), (10.0, -5.0));
    assert_eq!(sprite.costume_index(), 1);
}
