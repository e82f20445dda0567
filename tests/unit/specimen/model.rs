use super::model::*;
use super::store::*;

#[test]
fn loosely_shaped_trait_records_are_normalized() {
    let json = r#"[
        {
            "id": 1,
            "filename": "duck #1",
            "traits": [
                { "layer": "Background", "trait_type": "Background", "value": "Blue" },
                { "trait_type": "Headwear", "value": "Cap" },
                { "layer": "Special", "value": "Golden Egg", "path": "/abs/traits/Special/Golden Egg.png" }
            ],
            "goldenEgg": true
        }
    ]"#;
    let list: Vec<Specimen> = serde_json::from_str(json).unwrap();
    let traits = &list[0].traits;

    assert_eq!(traits[0], SelectedTrait::new("Background", "Background", "Blue"));
    assert_eq!(traits[1], SelectedTrait::new("Headwear", "Headwear", "Cap"));
    assert_eq!(traits[2], SelectedTrait::new("Special", "Special", "Golden Egg"));
    assert!(list[0].rare);
    assert_eq!(list[0].base_trait_count("Special"), 2);
}

#[test]
fn rare_flag_defaults_to_false() {
    let json = r#"{ "id": 3, "filename": "duck #3", "traits": [] }"#;
    let s: Specimen = serde_json::from_str(json).unwrap();
    assert!(!s.rare);
    assert_eq!(s.video_name(), "duck #3.mp4");
    assert_eq!(s.thumbnail_name(), "duck #3.png");
}

#[test]
fn serialized_shape_uses_golden_egg_key() {
    let s = Specimen {
        id: 7,
        filename: "duck #7".to_string(),
        traits: vec![SelectedTrait::new("Hat", "Headwear", "Red")],
        rare: false,
    };
    let v = serde_json::to_value(&s).unwrap();
    assert_eq!(v["goldenEgg"], serde_json::Value::Bool(false));
    assert_eq!(v["traits"][0]["trait_type"], "Headwear");
    assert_eq!(v["traits"][0]["layer"], "Hat");
}

#[test]
fn save_then_load_preserves_the_list() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("output").join("specimens.json");
    let list = vec![
        Specimen {
            id: 1,
            filename: "duck #1".to_string(),
            traits: vec![SelectedTrait::new("Background", "Background", "Blue")],
            rare: false,
        },
        Specimen {
            id: 2,
            filename: "duck #2".to_string(),
            traits: vec![
                SelectedTrait::new("Background", "Background", "Green"),
                SelectedTrait::new("Special", "Special", "Golden Egg"),
            ],
            rare: true,
        },
    ];

    save_specimens(&path, &list).unwrap();
    assert!(!path.with_extension("json.tmp").exists());
    assert_eq!(load_specimens(&path).unwrap(), list);
}
