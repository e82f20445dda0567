use super::*;
use crate::specimen::model::SelectedTrait;

fn collection() -> CollectionConfig {
    CollectionConfig {
        collection_name: "Ducks".to_string(),
        description: "Layered ducks".to_string(),
        creator: Some("Quackworks".to_string()),
        ..CollectionConfig::with_total(3)
    }
}

fn specimens() -> Vec<Specimen> {
    (1..=3)
        .map(|id| Specimen {
            id,
            filename: format!("duck #{id}"),
            traits: vec![
                SelectedTrait::new("Background", "Background", "Blue"),
                SelectedTrait::new("Sparkles", "Effect", "Gold"),
            ],
            rare: false,
        })
        .collect()
}

#[test]
fn specimen_metadata_has_the_marketplace_shape() {
    let meta = TokenMetadata::for_specimen(&specimens()[0], &collection());
    let json = serde_json::to_value(&meta).unwrap();

    assert_eq!(json["name"], "duck #1");
    assert_eq!(json["description"], "Layered ducks");
    assert_eq!(json["video"], "duck #1.mp4");
    assert_eq!(json["image"], "duck #1.png");
    assert_eq!(json["collection"]["name"], "Ducks");
    assert_eq!(json["attributes"][1]["trait_type"], "Effect");
    assert_eq!(json["attributes"][1]["value"], "Gold");
    assert_eq!(json["properties"]["files"][0]["type"], "video/mp4");
    assert_eq!(json["properties"]["files"][1]["uri"], "duck #1.png");
    assert_eq!(json["properties"]["category"], "video");
    assert_eq!(json["properties"]["creators"][0]["name"], "Quackworks");
    assert_eq!(json["compiler"], COMPILER);
}

#[test]
fn creator_defaults_to_unknown() {
    let cfg = CollectionConfig {
        creator: None,
        ..collection()
    };
    let meta = TokenMetadata::for_specimen(&specimens()[0], &cfg);
    assert_eq!(meta.properties.creators[0].name, "Unknown");
}

#[test]
fn writes_per_specimen_files_and_master_document() {
    let dir = tempfile::tempdir().unwrap();
    let meta_dir = dir.path().join("output").join("metadata");
    let master = dir.path().join("output").join("master_metadata.json");

    let written = write_metadata(&specimens(), &collection(), &meta_dir, &master, None).unwrap();
    assert_eq!(written, 3);
    for id in 1..=3 {
        let text = std::fs::read_to_string(meta_dir.join(format!("duck #{id}.json"))).unwrap();
        let meta: TokenMetadata = serde_json::from_str(&text).unwrap();
        assert_eq!(meta.name, format!("duck #{id}"));
    }

    let doc: MasterMetadata =
        serde_json::from_str(&std::fs::read_to_string(&master).unwrap()).unwrap();
    assert_eq!(doc.name, "Ducks");
    assert_eq!(doc.collection.len(), 3);
}

#[test]
fn limit_caps_the_written_set() {
    let dir = tempfile::tempdir().unwrap();
    let meta_dir = dir.path().join("metadata");
    let master = dir.path().join("master_metadata.json");

    let written = write_metadata(&specimens(), &collection(), &meta_dir, &master, Some(2)).unwrap();
    assert_eq!(written, 2);
    assert!(!meta_dir.join("duck #3.json").exists());

    let doc: MasterMetadata =
        serde_json::from_str(&std::fs::read_to_string(&master).unwrap()).unwrap();
    assert_eq!(doc.collection.len(), 2);

    // A limit past the end is clamped.
    assert_eq!(
        write_metadata(&specimens(), &collection(), &meta_dir, &master, Some(50)).unwrap(),
        3
    );
}
