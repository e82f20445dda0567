use super::*;
use crate::config::layers::{LayerConfig, TraitOption};

fn layer(name: &str, order: i32, animated: bool) -> LayerConfig {
    LayerConfig {
        name: name.to_string(),
        order,
        required: true,
        rarity: 0,
        trait_type: None,
        animated,
        asset_type: None,
        traits: vec![TraitOption::new("x", 100)],
    }
}

fn touch(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, b"asset").unwrap();
}

#[test]
fn paths_follow_layer_extension_rules() {
    let layers = LayerSet::new(vec![layer("Background", 0, false), layer("Sparkles", 1, true)]).unwrap();
    let root = Path::new("traits");

    let still = asset_ref(&layers, root, &SelectedTrait::new("Background", "Background", "Blue"));
    assert_eq!(still.path, root.join("Background").join("Blue.png"));
    assert!(!still.animated);

    let anim = asset_ref(&layers, root, &SelectedTrait::new("Sparkles", "Effect", "Gold"));
    assert_eq!(anim.path, root.join("Sparkles").join("Gold.mov"));
    assert!(anim.animated);

    let bonus = asset_ref(&layers, root, &SelectedTrait::new("Special", "Special", "Golden Egg"));
    assert_eq!(bonus.path, root.join("Special").join("Golden Egg.png"));
    assert!(!bonus.animated);
}

#[test]
fn missing_assets_are_dropped_and_survivors_sorted() {
    let dir = tempfile::tempdir().unwrap();
    let traits = dir.path().join("traits");
    let layers = LayerSet::new(vec![
        layer("Background", 0, false),
        layer("Body", 1, false),
        layer("Hat", 2, false),
    ])
    .unwrap();

    touch(&traits.join("Background").join("Blue.png"));
    touch(&traits.join("Hat").join("Red.png"));
    touch(&traits.join("Special").join("Golden Egg.png"));

    // Deliberately out of canonical order, with the bonus trait first.
    let specimen = Specimen {
        id: 1,
        filename: "duck #1".to_string(),
        traits: vec![
            SelectedTrait::new("Special", "Special", "Golden Egg"),
            SelectedTrait::new("Hat", "Hat", "Red"),
            SelectedTrait::new("Body", "Body", "Yellow"),
            SelectedTrait::new("Background", "Background", "Blue"),
        ],
        rare: true,
    };

    let resolved = resolve_assets(&layers, &traits, &specimen);
    let order: Vec<_> = resolved.assets.iter().map(|a| a.layer.as_str()).collect();
    assert_eq!(order, ["Background", "Hat", "Special"]);
    assert_eq!(resolved.missing, vec![traits.join("Body").join("Yellow.png")]);
}

#[test]
fn nothing_on_disk_yields_empty_assets() {
    let dir = tempfile::tempdir().unwrap();
    let layers = LayerSet::new(vec![layer("Background", 0, false)]).unwrap();
    let specimen = Specimen {
        id: 1,
        filename: "duck #1".to_string(),
        traits: vec![SelectedTrait::new("Background", "Background", "Blue")],
        rare: false,
    };
    let resolved = resolve_assets(&layers, dir.path(), &specimen);
    assert!(resolved.assets.is_empty());
    assert_eq!(resolved.missing.len(), 1);
}
