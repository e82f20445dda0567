use std::path::{Path, PathBuf};

use crate::config::layers::LayerSet;
use crate::specimen::model::{SelectedTrait, Specimen};

/// A trait resolved to a file on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetRef {
    /// Source layer name.
    pub layer: String,
    /// Trait value.
    pub value: String,
    /// Asset file location.
    pub path: PathBuf,
    /// Animated assets are decoded as video; stills are looped.
    pub animated: bool,
}

/// Outcome of resolving one specimen's traits against the trait directory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedAssets {
    /// Present assets in stacking order, bottom first.
    pub assets: Vec<AssetRef>,
    /// Expected asset paths that were not found.
    pub missing: Vec<PathBuf>,
}

/// Where the asset for `selected` lives: `traits/<layer>/<value>.<ext>`.
///
/// Layers absent from the configuration (the bonus layer, or a layer removed since
/// generation) are treated as still `png` images.
pub fn asset_ref(layers: &LayerSet, traits_dir: &Path, selected: &SelectedTrait) -> AssetRef {
    let (ext, animated) = match layers.get(&selected.layer) {
        Some(layer) => (layer.asset_extension(), layer.animated),
        None => ("png", false),
    };
    AssetRef {
        layer: selected.layer.clone(),
        value: selected.value.clone(),
        path: traits_dir
            .join(&selected.layer)
            .join(format!("{}.{ext}", selected.value)),
        animated,
    }
}

/// Resolve every trait of `specimen`, drop missing files, and sort survivors into canonical
/// layer order (configured order, unknown layers last, ties kept in trait order).
pub fn resolve_assets(layers: &LayerSet, traits_dir: &Path, specimen: &Specimen) -> ResolvedAssets {
    let mut out = ResolvedAssets::default();
    for selected in &specimen.traits {
        let asset = asset_ref(layers, traits_dir, selected);
        if asset.path.is_file() {
            out.assets.push(asset);
        } else {
            out.missing.push(asset.path);
        }
    }
    out.assets.sort_by_key(|a| layers.position(&a.layer));
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/assets.rs"]
mod tests;
