use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::config::collection::CollectionConfig;
use crate::foundation::error::MintResult;
use crate::foundation::layout::ensure_parent_dir;
use crate::specimen::model::Specimen;

/// Value of the `compiler` field in every metadata document.
pub const COMPILER: &str = "traitmint";

/// Attribute entry (`{trait_type, value}`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute label.
    pub trait_type: String,
    /// Trait value.
    pub value: String,
}

/// Collection the specimen belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionRef {
    /// Collection name.
    pub name: String,
}

/// One artifact file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    /// File name relative to the media directory.
    pub uri: String,
    /// MIME type, serialized as `type`.
    #[serde(rename = "type")]
    pub mime: String,
}

/// Credited creator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    /// Creator name.
    pub name: String,
}

/// Marketplace `properties` block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Properties {
    /// Video then thumbnail.
    pub files: Vec<FileRef>,
    /// Always `video`.
    pub category: String,
    /// Credited creators.
    pub creators: Vec<Creator>,
}

/// Marketplace metadata for one specimen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    /// Specimen filename.
    pub name: String,
    /// Collection description.
    pub description: String,
    /// Video file name.
    pub video: String,
    /// Thumbnail file name.
    pub image: String,
    /// Owning collection.
    pub collection: CollectionRef,
    /// One entry per trait, bonus trait included.
    pub attributes: Vec<Attribute>,
    /// Files, category and creators.
    pub properties: Properties,
    /// Tool that wrote the document.
    pub compiler: String,
}

impl TokenMetadata {
    /// Metadata for `specimen` under `collection`'s branding.
    pub fn for_specimen(specimen: &Specimen, collection: &CollectionConfig) -> Self {
        let video = specimen.video_name();
        let image = specimen.thumbnail_name();
        Self {
            name: specimen.filename.clone(),
            description: collection.description.clone(),
            video: video.clone(),
            image: image.clone(),
            collection: CollectionRef {
                name: collection.collection_name.clone(),
            },
            attributes: specimen
                .traits
                .iter()
                .map(|t| Attribute {
                    trait_type: t.trait_type.clone(),
                    value: t.value.clone(),
                })
                .collect(),
            properties: Properties {
                files: vec![
                    FileRef {
                        uri: video,
                        mime: "video/mp4".to_string(),
                    },
                    FileRef {
                        uri: image,
                        mime: "image/png".to_string(),
                    },
                ],
                category: "video".to_string(),
                creators: vec![Creator {
                    name: collection
                        .creator
                        .clone()
                        .unwrap_or_else(|| "Unknown".to_string()),
                }],
            },
            compiler: COMPILER.to_string(),
        }
    }
}

/// Every specimen's metadata in one document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterMetadata {
    /// Collection name.
    pub name: String,
    /// Collection description.
    pub description: String,
    /// Per-specimen documents in list order.
    pub collection: Vec<TokenMetadata>,
}

/// Write `{metadata_dir}/{filename}.json` for the first `limit` specimens (all when `None`)
/// and the combined document at `master_path`. Returns the number of per-specimen files.
#[tracing::instrument(skip_all, fields(limit = ?limit))]
pub fn write_metadata(
    specimens: &[Specimen],
    collection: &CollectionConfig,
    metadata_dir: &Path,
    master_path: &Path,
    limit: Option<usize>,
) -> MintResult<usize> {
    std::fs::create_dir_all(metadata_dir)
        .with_context(|| format!("create metadata directory '{}'", metadata_dir.display()))?;

    let take = limit.unwrap_or(specimens.len()).min(specimens.len());
    let mut combined = Vec::with_capacity(take);
    for specimen in &specimens[..take] {
        let meta = TokenMetadata::for_specimen(specimen, collection);
        let path = metadata_dir.join(format!("{}.json", specimen.filename));
        std::fs::write(&path, serde_json::to_string_pretty(&meta)?)
            .with_context(|| format!("write metadata '{}'", path.display()))?;
        combined.push(meta);
    }

    let master = MasterMetadata {
        name: collection.collection_name.clone(),
        description: collection.description.clone(),
        collection: combined,
    };
    ensure_parent_dir(master_path)?;
    std::fs::write(master_path, serde_json::to_string_pretty(&master)?)
        .with_context(|| format!("write master metadata '{}'", master_path.display()))?;

    tracing::info!(written = take, "metadata written");
    Ok(take)
}

#[cfg(test)]
#[path = "../../tests/unit/report/metadata.rs"]
mod tests;
