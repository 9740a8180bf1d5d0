//! Forest directory writer/reader (spec.md §4.8 "Forest file layout"):
//! a `forest_config` manifest plus one `random_tree_<i>.bin` per tree.

use crate::error::{Error, Result};
use forest_core::serialize::{read_node, write_node};
use forest_core::types::{Forest, ForestConfig, MaxFeatures, Tree};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

fn max_features_to_string(max_features: MaxFeatures) -> String {
    match max_features {
        MaxFeatures::Sqrt => "sqrt".to_string(),
        MaxFeatures::Log2 => "log2".to_string(),
        MaxFeatures::Fixed(n) => n.to_string(),
    }
}

/// Writes `forest_config` (key: value lines, fixed field order) plus
/// one binary tree file per tree, creating `dir` if needed.
pub fn write_forest(dir: impl AsRef<Path>, forest: &Forest) -> Result<()> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    let manifest_path = dir.join("forest_config");
    let mut manifest = BufWriter::new(std::fs::File::create(manifest_path)?);
    writeln!(manifest, "num_trees: {}", forest.config.num_trees)?;
    writeln!(manifest, "max_depth: {}", forest.config.max_depth)?;
    writeln!(manifest, "min_samples_split: {}", forest.config.min_samples_split)?;
    writeln!(manifest, "max_features: {}", max_features_to_string(forest.config.max_features))?;
    manifest.flush()?;

    for (i, tree) in forest.trees.iter().enumerate() {
        let tree_path = dir.join(format!("random_tree_{i}.bin"));
        let mut writer = BufWriter::new(std::fs::File::create(tree_path)?);
        write_node(&mut writer, &tree.root)?;
        writer.flush()?;
    }
    Ok(())
}

fn parse_manifest(contents: &str) -> Result<ForestConfig> {
    let mut num_trees = None;
    let mut max_depth = None;
    let mut min_samples_split = None;
    let mut max_features = None;

    for line in contents.lines() {
        let Some((key, value)) = line.split_once(':') else { continue };
        let value = value.trim();
        match key.trim() {
            "num_trees" => num_trees = value.parse::<i64>().ok(),
            "max_depth" => max_depth = value.parse::<i64>().ok(),
            "min_samples_split" => min_samples_split = value.parse::<i64>().ok(),
            "max_features" => max_features = Some(value.to_string()),
            _ => {} // unknown keys ignored, matching §6's flag tolerance
        }
    }

    let num_trees = num_trees.ok_or_else(|| Error::MalformedManifest("missing num_trees".into()))?;
    let max_depth = max_depth.ok_or_else(|| Error::MalformedManifest("missing max_depth".into()))?;
    let min_samples_split = min_samples_split.ok_or_else(|| Error::MalformedManifest("missing min_samples_split".into()))?;
    let max_features = max_features.ok_or_else(|| Error::MalformedManifest("missing max_features".into()))?;

    Ok(ForestConfig::validate(num_trees, max_depth, min_samples_split, &max_features)?)
}

/// Reads a forest directory written by `write_forest`.
pub fn read_forest(dir: impl AsRef<Path>) -> Result<Forest> {
    let dir = dir.as_ref();
    let manifest_contents = std::fs::read_to_string(dir.join("forest_config"))?;
    let config = parse_manifest(&manifest_contents)?;

    let mut trees = Vec::with_capacity(config.num_trees);
    for i in 0..config.num_trees {
        let tree_path = dir.join(format!("random_tree_{i}.bin"));
        let mut reader = BufReader::new(std::fs::File::open(tree_path)?);
        let root = read_node(&mut reader)?;
        trees.push(Tree { root });
    }

    Ok(Forest { config, trees })
}

#[cfg(test)]
mod tests {
    use super::*;
    use forest_core::types::Node;

    fn sample_forest() -> Forest {
        let config = ForestConfig::validate(2, 5, 2, "sqrt").unwrap();
        let mut forest = Forest::new(config);
        forest.trees.push(Tree {
            root: Node::leaf(0, 0, 0.0, 4),
        });
        forest.trees.push(Tree {
            root: Node {
                feature: 0,
                threshold: 1.5,
                pred: 1,
                entropy: 0.5,
                depth: 0,
                num_samples: 8,
                left: Some(Box::new(Node::leaf(0, 1, 0.0, 4))),
                right: Some(Box::new(Node::leaf(1, 1, 0.0, 4))),
            },
        });
        forest
    }

    #[test]
    fn s4_forest_round_trips_through_disk() {
        let forest = sample_forest();
        let dir = tempfile::tempdir().unwrap();
        write_forest(dir.path(), &forest).unwrap();

        assert!(dir.path().join("forest_config").exists());
        assert!(dir.path().join("random_tree_0.bin").exists());
        assert!(dir.path().join("random_tree_1.bin").exists());

        let loaded = read_forest(dir.path()).unwrap();
        assert_eq!(loaded.config.num_trees, 2);
        assert_eq!(loaded.config.max_depth, 5);
        assert_eq!(loaded.trees.len(), 2);
        assert_eq!(loaded.trees[1].root.feature, 0);
        assert_eq!(loaded.trees[1].root.left.as_ref().unwrap().pred, 0);
    }

    #[test]
    fn manifest_ignores_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("forest_config"),
            "num_trees: 1\nmax_depth: 3\nmin_samples_split: 2\nmax_features: log2\nunknown_key: whatever\n",
        )
        .unwrap();
        let mut writer = BufWriter::new(std::fs::File::create(dir.path().join("random_tree_0.bin")).unwrap());
        write_node(&mut writer, &Node::leaf(1, 0, 0.0, 5)).unwrap();
        writer.flush().unwrap();

        let loaded = read_forest(dir.path()).unwrap();
        assert_eq!(loaded.trees.len(), 1);
        assert_eq!(loaded.trees[0].root.pred, 1);
    }
}
