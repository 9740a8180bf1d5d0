//! Portable pre-order tree serializer (spec.md §4.8). Host byte order
//! is used throughout, matching the source's behavior; cross-architecture
//! transport is explicitly out of scope (spec.md §4.8 "Endianness").

use crate::error::{Error, Result};
use crate::types::Node;
use std::io::{Read, Write};

fn write_i32<W: Write>(w: &mut W, v: i32) -> Result<()> {
    w.write_all(&v.to_ne_bytes())?;
    Ok(())
}

fn write_f32<W: Write>(w: &mut W, v: f32) -> Result<()> {
    w.write_all(&v.to_ne_bytes())?;
    Ok(())
}

fn read_i32<R: Read>(r: &mut R) -> Result<i32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)
        .map_err(|_| Error::CorruptSerialization("truncated i32 field".into()))?;
    Ok(i32::from_ne_bytes(buf))
}

fn read_f32<R: Read>(r: &mut R) -> Result<f32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)
        .map_err(|_| Error::CorruptSerialization("truncated f32 field".into()))?;
    Ok(f32::from_ne_bytes(buf))
}

/// Writes one node, recursing pre-order into any children.
pub fn write_node<W: Write>(w: &mut W, node: &Node) -> Result<()> {
    write_i32(w, node.feature)?;
    write_f32(w, node.threshold)?;
    write_i32(w, node.pred)?;
    write_f32(w, node.entropy)?;
    write_i32(w, node.depth as i32)?;
    write_i32(w, node.num_samples as i32)?;
    write_i32(w, node.left.is_some() as i32)?;
    write_i32(w, node.right.is_some() as i32)?;
    if let Some(left) = &node.left {
        write_node(w, left)?;
    }
    if let Some(right) = &node.right {
        write_node(w, right)?;
    }
    Ok(())
}

/// Reads one node, recursing pre-order into any children.
pub fn read_node<R: Read>(r: &mut R) -> Result<Node> {
    let feature = read_i32(r)?;
    let threshold = read_f32(r)?;
    let pred = read_i32(r)?;
    let entropy = read_f32(r)?;
    let depth = read_i32(r)?;
    let num_samples = read_i32(r)?;
    let has_left = read_i32(r)?;
    let has_right = read_i32(r)?;

    if depth < 0 || num_samples < 0 {
        return Err(Error::CorruptSerialization("negative depth or num_samples".into()));
    }

    let left = if has_left != 0 { Some(Box::new(read_node(r)?)) } else { None };
    let right = if has_right != 0 { Some(Box::new(read_node(r)?)) } else { None };

    Ok(Node {
        feature,
        threshold,
        left,
        right,
        pred,
        entropy,
        depth: depth as usize,
        num_samples: num_samples as usize,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Tree;

    fn sample_tree() -> Tree {
        Tree {
            root: Node {
                feature: 0,
                threshold: 3.5,
                pred: 0,
                entropy: 0.0,
                depth: 0,
                num_samples: 8,
                left: Some(Box::new(Node::leaf(0, 1, 0.0, 4))),
                right: Some(Box::new(Node::leaf(1, 1, 0.0, 4))),
            },
        }
    }

    #[test]
    fn s4_round_trip_preserves_structure_and_predictions() {
        let tree = sample_tree();
        let mut buf = Vec::new();
        write_node(&mut buf, &tree.root).unwrap();
        let decoded = read_node(&mut buf.as_slice()).unwrap();

        assert_eq!(decoded.feature, tree.root.feature);
        assert_eq!(decoded.threshold, tree.root.threshold);
        assert_eq!(decoded.num_samples, tree.root.num_samples);
        assert_eq!(decoded.left.as_ref().unwrap().pred, 0);
        assert_eq!(decoded.right.as_ref().unwrap().pred, 1);
        assert!(decoded.left.as_ref().unwrap().is_leaf());
        assert!(decoded.right.as_ref().unwrap().is_leaf());
    }

    #[test]
    fn truncated_buffer_is_rejected() {
        let tree = sample_tree();
        let mut buf = Vec::new();
        write_node(&mut buf, &tree.root).unwrap();
        buf.truncate(buf.len() - 2);
        assert!(read_node(&mut buf.as_slice()).is_err());
    }

    #[test]
    fn single_leaf_round_trips() {
        let leaf = Node::leaf(2, 0, 1.5, 10);
        let mut buf = Vec::new();
        write_node(&mut buf, &leaf).unwrap();
        let decoded = read_node(&mut buf.as_slice()).unwrap();
        assert!(decoded.is_leaf());
        assert_eq!(decoded.pred, 2);
        assert_eq!(decoded.entropy, 1.5);
        assert_eq!(decoded.num_samples, 10);
    }

    proptest::proptest! {
        #![proptest_config(proptest::prelude::ProptestConfig::with_cases(48))]

        /// Property 3 (spec.md §8): `deserialize(serialize(T))` predicts
        /// identically to `T` on every row, for trees grown from
        /// arbitrary small datasets (not just the hand-built fixture above).
        #[test]
        fn prop_round_trip_preserves_predictions(
            rows in 4usize..50,
            num_classes in 2usize..4,
            max_depth in 1usize..6,
            seed in proptest::prelude::any::<u64>(),
            salt in 0usize..13,
        ) {
            use crate::tree::grow_tree;
            use crate::types::{Dataset, ForestConfig, MaxFeatures};
            use ndarray::Array2;

            let num_features = 3;
            let mut arr = Array2::<f32>::zeros((rows, num_features + 1));
            for i in 0..rows {
                for f in 0..num_features {
                    arr[[i, f]] = ((i * (f + 2) + salt) % 11) as f32;
                }
                arr[[i, num_features]] = (i % num_classes) as f32;
            }
            let dataset = Dataset::from_array(arr).unwrap();
            let config = ForestConfig {
                num_trees: 1,
                max_depth,
                min_samples_split: 2,
                max_features: MaxFeatures::Sqrt,
            };
            let tree = grow_tree(&dataset, num_classes, &config, seed, None);

            let mut buf = Vec::new();
            write_node(&mut buf, &tree.root).unwrap();
            let decoded = Tree { root: read_node(&mut buf.as_slice()).unwrap() };

            let expected = tree.predict(dataset.features());
            let actual = decoded.predict(dataset.features());
            proptest::prop_assert_eq!(expected, actual);
        }
    }
}
