use crate::error::{Error, Result};
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

/// Dense `num_rows x num_columns` matrix of 32-bit features; the last
/// column holds the integer class label cast from float (spec.md §3).
#[derive(Debug, Clone)]
pub struct Dataset {
    data: Array2<f32>,
}

impl Dataset {
    pub fn from_array(data: Array2<f32>) -> Result<Self> {
        if data.ncols() < 2 {
            return Err(Error::DimensionMismatch {
                expected: 2,
                got: data.ncols(),
            });
        }
        Ok(Self { data })
    }

    pub fn num_rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn num_columns(&self) -> usize {
        self.data.ncols()
    }

    /// Number of feature columns, excluding the trailing label column.
    pub fn num_features(&self) -> usize {
        self.data.ncols() - 1
    }

    pub fn label_column(&self) -> usize {
        self.data.ncols() - 1
    }

    pub fn row(&self, i: usize) -> ArrayView1<'_, f32> {
        self.data.row(i)
    }

    pub fn label(&self, i: usize) -> i32 {
        self.data[[i, self.label_column()]].round() as i32
    }

    pub fn features(&self) -> ArrayView2<'_, f32> {
        self.data.slice(ndarray::s![.., ..self.label_column()])
    }

    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.data.view()
    }

    /// Infer `num_classes` as `max(label) + 1`, per spec.md §6.
    pub fn infer_num_classes(&self) -> usize {
        (0..self.num_rows())
            .map(|i| self.label(i))
            .max()
            .map(|m| (m + 1).max(0) as usize)
            .unwrap_or(0)
    }

    /// Builds a new dataset from a subset of rows, preserving order,
    /// as a deep copy (spec.md §9: row views passed across recursion
    /// must be owned copies).
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        let mut out = Array2::<f32>::zeros((indices.len(), self.num_columns()));
        for (dst, &src) in indices.iter().enumerate() {
            out.row_mut(dst).assign(&self.data.row(src));
        }
        Self { data: out }
    }

    pub fn into_array(self) -> Array2<f32> {
        self.data
    }

    pub fn concat_rows(parts: &[Dataset]) -> Self {
        let views: Vec<_> = parts.iter().map(|d| d.data.view()).collect();
        let data = ndarray::concatenate(Axis(0), &views).expect("consistent column counts");
        Self { data }
    }
}

/// Tagged variant of the `max_features` CLI string, parsed once at
/// configuration time (spec.md §9: "dynamic dispatch replaced by
/// tagged variants").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxFeatures {
    Sqrt,
    Log2,
    Fixed(usize),
}

impl MaxFeatures {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "sqrt" => Ok(MaxFeatures::Sqrt),
            "log2" => Ok(MaxFeatures::Log2),
            other => other
                .parse::<i64>()
                .ok()
                .filter(|n| *n > 0)
                .map(|n| MaxFeatures::Fixed(n as usize))
                .ok_or_else(|| Error::InvalidMaxFeatures(other.to_string())),
        }
    }

    /// Resolves `m`, the number of features to sample per split, given
    /// `num_features = F` (spec.md §4.2), clamped to `[1, F]`.
    pub fn resolve(&self, num_features: usize) -> usize {
        let raw = match self {
            MaxFeatures::Sqrt => (num_features as f64).sqrt().floor() as usize,
            MaxFeatures::Log2 => (num_features as f64).log2().floor() as usize,
            MaxFeatures::Fixed(n) => *n,
        };
        raw.clamp(1, num_features.max(1))
    }
}

/// Configuration shared by every tree in a forest (spec.md §3 `Forest`).
#[derive(Debug, Clone)]
pub struct ForestConfig {
    pub num_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub max_features: MaxFeatures,
}

impl ForestConfig {
    pub fn validate(
        num_trees: i64,
        max_depth: i64,
        min_samples_split: i64,
        max_features: &str,
    ) -> Result<Self> {
        if num_trees <= 0 {
            return Err(Error::InvalidTreeCount(num_trees));
        }
        if min_samples_split < 2 {
            return Err(Error::InvalidMinSamplesSplit(min_samples_split));
        }
        if max_depth < 0 {
            return Err(Error::InvalidMaxDepth(max_depth));
        }
        Ok(Self {
            num_trees: num_trees as usize,
            max_depth: max_depth as usize,
            min_samples_split: min_samples_split as usize,
            max_features: MaxFeatures::parse(max_features)?,
        })
    }
}

/// Outcome of one node-expansion attempt (spec.md §3 `BestSplit`).
#[derive(Debug, Clone, Copy)]
pub struct BestSplit {
    pub entropy: f64,
    pub threshold: f32,
    pub feature_index: usize,
    pub left_size: usize,
    pub right_size: usize,
    pub left_pred: i32,
    pub right_pred: i32,
}

/// A node in the decision tree arena. Leaves have `left == right ==
/// None`; internal nodes always have both children present
/// (spec.md §3 invariants).
#[derive(Debug, Clone)]
pub struct Node {
    /// `-1` for leaves, the split feature index for internal nodes.
    pub feature: i32,
    pub threshold: f32,
    pub left: Option<Box<Node>>,
    pub right: Option<Box<Node>>,
    pub pred: i32,
    pub entropy: f32,
    pub depth: usize,
    pub num_samples: usize,
}

impl Node {
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    pub fn leaf(pred: i32, depth: usize, entropy: f32, num_samples: usize) -> Self {
        Self {
            feature: -1,
            threshold: 0.0,
            left: None,
            right: None,
            pred,
            entropy,
            depth,
            num_samples,
        }
    }
}

/// A single owning reference to a root `Node` (spec.md §3 `Tree`).
#[derive(Debug, Clone)]
pub struct Tree {
    pub root: Node,
}

impl Tree {
    /// Walks the tree following the `≤` tie-break rule of spec.md §3.
    pub fn predict_row(&self, row: ArrayView1<f32>) -> i32 {
        let mut node = &self.root;
        while let (Some(left), Some(right)) = (node.left.as_ref(), node.right.as_ref()) {
            if row[node.feature as usize] <= node.threshold {
                node = left;
            } else {
                node = right;
            }
        }
        node.pred
    }

    pub fn predict(&self, features: ArrayView2<f32>) -> Vec<i32> {
        features.outer_iter().map(|r| self.predict_row(r)).collect()
    }

    pub fn depth(&self) -> usize {
        fn rec(n: &Node) -> usize {
            match (&n.left, &n.right) {
                (Some(l), Some(r)) => 1 + rec(l).max(rec(r)),
                _ => 0,
            }
        }
        rec(&self.root)
    }

    pub fn node_count(&self) -> usize {
        fn rec(n: &Node) -> usize {
            1 + n.left.as_ref().map_or(0, |c| rec(c)) + n.right.as_ref().map_or(0, |c| rec(c))
        }
        rec(&self.root)
    }
}

/// A trained ensemble (spec.md §3 `Forest`).
#[derive(Debug, Clone)]
pub struct Forest {
    pub config: ForestConfig,
    pub trees: Vec<Tree>,
}

impl Forest {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
        }
    }
}
