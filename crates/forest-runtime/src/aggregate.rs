//! Per-row majority vote across every tree from every process
//! (spec.md §4.7).

use crate::comm::LocalPredictions;

fn argmax_votes(votes: &[u32]) -> i32 {
    votes
        .iter()
        .enumerate()
        .max_by(|(ia, a), (ib, b)| a.cmp(b).then(ib.cmp(ia)))
        .map(|(i, _)| i as i32)
        .unwrap_or(0)
}

/// `gathered` holds one `LocalPredictions` per process (ragged: each
/// process may have a different tree count), every inner vec aligned
/// to the same `test_size` rows. Out-of-range predicted labels are
/// ignored rather than treated as errors (spec.md §7).
pub fn aggregate_predictions(gathered: &[LocalPredictions], num_classes: usize, test_size: usize) -> Vec<i32> {
    let mut out = Vec::with_capacity(test_size);
    for i in 0..test_size {
        let mut votes = vec![0u32; num_classes];
        for process in gathered {
            for tree_preds in &process.tree_predictions {
                let label = tree_preds[i];
                if label >= 0 && (label as usize) < num_classes {
                    votes[label as usize] += 1;
                }
            }
        }
        out.push(argmax_votes(&votes));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn majority_vote_breaks_ties_on_smaller_class() {
        let gathered = vec![
            LocalPredictions {
                rank: 0,
                tree_predictions: vec![vec![0], vec![1]],
            },
            LocalPredictions {
                rank: 1,
                tree_predictions: vec![vec![1], vec![0]],
            },
        ];
        let out = aggregate_predictions(&gathered, 2, 1);
        assert_eq!(out, vec![0]);
    }

    #[test]
    fn clear_majority_wins_across_processes() {
        let gathered = vec![
            LocalPredictions {
                rank: 0,
                tree_predictions: vec![vec![2, 0], vec![2, 1]],
            },
            LocalPredictions {
                rank: 1,
                tree_predictions: vec![vec![2, 0]],
            },
        ];
        let out = aggregate_predictions(&gathered, 3, 2);
        assert_eq!(out, vec![2, 0]);
    }

    #[test]
    fn out_of_range_labels_are_ignored() {
        let gathered = vec![LocalPredictions {
            rank: 0,
            tree_predictions: vec![vec![99], vec![1]],
        }];
        let out = aggregate_predictions(&gathered, 2, 1);
        assert_eq!(out, vec![1]);
    }
}
