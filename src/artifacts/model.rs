//! Trained regressors and their evaluation.
//!
//! Trees use the flat array layout of scikit-learn's `tree_` attribute:
//! node `i` is a leaf when `children_left[i] == -1`, otherwise samples with
//! `x[feature[i]] <= threshold[i]` go left. Inputs are rounded to `f32`
//! before that comparison, as scikit-learn does, since its thresholds are
//! midpoints between `f32` training values.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

const LEAF: i64 = -1;

pub trait Regressor: Send + Sync {
    fn kind(&self) -> &'static str;

    /// Input width, when the regressor itself can tell.
    fn n_features(&self) -> Option<usize>;

    fn predict(&self, features: &[f64]) -> Result<f64>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
}

impl RegressionTree {
    fn node_count(&self) -> usize {
        self.value.len()
    }

    fn validate(&self) -> std::result::Result<(), String> {
        let n = self.node_count();
        if n == 0 {
            return Err("tree has no nodes".to_string());
        }
        if [
            self.children_left.len(),
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
        ]
        .iter()
        .any(|len| *len != n)
        {
            return Err(format!("tree arrays must all have {n} entries"));
        }

        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF {
                continue;
            }
            let in_range = |child: i64| child > node as i64 && (child as usize) < n;
            if !in_range(left) || !in_range(right) {
                return Err(format!("node {node} has invalid children {left}/{right}"));
            }
            if self.feature[node] < 0 {
                return Err(format!("split node {node} has no feature"));
            }
        }
        Ok(())
    }

    /// Highest feature index used by any split, if any.
    fn max_feature(&self) -> Option<usize> {
        self.children_left
            .iter()
            .zip(&self.feature)
            .filter(|(left, _)| **left != LEAF)
            .map(|(_, feature)| *feature as usize)
            .max()
    }

    fn evaluate(&self, features: &[f64]) -> Result<f64> {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            let index = self.feature[node] as usize;
            let x = features.get(index).ok_or_else(|| {
                Error::inference(format!(
                    "split on feature {index} but only {} features given",
                    features.len()
                ))
            })?;
            // children always point forward, so this terminates
            node = if (*x as f32) as f64 <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        Ok(self.value[node])
    }
}

/// Random forest regressor: the mean of its trees' predictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forest {
    pub trees: Vec<RegressionTree>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub coefficients: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Model {
    RandomForest(Forest),
    DecisionTree(RegressionTree),
    Linear(LinearModel),
}

/// A serialized model together with the training metadata stored alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    #[serde(flatten)]
    pub model: Model,
    /// Column names the model was trained on, in order.
    #[serde(default)]
    pub feature_names_in: Option<Vec<String>>,
    #[serde(default)]
    pub n_features_in: Option<usize>,
}

impl ModelArtifact {
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Error::artifact("model", reason);

        match &self.model {
            Model::RandomForest(forest) => {
                if forest.trees.is_empty() {
                    return Err(invalid("random forest has no trees".to_string()));
                }
                for (i, tree) in forest.trees.iter().enumerate() {
                    tree.validate()
                        .map_err(|reason| invalid(format!("tree {i}: {reason}")))?;
                }
            }
            Model::DecisionTree(tree) => tree.validate().map_err(invalid)?,
            Model::Linear(linear) => {
                if linear.coefficients.is_empty() {
                    return Err(invalid("linear model has no coefficients".to_string()));
                }
            }
        }

        if let (Some(names), Some(width)) = (&self.feature_names_in, self.n_features()) {
            if names.len() != width {
                return Err(invalid(format!(
                    "feature_names_in has {} names but the model takes {} features",
                    names.len(),
                    width
                )));
            }
        }
        Ok(())
    }

    fn max_feature(&self) -> Option<usize> {
        match &self.model {
            Model::RandomForest(forest) => {
                forest.trees.iter().filter_map(|t| t.max_feature()).max()
            }
            Model::DecisionTree(tree) => tree.max_feature(),
            Model::Linear(linear) => linear.coefficients.len().checked_sub(1),
        }
    }

    /// Checks the model can consume vectors of `width` features.
    pub fn check_width(&self, width: usize) -> Result<()> {
        if let Some(expected) = self.n_features() {
            if expected != width {
                return Err(Error::artifact(
                    "model",
                    format!("model expects {expected} features, schema has {width}"),
                ));
            }
        }
        if let Some(max) = self.max_feature() {
            if max >= width {
                return Err(Error::artifact(
                    "model",
                    format!("model uses feature {max}, schema has {width}"),
                ));
            }
        }
        Ok(())
    }
}

impl Regressor for ModelArtifact {
    fn kind(&self) -> &'static str {
        match self.model {
            Model::RandomForest(_) => "random_forest",
            Model::DecisionTree(_) => "decision_tree",
            Model::Linear(_) => "linear",
        }
    }

    fn n_features(&self) -> Option<usize> {
        match &self.model {
            Model::Linear(linear) => Some(linear.coefficients.len()),
            _ => self
                .n_features_in
                .or_else(|| self.feature_names_in.as_ref().map(Vec::len)),
        }
    }

    fn predict(&self, features: &[f64]) -> Result<f64> {
        if let Some(width) = self.n_features() {
            if features.len() != width {
                return Err(Error::inference(format!(
                    "expected {width} features, got {}",
                    features.len()
                )));
            }
        }

        match &self.model {
            Model::RandomForest(forest) => {
                let mut total = 0.0;
                for tree in &forest.trees {
                    total += tree.evaluate(features)?;
                }
                Ok(total / forest.trees.len() as f64)
            }
            Model::DecisionTree(tree) => tree.evaluate(features),
            Model::Linear(linear) => Ok(linear
                .coefficients
                .iter()
                .zip(features)
                .map(|(w, x)| w * x)
                .sum::<f64>()
                + linear.intercept),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    /// x[0] <= 0.5 ? 10 : (x[1] <= 2 ? 20 : 30)
    fn create_test_tree() -> RegressionTree {
        RegressionTree {
            children_left: vec![1, -1, 3, -1, -1],
            children_right: vec![2, -1, 4, -1, -1],
            feature: vec![0, -2, 1, -2, -2],
            threshold: vec![0.5, -2.0, 2.0, -2.0, -2.0],
            value: vec![20.0, 10.0, 25.0, 20.0, 30.0],
        }
    }

    fn artifact(model: Model) -> ModelArtifact {
        ModelArtifact {
            model,
            feature_names_in: None,
            n_features_in: Some(2),
        }
    }

    #[test]
    fn test_tree_traversal() {
        let model = artifact(Model::DecisionTree(create_test_tree()));
        model.validate().unwrap();
        assert_eq!(model.predict(&[0.0, 9.0]).unwrap(), 10.0);
        assert_eq!(model.predict(&[0.5, 9.0]).unwrap(), 10.0);
        assert_eq!(model.predict(&[1.0, 2.0]).unwrap(), 20.0);
        assert_eq!(model.predict(&[1.0, 3.0]).unwrap(), 30.0);
    }

    #[test]
    fn test_split_compares_in_f32() {
        let tree = RegressionTree {
            children_left: vec![1, -1, -1],
            children_right: vec![2, -1, -1],
            feature: vec![0, -2, -2],
            threshold: vec![0.7f32 as f64, -2.0, -2.0],
            value: vec![15.0, 10.0, 20.0],
        };
        let model = ModelArtifact {
            model: Model::DecisionTree(tree),
            feature_names_in: None,
            n_features_in: Some(1),
        };
        // 0.7 is above the f64 threshold 0.699999988..., but equal to it once rounded to f32
        assert_eq!(model.predict(&[0.7]).unwrap(), 10.0);
        assert_eq!(model.predict(&[0.7000001]).unwrap(), 20.0);
    }

    #[test]
    fn test_forest_averages_trees() {
        let stump = RegressionTree {
            children_left: vec![-1],
            children_right: vec![-1],
            feature: vec![-2],
            threshold: vec![-2.0],
            value: vec![40.0],
        };
        let model = artifact(Model::RandomForest(Forest {
            trees: vec![create_test_tree(), stump],
        }));
        model.validate().unwrap();
        assert_eq!(model.predict(&[0.0, 0.0]).unwrap(), 25.0);
    }

    #[test]
    fn test_linear_model() {
        let model = ModelArtifact {
            model: Model::Linear(LinearModel {
                coefficients: vec![2.0, -1.0],
                intercept: 3.0,
            }),
            feature_names_in: None,
            n_features_in: None,
        };
        assert_eq!(model.n_features(), Some(2));
        assert_eq!(model.predict(&[5.0, 4.0]).unwrap(), 9.0);
    }

    #[test]
    fn test_predict_rejects_wrong_width() {
        let model = artifact(Model::DecisionTree(create_test_tree()));
        let err = model.predict(&[1.0]).unwrap_err();
        assert!(matches!(err, Error::Inference(_)));
    }

    #[test]
    fn test_validate_rejects_backward_children() {
        let mut tree = create_test_tree();
        tree.children_right[2] = 0;
        let model = artifact(Model::DecisionTree(tree));
        assert!(matches!(model.validate(), Err(Error::Artifact { .. })));
    }

    #[test]
    fn test_validate_rejects_empty_forest() {
        let model = artifact(Model::RandomForest(Forest { trees: vec![] }));
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_check_width() {
        let model = artifact(Model::DecisionTree(create_test_tree()));
        model.check_width(2).unwrap();
        assert!(model.check_width(3).is_err());

        let unsized_model = ModelArtifact {
            n_features_in: None,
            ..model
        };
        unsized_model.check_width(5).unwrap();
        assert!(unsized_model.check_width(1).is_err());
    }

    #[test]
    fn test_deserialize_tagged_model() {
        let model: ModelArtifact = serde_json::from_value(json!({
            "kind": "linear",
            "coefficients": [1.0, 1.0],
            "intercept": 0.5,
            "feature_names_in": ["bath", "balcony"]
        }))
        .unwrap();
        assert_eq!(model.kind(), "linear");
        assert_eq!(
            model.feature_names_in,
            Some(vec!["bath".to_string(), "balcony".to_string()])
        );
        model.validate().unwrap();
    }
}
