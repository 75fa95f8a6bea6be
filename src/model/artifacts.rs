//! Inference primitives deserialized from the training pipeline's exported
//! JSON artifacts: standardization, tree ensembles, logistic regression.

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Binary classifier exposing the positive-class probability.
pub trait ProbabilityModel: Send + Sync {
    fn name(&self) -> &str;
    fn predict_proba(&self, input: ArrayView1<'_, f64>) -> Result<f64, EngineError>;
}

/// Mean/scale standardization fitted by the training pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Identity scaler: passes an n-dim input through unchanged.
    pub fn identity(dim: usize) -> Self {
        Self {
            mean: vec![0.0; dim],
            scale: vec![1.0; dim],
        }
    }

    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    pub fn transform(&self, input: ArrayView1<'_, f64>) -> Result<Array1<f64>, EngineError> {
        if input.len() != self.mean.len() || input.len() != self.scale.len() {
            return Err(EngineError::Inference(format!(
                "scaler expects {} features, got {}",
                self.mean.len(),
                input.len()
            )));
        }
        Ok(Array1::from_iter(input.iter().enumerate().map(|(i, v)| {
            let s = self.scale[i];
            if s.abs() < f64::EPSILON {
                0.0
            } else {
                (v - self.mean[i]) / s
            }
        })))
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Logistic regression classifier. Serves as the meta-learner over the
/// 2-dim base-probability space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticModel {
    pub name: String,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl ProbabilityModel for LogisticModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict_proba(&self, input: ArrayView1<'_, f64>) -> Result<f64, EngineError> {
        if input.len() != self.coefficients.len() {
            return Err(EngineError::Inference(format!(
                "{} expects {} features, got {}",
                self.name,
                self.coefficients.len(),
                input.len()
            )));
        }
        let z = self.intercept
            + input
                .iter()
                .zip(&self.coefficients)
                .map(|(x, w)| x * w)
                .sum::<f64>();
        Ok(sigmoid(z))
    }
}

/// Flattened decision-tree node. `left < 0` marks a leaf; `value` is then
/// the positive-class probability (averaged kind) or the raw margin
/// (boosted kind).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNode {
    pub feature: usize,
    pub threshold: f64,
    pub left: i32,
    pub right: i32,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

impl Tree {
    fn evaluate(&self, input: ArrayView1<'_, f64>) -> Result<f64, EngineError> {
        let mut idx = 0usize;
        // A walk longer than the node count means a malformed tree.
        for _ in 0..=self.nodes.len() {
            let node = self.nodes.get(idx).ok_or_else(|| {
                EngineError::Inference(format!("tree node index {} out of range", idx))
            })?;
            if node.left < 0 {
                return Ok(node.value);
            }
            let x = input.get(node.feature).copied().ok_or_else(|| {
                EngineError::Inference(format!(
                    "tree references feature {} beyond input",
                    node.feature
                ))
            })?;
            idx = if x <= node.threshold {
                node.left as usize
            } else {
                node.right as usize
            };
        }
        Err(EngineError::Inference("tree walk exceeded node count".into()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnsembleKind {
    /// Random-forest style: leaves hold probabilities, trees are averaged
    Averaged,
    /// Gradient-boosted style: leaves hold margins, summed with `base_score`
    /// and squashed through a sigmoid
    Boosted,
}

/// Tree-ensemble classifier; the exported form of both base models.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEnsembleModel {
    pub name: String,
    pub kind: EnsembleKind,
    #[serde(default)]
    pub base_score: f64,
    pub trees: Vec<Tree>,
}

impl ProbabilityModel for TreeEnsembleModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict_proba(&self, input: ArrayView1<'_, f64>) -> Result<f64, EngineError> {
        if self.trees.is_empty() {
            return Err(EngineError::Inference(format!("{} has no trees", self.name)));
        }
        let mut acc = 0.0;
        for tree in &self.trees {
            acc += tree.evaluate(input)?;
        }
        let prob = match self.kind {
            EnsembleKind::Averaged => acc / self.trees.len() as f64,
            EnsembleKind::Boosted => sigmoid(self.base_score + acc),
        };
        Ok(prob.clamp(0.0, 1.0))
    }
}
