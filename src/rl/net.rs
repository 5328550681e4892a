//! Small dense networks for the actor and critic
//!
//! Two layers, ReLU hidden, sigmoid or linear output. Backprop is written
//! out per sample; at these sizes (dozens of units) there is nothing to gain
//! from batching the linear algebra.

use ndarray::{Array1, Array2, ArrayView1};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputActivation {
    /// Bounded outputs in (0, 1) - the actor's action components
    Sigmoid,
    /// Unbounded output - the critic's value estimate
    Linear,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mlp {
    w1: Array2<f32>,
    b1: Array1<f32>,
    w2: Array2<f32>,
    b2: Array1<f32>,
    output: OutputActivation,
}

/// Per-parameter gradients from one backward pass, plus the gradient with
/// respect to the input for chaining through a downstream network.
pub struct Gradients {
    pub w1: Array2<f32>,
    pub b1: Array1<f32>,
    pub w2: Array2<f32>,
    pub b2: Array1<f32>,
    pub input: Array1<f32>,
}

fn relu(v: f32) -> f32 {
    v.max(0.0)
}

fn sigmoid(v: f32) -> f32 {
    1.0 / (1.0 + (-v).exp())
}

fn outer(a: &Array1<f32>, b: &Array1<f32>) -> Array2<f32> {
    Array2::from_shape_fn((a.len(), b.len()), |(i, j)| a[i] * b[j])
}

impl Mlp {
    pub fn new<R: Rng>(
        input_dim: usize,
        hidden_dim: usize,
        output_dim: usize,
        output: OutputActivation,
        rng: &mut R,
    ) -> Self {
        let s1 = (1.0 / input_dim.max(1) as f32).sqrt();
        let s2 = (1.0 / hidden_dim.max(1) as f32).sqrt();
        Self {
            w1: Array2::from_shape_fn((hidden_dim, input_dim), |_| rng.gen_range(-s1..s1)),
            b1: Array1::zeros(hidden_dim),
            w2: Array2::from_shape_fn((output_dim, hidden_dim), |_| rng.gen_range(-s2..s2)),
            b2: Array1::zeros(output_dim),
            output,
        }
    }

    pub fn input_dim(&self) -> usize {
        self.w1.ncols()
    }

    pub fn output_dim(&self) -> usize {
        self.w2.nrows()
    }

    pub fn forward(&self, x: ArrayView1<f32>) -> Array1<f32> {
        let h = (self.w1.dot(&x) + &self.b1).mapv(relu);
        let z = self.w2.dot(&h) + &self.b2;
        match self.output {
            OutputActivation::Sigmoid => z.mapv(sigmoid),
            OutputActivation::Linear => z,
        }
    }

    /// One backward pass for the sample `x` given the loss gradient at the
    /// output. Recomputes the forward activations internally.
    pub fn backward(&self, x: ArrayView1<f32>, dl_dy: ArrayView1<f32>) -> Gradients {
        let pre = self.w1.dot(&x) + &self.b1;
        let h = pre.mapv(relu);
        let z = self.w2.dot(&h) + &self.b2;

        let dl_dz: Array1<f32> = match self.output {
            OutputActivation::Sigmoid => {
                let y = z.mapv(sigmoid);
                Array1::from_iter(
                    dl_dy
                        .iter()
                        .zip(y.iter())
                        .map(|(g, y)| g * y * (1.0 - y)),
                )
            }
            OutputActivation::Linear => dl_dy.to_owned(),
        };

        let dl_dh = self.w2.t().dot(&dl_dz);
        let dl_dpre = Array1::from_iter(
            dl_dh
                .iter()
                .zip(pre.iter())
                .map(|(g, p)| if *p > 0.0 { *g } else { 0.0 }),
        );

        Gradients {
            w2: outer(&dl_dz, &h),
            b2: dl_dz,
            w1: outer(&dl_dpre, &x.to_owned()),
            input: self.w1.t().dot(&dl_dpre),
            b1: dl_dpre,
        }
    }

    /// Gradient-descent step
    pub fn apply(&mut self, grads: &Gradients, learning_rate: f32) {
        self.w1.scaled_add(-learning_rate, &grads.w1);
        self.b1.scaled_add(-learning_rate, &grads.b1);
        self.w2.scaled_add(-learning_rate, &grads.w2);
        self.b2.scaled_add(-learning_rate, &grads.b2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_sigmoid_output_bounded() {
        let mut rng = StdRng::seed_from_u64(11);
        let net = Mlp::new(4, 16, 5, OutputActivation::Sigmoid, &mut rng);
        let x = Array1::from(vec![0.2, 0.9, -0.4, 0.0]);
        let y = net.forward(x.view());
        assert_eq!(y.len(), 5);
        assert!(y.iter().all(|v| *v > 0.0 && *v < 1.0));
    }

    #[test]
    fn test_regression_loss_decreases() {
        // Fit a single target; the MSE must fall under plain SGD
        let mut rng = StdRng::seed_from_u64(11);
        let mut net = Mlp::new(3, 16, 1, OutputActivation::Linear, &mut rng);
        let x = Array1::from(vec![0.4, 0.6, 0.2]);
        let target = 0.8f32;

        let initial = (net.forward(x.view())[0] - target).powi(2);
        for _ in 0..200 {
            let y = net.forward(x.view());
            let dl_dy = Array1::from(vec![y[0] - target]);
            let grads = net.backward(x.view(), dl_dy.view());
            net.apply(&grads, 0.05);
        }
        let trained = (net.forward(x.view())[0] - target).powi(2);
        assert!(trained < initial);
        assert!(trained < 1e-3);
    }

    #[test]
    fn test_input_gradient_dimension() {
        let mut rng = StdRng::seed_from_u64(11);
        let net = Mlp::new(9, 32, 1, OutputActivation::Linear, &mut rng);
        let x = Array1::from(vec![0.5; 9]);
        let grads = net.backward(x.view(), Array1::from(vec![1.0]).view());
        assert_eq!(grads.input.len(), 9);
        assert_eq!(grads.w1.dim(), (32, 9));
    }
}
