use rand::Rng;
use serde::{Deserialize, Serialize};

/// Layer dimensions of a controller network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkShape {
    pub input_size: usize,
    pub hidden_size: usize,
    pub hidden_layers: usize,
    pub output_size: usize,
}

impl NetworkShape {
    /// (inputs, outputs) of every layer, front to back.
    fn layer_dims(self) -> Vec<(usize, usize)> {
        let mut dims = Vec::with_capacity(self.hidden_layers + 1);
        let mut inputs = self.input_size;
        for _ in 0..self.hidden_layers {
            dims.push((inputs, self.hidden_size));
            inputs = self.hidden_size;
        }
        dims.push((inputs, self.output_size));
        dims
    }
}

/// One fully-connected layer. `weights` is indexed `[output][input]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub weights: Vec<Vec<f32>>,
    pub biases: Vec<f32>,
}

impl Layer {
    pub(crate) fn random<R>(rng: &mut R, inputs: usize, outputs: usize) -> Self
    where
        R: Rng + ?Sized,
    {
        let weights = (0..outputs)
            .map(|_| (0..inputs).map(|_| rng.random_range(-1.0..=1.0)).collect())
            .collect();
        let biases = (0..outputs).map(|_| rng.random_range(-1.0..=1.0)).collect();
        Self { weights, biases }
    }

    fn forward(&self, input: &[f32]) -> Vec<f32> {
        self.weights
            .iter()
            .zip(&self.biases)
            .map(|(row, bias)| {
                let sum = row.iter().zip(input).map(|(w, x)| w * x).sum::<f32>() + bias;
                sum.tanh()
            })
            .collect()
    }
}

/// A feed-forward tanh network.
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    pub(crate) layers: Vec<Layer>,
}

impl Network {
    pub(crate) fn random<R>(rng: &mut R, shape: NetworkShape) -> Self
    where
        R: Rng + ?Sized,
    {
        let layers = shape
            .layer_dims()
            .into_iter()
            .map(|(inputs, outputs)| Layer::random(rng, inputs, outputs))
            .collect();
        Self { layers }
    }

    pub(crate) fn forward(&self, observation: &[f32]) -> Vec<f32> {
        let mut activation = observation.to_vec();
        for layer in &self.layers {
            activation = layer.forward(&activation);
        }
        activation
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    const SHAPE: NetworkShape = NetworkShape {
        input_size: 3,
        hidden_size: 4,
        hidden_layers: 2,
        output_size: 2,
    };

    #[test]
    fn layer_dims_chain_hidden_layers() {
        assert_eq!(SHAPE.layer_dims(), vec![(3, 4), (4, 4), (4, 2)]);
    }

    #[test]
    fn forward_produces_output_size_in_tanh_range() {
        let mut rng = Pcg32::seed_from_u64(7);
        let network = Network::random(&mut rng, SHAPE);
        let output = network.forward(&[0.5, -0.25, 1.0]);
        assert_eq!(output.len(), 2);
        assert!(output.iter().all(|a| (-1.0..=1.0).contains(a)));
    }

    #[test]
    fn zero_bias_free_input_keeps_tanh_of_zero() {
        let layer = Layer {
            weights: vec![vec![1.0, -1.0]],
            biases: vec![0.0],
        };
        assert_eq!(layer.forward(&[0.0, 0.0]), vec![0.0]);
    }
}
