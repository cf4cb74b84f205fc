/// A running episode instance bound to one genome.
///
/// Trials are long-lived: the pool reuses the same instance across genomes
/// and generations, with [`Trial::reset`] returning it to its initial state
/// before every new binding.
pub trait Trial {
    /// Whether the episode has ended (goal reached, time limit hit, or
    /// stopped by the scheduler).
    fn is_finished(&self) -> bool;

    /// Current sensor readout. The scheduler projects this through the
    /// configured observation-index list before inference.
    fn observation(&self) -> Vec<f32>;

    /// Applies one control step. Components are pre-clamped to `[-1, 1]` by
    /// the scheduler; components beyond the trial's control surface are
    /// ignored.
    fn apply_action(&mut self, action: &[f32]);

    /// Final reward of the episode. Only meaningful once finished.
    fn final_reward(&self) -> f32;

    /// Returns the trial to its initial state.
    fn reset(&mut self);

    /// Deactivates the episode after its reward has been read.
    fn stop(&mut self);
}
