//! Selection, crossover and mutation operators

use rand::Rng;

use super::Individual;

/// Tournament selection: best of `size` individuals drawn with replacement
pub fn tournament<'p, R: Rng + ?Sized>(
    individuals: &'p [Individual],
    size: usize,
    rng: &mut R,
) -> &'p Individual {
    let mut best = &individuals[rng.gen_range(0..individuals.len())];
    for _ in 1..size {
        let challenger = &individuals[rng.gen_range(0..individuals.len())];
        if challenger.fitness > best.fitness {
            best = challenger;
        }
    }
    best
}

/// Arithmetic crossover `λ·a + (1-λ)·b` with a single λ for the whole
/// vector, so the child's total spend equals the parents'
pub fn blend_crossover<R: Rng + ?Sized>(a: &[f64], b: &[f64], rng: &mut R) -> Vec<f64> {
    let lambda: f64 = rng.gen();
    a.iter()
        .zip(b)
        .map(|(x, y)| lambda * x + (1.0 - lambda) * y)
        .collect()
}

/// Uniform perturbation of each gene with probability `rate`, sized as
/// `scale` times the channel's feasible range
///
/// Returns the number of genes touched. The result usually needs repair.
pub fn mutate<R: Rng + ?Sized>(
    genes: &mut [f64],
    rate: f64,
    scale: f64,
    lower: &[f64],
    upper: &[f64],
    rng: &mut R,
) -> usize {
    let mut touched = 0;
    for ((gene, lo), hi) in genes.iter_mut().zip(lower).zip(upper) {
        let range = hi - lo;
        if range <= 0.0 || rng.gen::<f64>() >= rate {
            continue;
        }
        *gene += rng.gen_range(-1.0..=1.0) * scale * range;
        touched += 1;
    }
    touched
}
