// src/utils/random.rs
//
// All randomness used by the exam composer goes through these helpers.
// Callers pass the RNG in, so tests can seed a `StdRng` and get
// deterministic compositions. Sources need not be cryptographically
// strong, only statistically uniform.

use rand::Rng;
use rand::seq::SliceRandom;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub const EXAM_CODE_LEN: usize = 8;

/// Generates a short, human-shareable exam code:
/// 8 uppercase alphanumeric characters.
pub fn generate_exam_code(rng: &mut impl Rng) -> String {
    (0..EXAM_CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Draws up to `count` items uniformly at random, without replacement.
///
/// If fewer than `count` items exist, everything available is returned
/// (tolerated by the composer, not an error).
pub fn sample_without_replacement<T: Clone>(items: &[T], count: usize, rng: &mut impl Rng) -> Vec<T> {
    items.choose_multiple(rng, count).cloned().collect()
}

/// Produces the stored answer-order string for one exam question:
/// a comma-joined uniform random permutation of the question's answer codes.
pub fn shuffled_answer_order(codes: &[String], rng: &mut impl Rng) -> String {
    let mut order: Vec<&str> = codes.iter().map(String::as_str).collect();
    order.shuffle(rng);
    order.join(",")
}
