// Offline joke catalog. Bundled with the binary so the game always has something
// to say when the network (or chaos mode) lets us down.

use rand::Rng;

use crate::joke::Joke;

pub const OFFLINE_JOKES: [&str; 10] = [
    "Why did the teddy bear say no to dessert? Because it was stuffed!",
    "What do you call a sleeping bull? A bulldozer!",
    "Why did the banana go to the doctor? It wasn't peeling well.",
    "What do you call a boomerang that doesn't come back? A stick!",
    "Why did the cookie go to the nurse? It felt crummy.",
    "Why did the student eat his homework? Because the teacher said it was a piece of cake!",
    "How do you make a lemon drop? Just let it fall.",
    "Why did the bicycle fall over? It was two-tired!",
    "Why don't eggs tell jokes? They'd crack each other up!",
    "What do you call cheese that isn't yours? Nacho cheese!",
];

/// Fixed, ordered list of known-safe jokes. The array type guarantees at least one
/// entry, so picking never fails.
#[derive(Clone, Copy, Debug)]
pub struct OfflineCatalog {
    jokes: &'static [&'static str; 10],
}

impl Default for OfflineCatalog {
    fn default() -> Self {
        Self { jokes: &OFFLINE_JOKES }
    }
}

impl OfflineCatalog {
    pub fn jokes(&self) -> &'static [&'static str] {
        self.jokes
    }

    pub fn len(&self) -> usize {
        self.jokes.len()
    }

    // Always false; kept for clippy's len_without_is_empty.
    pub fn is_empty(&self) -> bool {
        self.jokes.is_empty()
    }

    pub fn contains(&self, text: &str) -> bool {
        self.jokes.iter().any(|j| *j == text)
    }

    /// Uniform random pick.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Joke {
        let idx = rng.gen_range(0..self.jokes.len());
        Joke::offline(self.jokes[idx])
    }
}
