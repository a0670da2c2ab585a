//! Secret word selection

/// Built-in word list
const WORDS: [&str; 59] = [
    "apple",
    "banana",
    "car",
    "dog",
    "elephant",
    "flower",
    "giraffe",
    "house",
    "icecream",
    "jellyfish",
    "kite",
    "lion",
    "mountain",
    "notebook",
    "ocean",
    "penguin",
    "queen",
    "robot",
    "sun",
    "tree",
    "umbrella",
    "volcano",
    "whale",
    "xylophone",
    "yacht",
    "zebra",
    "airplane",
    "beach",
    "castle",
    "dragon",
    "eagle",
    "forest",
    "guitar",
    "helicopter",
    "island",
    "jungle",
    "kangaroo",
    "lighthouse",
    "moon",
    "ninja",
    "owl",
    "pirate",
    "rainbow",
    "shark",
    "tiger",
    "unicorn",
    "violin",
    "waterfall",
    "fox",
    "yeti",
    "zombie",
    "astronaut",
    "butterfly",
    "cactus",
    "dolphin",
    "egg",
    "firefighter",
    "ghost",
    "hamburger",
];

/// Source of secret words
#[derive(Debug, Clone, Copy)]
pub struct WordBank {
    words: &'static [&'static str],
}

impl Default for WordBank {
    fn default() -> Self {
        Self { words: &WORDS }
    }
}

impl WordBank {
    /// Picks a word uniformly at random
    pub fn pick(&self, rng: &mut fastrand::Rng) -> String {
        rng.choice(self.words.iter())
            .map(|word| (*word).to_owned())
            .unwrap_or_default()
    }

    /// Whether `word` is part of the bank
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word)
    }
}
