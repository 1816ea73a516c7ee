//! Short identifiers used to rename packaged files.
//!
//! [`generate`] is the stateless, clock-seeded generator: fast, but two calls
//! within the same clock tick can collide. [`IdentifierGenerator`] is what a
//! run uses: it mixes a monotonic counter into every seed and rejects any
//! token it has already issued, so identifiers are unique within a run.

use chrono::Utc;
use std::collections::HashSet;

/// Default token length for generated identifiers.
pub const DEFAULT_IDENTIFIER_LENGTH: usize = 10;

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

// 36^12 < 2^64, so one mixed word yields 12 base-36 digits.
const DIGITS_PER_WORD: usize = 12;

/// Consecutive collisions tolerated before tokens grow by one character.
const MAX_DRAWS_PER_LENGTH: u32 = 64;

/// Generates a token of exactly `length` base-36 characters from the clock.
///
/// No uniqueness guarantee. Use [`IdentifierGenerator`] when identifiers
/// must not collide.
///
/// # Examples
///
/// ```
/// use vypack::identifier::generate;
///
/// let token = generate(8);
/// assert_eq!(token.len(), 8);
/// assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate(length: usize) -> String {
    token_from_seed(clock_seed(), length)
}

fn clock_seed() -> u64 {
    let now = Utc::now();
    now.timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros()) as u64
}

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn token_from_seed(seed: u64, length: usize) -> String {
    let mut state = seed;
    let mut token = String::with_capacity(length);

    while token.len() < length {
        let mut word = splitmix64(&mut state);
        for _ in 0..DIGITS_PER_WORD.min(length - token.len()) {
            token.push(ALPHABET[(word % 36) as usize] as char);
            word /= 36;
        }
    }

    token
}

/// Issues identifiers that are unique for the lifetime of the generator.
///
/// One generator is owned by the run coordinator; it is not shared between
/// tasks.
#[derive(Debug)]
pub struct IdentifierGenerator {
    length: usize,
    counter: u64,
    issued: HashSet<String>,
}

impl IdentifierGenerator {
    /// Creates a generator producing tokens of `length` characters (at least 1).
    pub fn new(length: usize) -> Self {
        Self {
            length: length.max(1),
            counter: 0,
            issued: HashSet::new(),
        }
    }

    /// Token length this generator produces.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Number of tokens issued so far.
    pub fn issued(&self) -> usize {
        self.issued.len()
    }

    /// Returns a token never returned before by this generator.
    ///
    /// When the token space at the current length is close to exhausted, the
    /// length grows by one character so the call always terminates.
    pub fn next_token(&mut self) -> String {
        let mut draws = 0;
        loop {
            self.counter += 1;
            let seed = clock_seed() ^ self.counter.rotate_left(32);
            let token = token_from_seed(seed, self.length);

            if self.issued.insert(token.clone()) {
                return token;
            }
            tracing::debug!("Identifier collision on {}, drawing again", token);

            draws += 1;
            if draws >= MAX_DRAWS_PER_LENGTH {
                self.length += 1;
                draws = 0;
                tracing::warn!(
                    "Identifier space nearly exhausted; tokens now {} characters",
                    self.length
                );
            }
        }
    }

    /// Returns a unique identifier for a file: the token plus its original extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use vypack::identifier::IdentifierGenerator;
    ///
    /// let mut ids = IdentifierGenerator::new(6);
    /// let id = ids.identifier_for("vym");
    /// assert!(id.ends_with(".vym"));
    /// assert_eq!(id.len(), 6 + ".vym".len());
    /// ```
    pub fn identifier_for(&mut self, extension: &str) -> String {
        format!("{}.{}", self.next_token(), extension)
    }
}

impl Default for IdentifierGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_IDENTIFIER_LENGTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_exact_length() {
        for length in [1, 5, 12, 13, 30] {
            assert_eq!(generate(length).len(), length);
        }
        assert_eq!(generate(0), "");
    }

    #[test]
    fn test_token_uses_base36_alphabet() {
        let token = token_from_seed(42, 64);
        assert!(token.bytes().all(|b| ALPHABET.contains(&b)));
    }

    #[test]
    fn test_token_is_deterministic_per_seed() {
        assert_eq!(token_from_seed(7, 10), token_from_seed(7, 10));
        assert_ne!(token_from_seed(7, 10), token_from_seed(8, 10));
    }

    #[test]
    fn test_generator_never_repeats() {
        let mut ids = IdentifierGenerator::new(6);
        let mut seen = HashSet::new();
        for _ in 0..5_000 {
            assert!(seen.insert(ids.next_token()));
        }
        assert_eq!(ids.issued(), 5_000);
    }

    #[test]
    fn test_exhausted_length_grows_instead_of_spinning() {
        // Only 36 one-character tokens exist; the 40 draws must still finish.
        let mut ids = IdentifierGenerator::new(1);
        let tokens: HashSet<_> = (0..40).map(|_| ids.next_token()).collect();
        assert_eq!(tokens.len(), 40);
        assert!(ids.length() > 1);
    }

    #[test]
    fn test_full_token_space_grows_length() {
        let mut ids = IdentifierGenerator::new(1);
        for &b in ALPHABET {
            ids.issued.insert((b as char).to_string());
        }

        let token = ids.next_token();

        assert_eq!(token.len(), 2);
        assert_eq!(ids.length(), 2);
    }

    #[test]
    fn test_zero_length_is_clamped() {
        let ids = IdentifierGenerator::new(0);
        assert_eq!(ids.length(), 1);
    }

    #[test]
    fn test_identifier_keeps_extension() {
        let mut ids = IdentifierGenerator::default();
        let id = ids.identifier_for("vymac");
        let (token, ext) = id.split_once('.').expect("identifier has an extension");
        assert_eq!(token.len(), DEFAULT_IDENTIFIER_LENGTH);
        assert_eq!(ext, "vymac");
    }
}
