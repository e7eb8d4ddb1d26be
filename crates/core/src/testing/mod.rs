//! Testing utilities and mock implementations.
//!
//! This module provides an in-memory algorithm repository and a manual clock,
//! allowing handler and selector tests without a real document store.
//!
//! # Example
//!
//! ```rust,ignore
//! use cubealg_core::testing::{fixtures, ManualClock, MockAlgorithmRepository};
//!
//! let repo = MockAlgorithmRepository::with_algorithms(fixtures::catalog());
//! let clock = ManualClock::starting_now();
//!
//! // Push selectors past their refresh window
//! clock.advance(chrono::Duration::days(1) + chrono::Duration::seconds(1));
//! ```

mod manual_clock;
mod mock_repository;

pub use manual_clock::ManualClock;
pub use mock_repository::{MockAlgorithmRepository, RecordedQuery};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::algorithm::{Algorithm, AlgorithmFamily};

    const PLL_NAMES: [&str; 22] = [
        "Aa Perm", "Ab Perm", "E Perm", "F Perm", "Ua Perm", "Ub Perm", "Ga Perm", "Gb Perm",
        "Gc Perm", "Gd Perm", "H Perm", "Ja Perm", "Jb Perm", "Na Perm", "Nb Perm", "Ra Perm",
        "Rb Perm", "T Perm", "V Perm", "Y Perm", "Z Perm", "Jb Perm (alt)",
    ];

    /// Create a test algorithm with reasonable defaults.
    pub fn algorithm(id: u32, name: &str, category: &str) -> Algorithm {
        Algorithm {
            id,
            name: name.to_string(),
            moves: "R U R' U' R' F R2 U' R' U' R U R' F'".to_string(),
            video_id: format!("video-{}", id),
            video_start: 10,
            video_end: 30,
            short_note: format!("Recognition hint for {}", name),
            category: category.to_string(),
            image_url: format!("https://img.example/{}.png", id),
        }
    }

    /// All 22 PLL cases, ids 1..=22. "Ua Perm" has id 5.
    pub fn pll_cases() -> Vec<Algorithm> {
        AlgorithmFamily::Pll
            .id_range()
            .zip(PLL_NAMES)
            .map(|(id, name)| algorithm(id, name, "PLL"))
            .collect()
    }

    /// All 57 OLL cases, ids 23..=79, named "OLL 1" to "OLL 57".
    pub fn oll_cases() -> Vec<Algorithm> {
        AlgorithmFamily::Oll
            .id_range()
            .enumerate()
            .map(|(i, id)| algorithm(id, &format!("OLL {}", i + 1), "OLL"))
            .collect()
    }

    /// The full catalog: every PLL and OLL case.
    pub fn catalog() -> Vec<Algorithm> {
        let mut all = pll_cases();
        all.extend(oll_cases());
        all
    }
}
