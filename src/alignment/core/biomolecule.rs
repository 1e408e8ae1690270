//! Biomolecule kinds and their alphabet sizes.
use std::str::FromStr;

use crate::alignment::errors::AlignmentError;

/// Kind of sequences in an alignment.
///
/// The alphabet size includes the gap state: 20 amino acids + gap for
/// proteins, 4 nucleotides + gap for RNA.
///
/// Parsing:
/// `FromStr` accepts case-insensitive `"protein"` and `"rna"`;
/// [`Biomolecule::from_code`] accepts the integer codes `1` (protein) and
/// `2` (RNA).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Biomolecule {
    Protein,
    Rna,
}

impl Biomolecule {
    pub const fn num_site_states(self) -> usize {
        match self {
            Biomolecule::Protein => 21,
            Biomolecule::Rna => 5,
        }
    }

    pub fn from_code(code: i64) -> Result<Self, AlignmentError> {
        match code {
            1 => Ok(Biomolecule::Protein),
            2 => Ok(Biomolecule::Rna),
            _ => Err(AlignmentError::UnknownBiomolecule { name: code.to_string() }),
        }
    }
}

impl FromStr for Biomolecule {
    type Err = AlignmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "protein" => Ok(Biomolecule::Protein),
            "rna" => Ok(Biomolecule::Rna),
            _ => Err(AlignmentError::UnknownBiomolecule { name: s.to_string() }),
        }
    }
}

impl std::fmt::Display for Biomolecule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Biomolecule::Protein => write!(f, "protein"),
            Biomolecule::Rna => write!(f, "rna"),
        }
    }
}
