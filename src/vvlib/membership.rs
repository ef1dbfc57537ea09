use crate::vvlib::{Result, VarvennError, NAME_SEP};
use bitflags::bitflags;
use itertools::Itertools;
use std::collections::HashSet;
use std::fmt;

bitflags! {
    /// Which of the compared samples hold a variant. Bit order follows the
    /// comparison table's name.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Region: u8 {
        const A = 0x1;
        const B = 0x2;
        const C = 0x4;
    }
}

const LETTERS: [(&str, Region); 3] = [("A", Region::A), ("B", Region::B), ("C", Region::C)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonMode {
    Duos,
    Trios,
}

impl fmt::Display for ComparisonMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ComparisonMode::Duos => write!(f, "duos"),
            ComparisonMode::Trios => write!(f, "trios"),
        }
    }
}

impl ComparisonMode {
    pub fn n_samples(&self) -> usize {
        match self {
            ComparisonMode::Duos => 2,
            ComparisonMode::Trios => 3,
        }
    }

    /// Every legal region, in reporting order
    pub fn regions(&self) -> Vec<Region> {
        match self {
            ComparisonMode::Duos => vec![Region::A, Region::B, Region::A | Region::B],
            ComparisonMode::Trios => vec![
                Region::A,
                Region::B,
                Region::A | Region::B,
                Region::C,
                Region::A | Region::C,
                Region::B | Region::C,
                Region::all(),
            ],
        }
    }

    /// Mode of a comparison table with `n` constituent samples
    pub fn for_samples(n: usize) -> Option<Self> {
        match n {
            2 => Some(ComparisonMode::Duos),
            3 => Some(ComparisonMode::Trios),
            _ => None,
        }
    }
}

impl Region {
    /// Parses a selector such as `A`, `B:C` or `A:B:C`
    pub fn parse(text: &str, mode: ComparisonMode) -> Result<Region> {
        let invalid = || VarvennError::InvalidRegion {
            region: text.to_string(),
            mode: mode.to_string(),
        };

        let mut region = Region::empty();
        for token in text.split(NAME_SEP) {
            let bit = LETTERS
                .iter()
                .take(mode.n_samples())
                .find(|(letter, _)| token.trim().eq_ignore_ascii_case(letter))
                .map(|(_, bit)| *bit)
                .ok_or_else(invalid)?;
            if region.contains(bit) {
                return Err(invalid());
            }
            region |= bit;
        }

        if mode.regions().contains(&region) {
            Ok(region)
        } else {
            Err(invalid())
        }
    }

    /// Letter form, e.g. `A:C`
    pub fn code(&self) -> String {
        LETTERS
            .iter()
            .filter(|(_, bit)| self.contains(*bit))
            .map(|(letter, _)| *letter)
            .join(NAME_SEP)
    }

    /// Membership label with sample names substituted for letters
    pub fn label(&self, names: &[&str]) -> String {
        LETTERS
            .iter()
            .zip(names.iter())
            .filter(|((_, bit), _)| self.contains(*bit))
            .map(|(_, name)| *name)
            .join(NAME_SEP)
    }

    /// Region of a membership label, compared as a set of name tokens
    pub fn from_label(label: &str, names: &[&str]) -> Option<Region> {
        let tokens: HashSet<&str> = label.split(NAME_SEP).collect();
        let mut region = Region::empty();
        for ((_, bit), name) in LETTERS.iter().zip(names.iter()) {
            if tokens.contains(name) {
                region |= *bit;
            }
        }
        if region.is_empty() || region.bits().count_ones() as usize != tokens.len() {
            None
        } else {
            Some(region)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_legal_regions() {
        assert_eq!(Region::parse("A", ComparisonMode::Duos).unwrap(), Region::A);
        assert_eq!(
            Region::parse("A:B", ComparisonMode::Duos).unwrap(),
            Region::A | Region::B
        );
        assert_eq!(
            Region::parse("A:B:C", ComparisonMode::Trios).unwrap(),
            Region::all()
        );
        assert_eq!(
            Region::parse("c:a", ComparisonMode::Trios).unwrap(),
            Region::A | Region::C
        );
    }

    #[test]
    fn parse_rejects() {
        for bad in ["C", "A:C", "", "A:A", "X"] {
            assert!(matches!(
                Region::parse(bad, ComparisonMode::Duos),
                Err(VarvennError::InvalidRegion { .. })
            ));
        }
        assert!(Region::parse("A:B:C:D", ComparisonMode::Trios).is_err());
    }

    #[test]
    fn labels_and_codes() {
        let names = ["P1", "P10", "P2"];
        let region = Region::A | Region::C;
        assert_eq!(region.code(), "A:C");
        assert_eq!(region.label(&names), "P1:P2");
        assert_eq!(Region::from_label("P1:P2", &names), Some(region));
        // P1 is not matched as a substring of P10
        assert_eq!(Region::from_label("P10", &names), Some(Region::B));
        assert_eq!(Region::from_label("P3", &names), None);
    }

    #[test]
    fn trio_regions_in_order() {
        let codes: Vec<String> = ComparisonMode::Trios
            .regions()
            .iter()
            .map(|r| r.code())
            .collect();
        assert_eq!(codes, vec!["A", "B", "A:B", "C", "A:C", "B:C", "A:B:C"]);
    }
}
