use crate::NdArrayError;

/// Rank token of an array.
///
/// Ranks one to four have dedicated variants so specialized code paths can
/// match on them cheaply; any other rank is carried by [`Rank::N`]. Tokens
/// compare by the rank they denote, so `Rank::N(3) == Rank::R3`.
#[derive(Clone, Copy, Debug)]
pub enum Rank {
    /// One axis.
    R1,
    /// Two axes.
    R2,
    /// Three axes.
    R3,
    /// Four axes.
    R4,
    /// Any number of axes.
    N(usize),
}

impl Rank {
    /// Returns the canonical token for `rank`.
    #[must_use]
    pub const fn for_rank(rank: usize) -> Self {
        match rank {
            1 => Self::R1,
            2 => Self::R2,
            3 => Self::R3,
            4 => Self::R4,
            n => Self::N(n),
        }
    }

    /// Returns the number of axes denoted by the token.
    #[must_use]
    pub const fn rank(self) -> usize {
        match self {
            Self::R1 => 1,
            Self::R2 => 2,
            Self::R3 => 3,
            Self::R4 => 4,
            Self::N(n) => n,
        }
    }

    /// Checks that a shape of length `shape_len` has this rank.
    ///
    /// # Errors
    ///
    /// Returns [`NdArrayError::RankMismatch`] if they differ.
    pub fn require_matches(self, shape_len: usize) -> Result<(), NdArrayError> {
        if self.rank() != shape_len {
            return Err(NdArrayError::rank_mismatch(self.rank(), shape_len));
        }
        Ok(())
    }
}

impl PartialEq for Rank {
    fn eq(&self, other: &Self) -> bool {
        self.rank() == other.rank()
    }
}

impl Eq for Rank {}

impl std::hash::Hash for Rank {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::N(n) => write!(f, "N({n})"),
            other => write!(f, "R{}", other.rank()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_rank_singletons() {
        assert!(matches!(Rank::for_rank(1), Rank::R1));
        assert!(matches!(Rank::for_rank(4), Rank::R4));
        assert!(matches!(Rank::for_rank(5), Rank::N(5)));
        assert_eq!(Rank::for_rank(7).rank(), 7);
    }

    #[test]
    fn test_value_equality() {
        assert_eq!(Rank::N(3), Rank::R3);
        assert_eq!(Rank::N(6), Rank::N(6));
        assert_ne!(Rank::N(6), Rank::N(5));
        assert_ne!(Rank::R1, Rank::R2);
    }

    #[test]
    fn test_require_matches() {
        assert!(Rank::R2.require_matches(2).is_ok());
        assert_eq!(
            Rank::R2.require_matches(3),
            Err(NdArrayError::rank_mismatch(2, 3))
        );
        assert_eq!(Rank::N(5).to_string(), "N(5)");
        assert_eq!(Rank::R3.to_string(), "R3");
    }
}
