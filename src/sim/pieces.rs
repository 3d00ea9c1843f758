//! Tetromino catalogue

use rand::Rng;

use super::grid::Shape;

/// The seven tetrominoes, in catalogue order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Spawn orientation
    pub fn shape(self) -> Shape {
        match self {
            PieceKind::I => Shape::from_rows(&[&[1, 1, 1, 1]]),
            PieceKind::O => Shape::from_rows(&[&[1, 1], &[1, 1]]),
            PieceKind::T => Shape::from_rows(&[&[0, 1, 0], &[1, 1, 1]]),
            PieceKind::S => Shape::from_rows(&[&[1, 1, 0], &[0, 1, 1]]),
            PieceKind::Z => Shape::from_rows(&[&[0, 1, 1], &[1, 1, 0]]),
            PieceKind::J => Shape::from_rows(&[&[1, 0, 0], &[1, 1, 1]]),
            PieceKind::L => Shape::from_rows(&[&[0, 0, 1], &[1, 1, 1]]),
        }
    }

    /// Board color token (1..=7)
    pub fn token(self) -> u8 {
        self as u8 + 1
    }

    pub fn from_token(token: u8) -> Option<Self> {
        Self::ALL.get(usize::from(token).checked_sub(1)?).copied()
    }

    /// Uniform pick from the catalogue
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_token_round_trip() {
        for kind in PieceKind::ALL {
            assert_eq!(PieceKind::from_token(kind.token()), Some(kind));
        }
        assert_eq!(PieceKind::from_token(0), None);
        assert_eq!(PieceKind::from_token(8), None);
    }

    #[test]
    fn test_every_piece_has_four_cells() {
        for kind in PieceKind::ALL {
            assert_eq!(kind.shape().occupied().count(), 4, "{kind:?}");
        }
    }

    #[test]
    fn test_random_is_seeded() {
        let mut a = Pcg32::seed_from_u64(7);
        let mut b = Pcg32::seed_from_u64(7);
        let seq_a: Vec<_> = (0..20).map(|_| PieceKind::random(&mut a)).collect();
        let seq_b: Vec<_> = (0..20).map(|_| PieceKind::random(&mut b)).collect();
        assert_eq!(seq_a, seq_b);
    }
}
