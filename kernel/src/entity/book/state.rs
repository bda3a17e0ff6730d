use std::fmt::Display;
use std::str::FromStr;

use error_stack::Report;
use serde::{Deserialize, Serialize};

use crate::KernelError;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookState {
    #[default]
    Draft,
    Available,
    Borrowed,
    Lost,
}

/// Exhaustive list of legal `(from, to)` moves. Anything else, self-loops included, is rejected.
const ALLOWED_TRANSITIONS: [(BookState, BookState); 6] = [
    (BookState::Draft, BookState::Available),
    (BookState::Available, BookState::Borrowed),
    (BookState::Borrowed, BookState::Available),
    (BookState::Available, BookState::Lost),
    (BookState::Borrowed, BookState::Lost),
    (BookState::Lost, BookState::Available),
];

impl BookState {
    pub const ALL: [BookState; 4] = [
        BookState::Draft,
        BookState::Available,
        BookState::Borrowed,
        BookState::Lost,
    ];

    pub fn can_transition_to(&self, to: &BookState) -> bool {
        ALLOWED_TRANSITIONS.contains(&(*self, *to))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookState::Draft => "draft",
            BookState::Available => "available",
            BookState::Borrowed => "borrowed",
            BookState::Lost => "lost",
        }
    }
}

impl Display for BookState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookState {
    type Err = Report<KernelError>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| {
                Report::new(KernelError::Internal)
                    .attach_printable(format!("Unknown book state: {s}"))
            })
    }
}

#[cfg(test)]
mod test {
    use super::BookState;

    /// Rows are the current state and columns the target, both in
    /// draft, available, borrowed, lost order.
    const LEGAL: [[bool; 4]; 4] = [
        [false, true, false, false],
        [false, false, true, true],
        [false, true, false, true],
        [false, true, false, false],
    ];

    #[test]
    fn full_matrix_matches_lending_rules() {
        for (row, from) in BookState::ALL.into_iter().enumerate() {
            for (column, to) in BookState::ALL.into_iter().enumerate() {
                assert_eq!(
                    from.can_transition_to(&to),
                    LEGAL[row][column],
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn exactly_six_moves_are_legal() {
        let legal = BookState::ALL
            .into_iter()
            .flat_map(|from| BookState::ALL.into_iter().map(move |to| (from, to)))
            .filter(|(from, to)| from.can_transition_to(to))
            .count();
        assert_eq!(legal, 6);
        for state in BookState::ALL {
            assert!(!state.can_transition_to(&state), "{state} -> {state}");
        }
    }

    #[test]
    fn asymmetric_edges() {
        assert!(BookState::Borrowed.can_transition_to(&BookState::Lost));
        assert!(!BookState::Lost.can_transition_to(&BookState::Borrowed));
        assert!(BookState::Draft.can_transition_to(&BookState::Available));
        assert!(!BookState::Available.can_transition_to(&BookState::Draft));
    }

    #[test]
    fn parse_round_trips_names() {
        for state in BookState::ALL {
            assert_eq!(state.as_str().parse::<BookState>().ok(), Some(state));
        }
        assert!("archived".parse::<BookState>().is_err());
    }
}
