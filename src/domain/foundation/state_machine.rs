//! State machine trait for stage enums.
//!
//! Gives lifecycle enums a single place to declare which moves are legal,
//! so transition code can check itself against the table.

/// Trait for enums that represent state machines.
///
/// # Example
///
/// ```ignore
/// impl StateMachine for Stage {
///     fn valid_transitions(&self) -> Vec<Self> {
///         match self {
///             Stage::Start => vec![Stage::AwaitCategory],
///             // ...
///         }
///     }
/// }
///
/// debug_assert!(Stage::Start.can_transition_to(&Stage::AwaitCategory));
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}
