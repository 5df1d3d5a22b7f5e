use crate::search::SearchOutcome;

/// Identifies one mounted view instance so late messages can be matched or dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(pub u64);

#[derive(Debug, Clone)]
pub enum AppMessage {
    SearchSettled {
        view: ViewId,
        outcome: Result<SearchOutcome, String>,
    },
    Alert(String),
}
