//! View snapshot types.

use serde::{Deserialize, Serialize};

/// Per-field projection: a small state machine record.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldView {
    pub value: String,
    pub initial_value: String,
    pub touched: bool,
    pub dirty: bool,
    pub error: Option<String>,
    pub valid: bool,
    pub editing: bool,
}

/// An address suggestion offered while the address field is edited.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AddressSuggestion {
    pub street: String,
    pub city: String,
    pub postcode: String,
    pub country: String,
    pub combined: String,
}

/// Immutable, complete snapshot of everything the consumer needs to render.
///
/// Always a self-consistent projection of the core's state at the instant it
/// was pulled; partial or torn snapshots are never observable. Each update
/// is a brand-new value, never an in-place edit.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewModel {
    pub username: FieldView,
    pub email: FieldView,
    pub age: FieldView,
    pub address: FieldView,
    pub suggestions: Vec<AddressSuggestion>,
    pub submitted: bool,
    pub is_editing_form: bool,
    pub can_submit: bool,
    pub status_message: String,
}
