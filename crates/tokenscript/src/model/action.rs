//! Cards: token views and user actions.

use rustc_hash::FxHashMap;

use crate::model::{AttributeType, FunctionDefinition};

/// A view record: markup content plus an optional scoped style.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct View {
    pub content: String,
    pub style: Option<String>,
}

/// Everything declared by the token card.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewHolder {
    /// View tag (`view`, `item-view`) to view.
    pub views: FxHashMap<String, View>,
    pub global_style: Option<String>,
    /// Attribute types scoped to the token card. These shadow global
    /// attribute types of the same name for the card only.
    pub local_attribute_types: FxHashMap<String, AttributeType>,
}

impl ViewHolder {
    /// Returns the content of a view.
    pub fn view(&self, tag: &str) -> Option<&str> {
        self.views.get(tag).map(|v| v.content.as_str())
    }

    /// Returns the scoped style of a view.
    pub fn view_style(&self, tag: &str) -> Option<&str> {
        self.views.get(tag).and_then(|v| v.style.as_deref())
    }
}

/// A user-invocable operation declared by an action card.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Action {
    /// Position among the document's actions, starting at 0.
    pub order: usize,
    pub action_type: String,
    pub label: Option<String>,
    /// Selection filter; the action is hidden for tokens it matches.
    /// Empty means no exclusion.
    pub exclude: String,
    pub view: Option<View>,
    pub style: Option<String>,
    pub function: Option<FunctionDefinition>,
    /// Attribute types scoped to this action.
    pub attribute_types: FxHashMap<String, AttributeType>,
}

impl Action {
    /// Returns true if the action declares an exclusion filter.
    pub fn has_exclusion(&self) -> bool {
        !self.exclude.is_empty()
    }
}
