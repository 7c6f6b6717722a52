//! Data table component types.
//!
//! These types describe a list screen to the client: which columns exist and
//! how to render them, which filters and bulk actions the toolbar offers, and
//! which row actions appear. [`DataTableConfig::row_actions`] turns the
//! client's [`MutationState`] into per-row button states.

use serde::{Deserialize, Serialize};

use bazaar_core::{MutationKind, MutationState};

/// Render hint for a column's cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Text,
    Badge,
    Boolean,
    Currency,
    Date,
    Image,
    Link,
    Number,
    Rating,
}

/// Column definition for a data table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableColumn {
    /// Unique key for the column; also the sort/filter field name.
    pub key: String,
    /// Display label for the column header.
    pub label: String,
    /// Row property the cell reads.
    pub accessor: String,
    pub kind: ColumnKind,
    pub sortable: bool,
    pub default_visible: bool,
}

impl TableColumn {
    /// Create a new sortable text column.
    #[must_use]
    pub fn sortable(key: &str, label: &str) -> Self {
        Self {
            sortable: true,
            ..Self::new(key, label)
        }
    }

    /// Create a new non-sortable text column.
    #[must_use]
    pub fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            accessor: key.to_string(),
            kind: ColumnKind::Text,
            sortable: false,
            default_visible: true,
        }
    }

    /// Set the render hint.
    #[must_use]
    pub const fn kind(mut self, kind: ColumnKind) -> Self {
        self.kind = kind;
        self
    }

    /// Read the cell from a different row property than `key`.
    #[must_use]
    pub fn accessor(mut self, accessor: &str) -> Self {
        self.accessor = accessor.to_string();
        self
    }

    /// Set whether the column is visible by default.
    #[must_use]
    pub const fn visible(mut self, visible: bool) -> Self {
        self.default_visible = visible;
        self
    }
}

/// Filter type for data tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    /// Text input filter.
    Text,
    /// Single-select dropdown.
    Select,
    /// Multi-select checkboxes.
    MultiSelect,
    /// Date range picker.
    DateRange,
    /// Number range (min/max).
    NumberRange,
}

/// Filter definition for a data table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableFilter {
    /// Column filter ID sent back in `columnFilters`.
    pub key: String,
    pub label: String,
    pub filter_type: FilterType,
    /// Placeholder text (for text inputs).
    pub placeholder: Option<String>,
    /// Available options (for select/multiselect).
    pub options: Vec<FilterOption>,
}

/// Option for select/multiselect filters and form selects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
}

impl FilterOption {
    /// Create a new filter option.
    #[must_use]
    pub fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }

    /// One option per enum value, labelled in title case.
    #[must_use]
    pub fn from_values(values: impl IntoIterator<Item = &'static str>) -> Vec<Self> {
        values
            .into_iter()
            .map(|value| Self::new(value, &title_case(value)))
            .collect()
    }

    /// The `true`/`false` pair used by boolean filters.
    #[must_use]
    pub fn yes_no() -> Vec<Self> {
        vec![Self::new("true", "Yes"), Self::new("false", "No")]
    }
}

/// `partially_paid` -> `Partially paid`.
fn title_case(value: &str) -> String {
    let text = value.replace('_', " ");
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

impl TableFilter {
    fn build(key: &str, label: &str, filter_type: FilterType) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            filter_type,
            placeholder: None,
            options: vec![],
        }
    }

    /// Create a text filter.
    #[must_use]
    pub fn text(key: &str, label: &str, placeholder: &str) -> Self {
        Self {
            placeholder: Some(placeholder.to_string()),
            ..Self::build(key, label, FilterType::Text)
        }
    }

    /// Create a select filter.
    #[must_use]
    pub fn select(key: &str, label: &str, options: Vec<FilterOption>) -> Self {
        Self {
            options,
            ..Self::build(key, label, FilterType::Select)
        }
    }

    /// Create a multi-select filter.
    #[must_use]
    pub fn multi_select(key: &str, label: &str, options: Vec<FilterOption>) -> Self {
        Self {
            options,
            ..Self::build(key, label, FilterType::MultiSelect)
        }
    }

    /// Create a date range filter.
    #[must_use]
    pub fn date_range(key: &str, label: &str) -> Self {
        Self::build(key, label, FilterType::DateRange)
    }

    /// Create a min/max number filter.
    #[must_use]
    pub fn number_range(key: &str, label: &str) -> Self {
        Self::build(key, label, FilterType::NumberRange)
    }
}

/// Bulk action definition for data tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkAction {
    /// Action key (passed to event handler).
    pub key: String,
    pub label: String,
    /// Phosphor icon class.
    pub icon: String,
    pub destructive: bool,
}

impl BulkAction {
    /// Create a new bulk action.
    #[must_use]
    pub fn new(key: &str, label: &str, icon: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            icon: icon.to_string(),
            destructive: false,
        }
    }

    /// Mark this action as destructive.
    #[must_use]
    pub const fn destructive(mut self) -> Self {
        self.destructive = true;
        self
    }
}

/// A per-row button (edit, toggle, delete, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowAction {
    pub key: String,
    pub label: String,
    /// Phosphor icon class.
    pub icon: String,
    pub destructive: bool,
    /// The in-flight mutation that shows a spinner on this button.
    pub busy_on: MutationKind,
}

impl RowAction {
    /// An action that spins while the row is updating.
    #[must_use]
    pub fn new(key: &str, label: &str, icon: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            icon: icon.to_string(),
            destructive: false,
            busy_on: MutationKind::Update,
        }
    }

    #[must_use]
    pub fn edit() -> Self {
        Self::new("edit", "Edit", "ph-pencil-simple")
    }

    /// Flip a boolean column; `label` names what is toggled.
    #[must_use]
    pub fn toggle(label: &str) -> Self {
        Self::new("toggle", label, "ph-toggle-left")
    }

    #[must_use]
    pub fn delete() -> Self {
        Self {
            destructive: true,
            busy_on: MutationKind::Delete,
            ..Self::new("delete", "Delete", "ph-trash")
        }
    }

    /// Ask for confirmation and style the button as dangerous.
    #[must_use]
    pub const fn destructive(mut self) -> Self {
        self.destructive = true;
        self
    }
}

/// The toolbar's "new" button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAction {
    pub label: String,
    pub icon: String,
}

/// Button state for one row action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowActionState {
    pub key: String,
    pub disabled: bool,
    pub busy: bool,
}

/// Toolbar button state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolbarState {
    pub create_disabled: bool,
    pub creating: bool,
}

/// Configuration for a data table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataTableConfig {
    /// Unique table identifier.
    pub table_id: String,
    pub columns: Vec<TableColumn>,
    pub filters: Vec<TableFilter>,
    pub bulk_actions: Vec<BulkAction>,
    pub row_actions: Vec<RowAction>,
    pub create_action: Option<CreateAction>,
    pub search_placeholder: String,
    /// Icon for empty state.
    pub empty_icon: String,
    pub empty_title: String,
    pub empty_description: Option<String>,
    /// Whether to show bulk action bar.
    pub has_bulk_actions: bool,
    /// Whether to show filter panel.
    pub has_filters: bool,
    /// Whether to show column picker.
    pub has_column_picker: bool,
}

impl DataTableConfig {
    /// Create a new data table configuration.
    #[must_use]
    pub fn new(table_id: &str) -> Self {
        Self {
            table_id: table_id.to_string(),
            columns: vec![],
            filters: vec![],
            bulk_actions: vec![],
            row_actions: vec![],
            create_action: None,
            search_placeholder: "Search...".to_string(),
            empty_icon: "ph-list".to_string(),
            empty_title: "No items found".to_string(),
            empty_description: None,
            has_bulk_actions: false,
            has_filters: false,
            has_column_picker: true,
        }
    }

    /// Add a column.
    #[must_use]
    pub fn column(mut self, column: TableColumn) -> Self {
        self.columns.push(column);
        self
    }

    /// Add a column only when `include` holds.
    #[must_use]
    pub fn column_if(self, include: bool, column: TableColumn) -> Self {
        if include { self.column(column) } else { self }
    }

    /// Add a filter.
    #[must_use]
    pub fn filter(mut self, filter: TableFilter) -> Self {
        self.has_filters = true;
        self.filters.push(filter);
        self
    }

    /// Add a filter only when `include` holds.
    #[must_use]
    pub fn filter_if(self, include: bool, filter: TableFilter) -> Self {
        if include { self.filter(filter) } else { self }
    }

    /// Add a bulk action.
    #[must_use]
    pub fn bulk_action(mut self, action: BulkAction) -> Self {
        self.has_bulk_actions = true;
        self.bulk_actions.push(action);
        self
    }

    /// Add a row action.
    #[must_use]
    pub fn row_action(mut self, action: RowAction) -> Self {
        self.row_actions.push(action);
        self
    }

    /// Add a row action only when `include` holds.
    #[must_use]
    pub fn row_action_if(self, include: bool, action: RowAction) -> Self {
        if include { self.row_action(action) } else { self }
    }

    /// Offer a "new" button in the toolbar.
    #[must_use]
    pub fn create_action(mut self, label: &str) -> Self {
        self.create_action = Some(CreateAction {
            label: label.to_string(),
            icon: "ph-plus".to_string(),
        });
        self
    }

    /// Offer a "new" button only when `include` holds.
    #[must_use]
    pub fn create_action_if(self, include: bool, label: &str) -> Self {
        if include { self.create_action(label) } else { self }
    }

    /// Set search placeholder.
    #[must_use]
    pub fn search_placeholder(mut self, placeholder: &str) -> Self {
        self.search_placeholder = placeholder.to_string();
        self
    }

    /// Set empty state configuration.
    #[must_use]
    pub fn empty_state(mut self, icon: &str, title: &str, description: Option<&str>) -> Self {
        self.empty_icon = icon.to_string();
        self.empty_title = title.to_string();
        self.empty_description = description.map(ToString::to_string);
        self
    }

    /// Get default visible columns.
    #[must_use]
    pub fn default_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.default_visible)
            .map(|c| c.key.clone())
            .collect()
    }

    /// Button states for one row.
    ///
    /// Every action is disabled while the row has a write in flight; only
    /// the action matching that write shows as busy.
    #[must_use]
    pub fn row_actions(&self, row_id: i32, mutations: &MutationState) -> Vec<RowActionState> {
        let disabled = mutations.is_busy(row_id);
        self.row_actions
            .iter()
            .map(|action| RowActionState {
                key: action.key.clone(),
                disabled,
                busy: match action.busy_on {
                    MutationKind::Delete => mutations.is_deleting(row_id),
                    MutationKind::Update => mutations.is_updating(row_id),
                    MutationKind::Create => false,
                },
            })
            .collect()
    }

    /// Toolbar state; the create button is off while a create is in flight.
    #[must_use]
    pub fn toolbar_state(&self, mutations: &MutationState) -> ToolbarState {
        ToolbarState {
            create_disabled: self.create_action.is_none() || mutations.creating,
            creating: mutations.creating,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> DataTableConfig {
        DataTableConfig::new("brands")
            .column(TableColumn::sortable("name", "Name"))
            .row_action(RowAction::edit())
            .row_action(RowAction::toggle("Activate"))
            .row_action(RowAction::delete())
            .create_action("New brand")
    }

    fn state(actions: &[RowActionState], key: &str) -> (bool, bool) {
        let action = actions.iter().find(|a| a.key == key).unwrap();
        (action.disabled, action.busy)
    }

    #[test]
    fn test_idle_row_is_enabled() {
        let actions = config().row_actions(1, &MutationState::default());
        assert!(actions.iter().all(|a| !a.disabled && !a.busy));
    }

    #[test]
    fn test_deleting_row() {
        let mut mutations = MutationState::default();
        mutations.begin(MutationKind::Delete, Some(4));
        let actions = config().row_actions(4, &mutations);
        assert_eq!(state(&actions, "delete"), (true, true));
        assert_eq!(state(&actions, "edit"), (true, false));
        assert_eq!(state(&actions, "toggle"), (true, false));

        let other = config().row_actions(5, &mutations);
        assert_eq!(state(&other, "delete"), (false, false));
    }

    #[test]
    fn test_updating_row() {
        let mut mutations = MutationState::default();
        mutations.begin(MutationKind::Update, Some(4));
        let actions = config().row_actions(4, &mutations);
        assert_eq!(state(&actions, "edit"), (true, true));
        assert_eq!(state(&actions, "toggle"), (true, true));
        assert_eq!(state(&actions, "delete"), (true, false));

        mutations.finish(MutationKind::Update, Some(4));
        assert!(config().row_actions(4, &mutations).iter().all(|a| !a.disabled));
    }

    #[test]
    fn test_toolbar_state() {
        let mut mutations = MutationState::default();
        assert!(!config().toolbar_state(&mutations).create_disabled);
        mutations.begin(MutationKind::Create, None);
        let toolbar = config().toolbar_state(&mutations);
        assert!(toolbar.create_disabled && toolbar.creating);

        let read_only = DataTableConfig::new("transactions");
        assert!(read_only.toolbar_state(&MutationState::default()).create_disabled);
    }

    #[test]
    fn test_column_builders() {
        let column = TableColumn::sortable("shopName", "Shop")
            .kind(ColumnKind::Link)
            .accessor("shop_name")
            .visible(false);
        assert!(column.sortable);
        assert_eq!(column.accessor, "shop_name");
        assert!(!column.default_visible);

        let config = DataTableConfig::new("x")
            .column(TableColumn::new("a", "A"))
            .column(column)
            .column_if(false, TableColumn::new("b", "B"));
        assert_eq!(config.default_columns(), ["a"]);
    }

    #[test]
    fn test_enum_options_are_title_cased() {
        let options = FilterOption::from_values(["pending", "partially_paid"]);
        assert_eq!(options[1], FilterOption::new("partially_paid", "Partially paid"));
    }
}
