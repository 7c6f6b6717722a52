//! List-screen and dialog descriptors served to the dashboard client.
//!
//! - [`data_table`] - table configuration types and row action states
//! - [`tables`] - one table factory per entity
//! - [`form`] - form schema, validation and the dialog state machine
//! - [`forms`] - one form factory per entity

pub mod data_table;
pub mod form;
pub mod forms;
pub mod tables;

pub use data_table::{DataTableConfig, RowActionState, ToolbarState};
pub use form::{FormDialog, FormSchema};
