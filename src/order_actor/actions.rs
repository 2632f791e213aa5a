//! Custom actions for the Order store.
//!
//! Patches cover everything the optimizer and the ETA service change. Completion is an operator
//! event rather than a field edit, so it is an action.

/// Custom actions for work orders.
#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Marks an assigned order as completed.
    ///
    /// # Errors
    /// Fails unless the order is currently `assigned`.
    Complete,
}
