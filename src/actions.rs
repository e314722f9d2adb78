//! Row actions and the role gate in front of them.
//!
//! The caller injects the current user's role; nothing here reads session
//! or environment state.

use crate::row::Row;
use std::collections::BTreeSet;
use std::fmt;

pub type RowCallback = Box<dyn FnMut(&Row, usize)>;
pub type ViewCallback = Box<dyn FnMut(&Row)>;

/// Roles allowed to edit and delete when none are given.
pub const DEFAULT_ACTION_ROLES: [&str; 2] = ["Admin", "Super Admin"];

/// What a click on a page row landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// The row body: opens the detail view.
    Row,
    Edit,
    Delete,
}

/// Whether `role` is one of `allowed`.
pub fn role_allowed(role: Option<&str>, allowed: &BTreeSet<String>) -> bool {
    role.is_some_and(|role| allowed.contains(role))
}

#[derive(Default)]
pub struct Actions {
    user_role: Option<String>,
    edit_roles: BTreeSet<String>,
    delete_roles: BTreeSet<String>,
    on_edit: Option<RowCallback>,
    on_delete: Option<RowCallback>,
    on_view: Option<ViewCallback>,
}

impl Actions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.user_role = Some(role.into());
        self
    }

    pub fn with_edit<I, S, F>(mut self, roles: I, on_edit: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: FnMut(&Row, usize) + 'static,
    {
        self.edit_roles = roles.into_iter().map(Into::into).collect();
        self.on_edit = Some(Box::new(on_edit));
        self
    }

    pub fn with_delete<I, S, F>(mut self, roles: I, on_delete: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: FnMut(&Row, usize) + 'static,
    {
        self.delete_roles = roles.into_iter().map(Into::into).collect();
        self.on_delete = Some(Box::new(on_delete));
        self
    }

    pub fn with_view<F>(mut self, on_view: F) -> Self
    where
        F: FnMut(&Row) + 'static,
    {
        self.on_view = Some(Box::new(on_view));
        self
    }

    pub fn user_role(&self) -> Option<&str> {
        self.user_role.as_deref()
    }

    pub fn set_role(&mut self, role: Option<String>) {
        self.user_role = role;
    }

    /// Edit control is shown only with a callback and an allowed role.
    pub fn can_edit(&self) -> bool {
        self.on_edit.is_some() && role_allowed(self.user_role(), &self.edit_roles)
    }

    pub fn can_delete(&self) -> bool {
        self.on_delete.is_some() && role_allowed(self.user_role(), &self.delete_roles)
    }

    pub fn can_view(&self) -> bool {
        self.on_view.is_some()
    }

    /// Fire the callback for `target`. Returns whether anything ran; a
    /// gated-off control does nothing.
    pub(crate) fn dispatch(&mut self, target: ClickTarget, row: &Row, index: usize) -> bool {
        match target {
            ClickTarget::Row => match self.on_view.as_mut() {
                Some(on_view) => {
                    on_view(row);
                    true
                }
                None => false,
            },
            ClickTarget::Edit => {
                if !self.can_edit() {
                    return false;
                }
                match self.on_edit.as_mut() {
                    Some(on_edit) => {
                        on_edit(row, index);
                        true
                    }
                    None => false,
                }
            }
            ClickTarget::Delete => {
                if !self.can_delete() {
                    return false;
                }
                match self.on_delete.as_mut() {
                    Some(on_delete) => {
                        on_delete(row, index);
                        true
                    }
                    None => false,
                }
            }
        }
    }
}

impl fmt::Debug for Actions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Actions")
            .field("user_role", &self.user_role)
            .field("edit_roles", &self.edit_roles)
            .field("delete_roles", &self.delete_roles)
            .field("on_edit", &self.on_edit.is_some())
            .field("on_delete", &self.on_delete.is_some())
            .field("on_view", &self.on_view.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_role_gate() {
        let actions = Actions::new()
            .with_role("Manager")
            .with_edit(["Admin", "Manager"], |_, _| {})
            .with_delete(DEFAULT_ACTION_ROLES, |_, _| {});
        assert!(actions.can_edit());
        assert!(!actions.can_delete());
    }

    #[test]
    fn test_no_callback_means_hidden() {
        let actions = Actions::new().with_role("Admin");
        assert!(!actions.can_edit());
        assert!(!actions.can_delete());
        assert!(!actions.can_view());
    }

    #[test]
    fn test_no_role_means_hidden() {
        let actions = Actions::new().with_edit(["Admin"], |_, _| {});
        assert!(!actions.can_edit());
    }

    #[test]
    fn test_dispatch_is_contained() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (l1, l2, l3) = (log.clone(), log.clone(), log.clone());
        let mut actions = Actions::new()
            .with_role("Admin")
            .with_edit(["Admin"], move |_, i| l1.borrow_mut().push(format!("edit {}", i)))
            .with_delete(["Super Admin"], move |_, i| {
                l2.borrow_mut().push(format!("delete {}", i))
            })
            .with_view(move |_| l3.borrow_mut().push("view".to_string()));

        let row = Row::new();
        assert!(actions.dispatch(ClickTarget::Edit, &row, 12));
        assert!(!actions.dispatch(ClickTarget::Delete, &row, 12));
        assert!(actions.dispatch(ClickTarget::Row, &row, 12));
        assert_eq!(*log.borrow(), vec!["edit 12".to_string(), "view".to_string()]);
    }
}
