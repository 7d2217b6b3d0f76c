//! Screen selection for the task UI.
//!
//! The router is a small state machine over `List`, `Create` and `Edit(id)`
//! with a delete confirmation overlay that can only sit on top of `List`.
//! Requests that are not valid from the current state are ignored.

use tracing::debug;

/// Active screen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    List,
    Create,
    Edit(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Router {
    view: View,
    delete_confirm: Option<String>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    /// Id awaiting delete confirmation, if the overlay is open.
    pub fn delete_confirm(&self) -> Option<&str> {
        self.delete_confirm.as_deref()
    }

    fn on_plain_list(&self) -> bool {
        self.view == View::List && self.delete_confirm.is_none()
    }

    pub fn create(&mut self) {
        if self.on_plain_list() {
            debug!("router: list -> create");
            self.view = View::Create;
        }
    }

    pub fn edit(&mut self, id: &str) {
        if self.on_plain_list() {
            debug!(id, "router: list -> edit");
            self.view = View::Edit(id.to_string());
        }
    }

    /// Leave Create or Edit after the repository write succeeded.
    pub fn saved(&mut self) {
        self.back_to_list();
    }

    /// Leave Create or Edit without writing.
    pub fn cancel(&mut self) {
        self.back_to_list();
    }

    fn back_to_list(&mut self) {
        if matches!(self.view, View::Create | View::Edit(_)) {
            debug!(from = ?self.view, "router: -> list");
            self.view = View::List;
        }
    }

    pub fn request_delete(&mut self, id: &str) {
        if self.on_plain_list() {
            debug!(id, "router: delete requested");
            self.delete_confirm = Some(id.to_string());
        }
    }

    /// Close the overlay and hand back the id the caller must now delete.
    pub fn confirm_delete(&mut self) -> Option<String> {
        self.delete_confirm.take()
    }

    pub fn cancel_delete(&mut self) {
        self.delete_confirm = None;
    }

    /// Fall back to the list when the edited or pending-delete task no longer exists.
    pub fn reconcile(&mut self, exists: impl Fn(&str) -> bool) {
        if matches!(&self.view, View::Edit(id) if !exists(id.as_str())) {
            debug!(from = ?self.view, "router: edited task vanished, back to list");
            self.view = View::List;
        }
        if matches!(&self.delete_confirm, Some(id) if !exists(id.as_str())) {
            self.delete_confirm = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_save_and_cancel() {
        let mut router = Router::new();
        router.create();
        assert_eq!(router.view(), &View::Create);
        router.saved();
        assert_eq!(router.view(), &View::List);
        router.create();
        router.cancel();
        assert_eq!(router.view(), &View::List);
    }

    #[test]
    fn test_edit_round_trip() {
        let mut router = Router::new();
        router.edit("t1");
        assert_eq!(router.view(), &View::Edit("t1".into()));
        // No nested navigation from a form.
        router.create();
        assert_eq!(router.view(), &View::Edit("t1".into()));
        router.cancel();
        assert_eq!(router.view(), &View::List);
    }

    #[test]
    fn test_delete_overlay() {
        let mut router = Router::new();
        router.request_delete("t1");
        assert_eq!(router.delete_confirm(), Some("t1"));
        assert_eq!(router.view(), &View::List);

        router.edit("t2");
        assert_eq!(router.view(), &View::List);

        assert_eq!(router.confirm_delete(), Some("t1".to_string()));
        assert_eq!(router.delete_confirm(), None);
        assert_eq!(router.confirm_delete(), None);

        router.request_delete("t3");
        router.cancel_delete();
        assert_eq!(router.delete_confirm(), None);
    }

    #[test]
    fn test_delete_not_available_from_forms() {
        let mut router = Router::new();
        router.create();
        router.request_delete("t1");
        assert_eq!(router.delete_confirm(), None);
    }

    #[test]
    fn test_reconcile_missing_edit_target() {
        let mut router = Router::new();
        router.edit("gone");
        router.reconcile(|id| id == "still-here");
        assert_eq!(router.view(), &View::List);

        router.edit("still-here");
        router.reconcile(|id| id == "still-here");
        assert_eq!(router.view(), &View::Edit("still-here".into()));
    }
}
