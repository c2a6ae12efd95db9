use crate::action_framework::{ActionRequest, FormData, Resource};
use crate::error::ActionError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionMode<Id> {
    Closed,
    Creating,
    Editing(Id),
}

/// State of one edit modal: whether it is open, and for which record.
#[derive(Debug, Clone)]
pub struct EditSession<T: Resource> {
    mode: SessionMode<T::Id>,
}

impl<T: Resource> Default for EditSession<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Resource> EditSession<T> {
    pub fn new() -> Self {
        Self {
            mode: SessionMode::Closed,
        }
    }

    pub fn mode(&self) -> &SessionMode<T::Id> {
        &self.mode
    }

    pub fn is_open(&self) -> bool {
        self.mode != SessionMode::Closed
    }

    pub fn editing_id(&self) -> Option<&T::Id> {
        match &self.mode {
            SessionMode::Editing(id) => Some(id),
            _ => None,
        }
    }

    pub fn begin_create(&mut self) {
        self.mode = SessionMode::Creating;
    }

    pub fn begin_edit(&mut self, id: T::Id) {
        self.mode = SessionMode::Editing(id);
    }

    pub fn close(&mut self) {
        self.mode = SessionMode::Closed;
    }

    /// Create in create mode, Update of the edited record in edit mode.
    pub fn save_request(&self, form: FormData) -> Result<ActionRequest<T>, ActionError> {
        match &self.mode {
            SessionMode::Closed => Err(ActionError::InvalidRequest("no edit session is open".into())),
            SessionMode::Creating => ActionRequest::create(form),
            SessionMode::Editing(id) => ActionRequest::update(id.clone(), form),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action_framework::Operation;
    use crate::domain::Product;

    #[test]
    fn save_request_follows_the_mode() {
        let mut session = EditSession::<Product>::new();
        assert!(session.save_request(FormData::new()).is_err());

        session.begin_create();
        let request = session.save_request(FormData::new().with("name", "Foo")).unwrap();
        assert_eq!(request.operation(), Operation::Create);
        assert_eq!(request.target(), None);

        session.begin_edit(42);
        assert_eq!(session.editing_id(), Some(&42));
        let request = session.save_request(FormData::new().with("name", "Foo")).unwrap();
        assert_eq!(request.operation(), Operation::Update);
        assert_eq!(request.endpoint().path, "/admin/api/products/42");

        session.close();
        assert!(!session.is_open());
    }
}
