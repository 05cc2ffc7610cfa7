use crate::backend::BackendService;
use crate::domain::SessionUser;
use crate::error::AppError;

/// Identifier handed out by [`SessionContext::subscribe`]; pass it back to
/// [`SessionContext::unsubscribe`] on teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u64);

type Listener = Box<dyn Fn(Option<&SessionUser>) + Send>;

/// Owns the current session user and the single subscription point for session-change
/// notifications. Constructed once and injected wherever identity is needed; no global
/// auth state exists anywhere else.
#[derive(Default)]
pub struct SessionContext {
    user: Option<SessionUser>,
    next_listener_id: u64,
    listeners: Vec<(u64, Listener)>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    /// Register a session-change callback. Fires on every change until unsubscribed.
    pub fn subscribe(&mut self, listener: impl Fn(Option<&SessionUser>) + Send + 'static) -> ListenerId {
        let id = self.next_listener_id;
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(listener)));
        ListenerId(id)
    }

    /// Remove a previously registered callback; returns whether it was present.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id.0);
        self.listeners.len() != before
    }

    fn set_user(&mut self, user: Option<SessionUser>) {
        if self.user == user {
            return;
        }
        self.user = user;
        for (_, listener) in &self.listeners {
            listener(self.user.as_ref());
        }
    }

    /// Ask the backend for the current session user and notify subscribers when it
    /// changed.
    pub fn refresh(&mut self, backend: &dyn BackendService) -> Result<Option<SessionUser>, AppError> {
        let user = backend.current_user()?;
        self.set_user(user);
        Ok(self.user.clone())
    }

    /// Delegate sign-out to the backend, then clear the local user and notify.
    pub fn sign_out(&mut self, backend: &dyn BackendService) -> Result<(), AppError> {
        backend.sign_out()?;
        self.set_user(None);
        Ok(())
    }
}
