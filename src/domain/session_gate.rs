use tokio::sync::broadcast::error::RecvError;

use crate::{
    constants::LOGIN_PATH,
    entities::user::SessionUser,
    repositories::identity::SessionSubscription,
};

#[derive(Debug, Clone, PartialEq)]
pub enum GateState {
    Checking,
    Authenticated(SessionUser),
    Unauthenticated,
}

/// What a protected route does in the current gate state.
#[derive(Debug, Clone, PartialEq)]
pub enum GateOutcome {
    Loading,
    Render(SessionUser),
    Redirect(&'static str),
}

/// Guards a protected route. Leaves `Checking` on the first session report
/// and never changes state again.
#[derive(Debug)]
pub struct SessionGate {
    state: GateState,
}

impl Default for SessionGate {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionGate {
    pub fn new() -> Self {
        SessionGate { state: GateState::Checking }
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    /// Applies a session report. Returns false when the gate had already
    /// settled and the report was ignored.
    pub fn resolve(&mut self, session: Option<SessionUser>) -> bool {
        if self.state != GateState::Checking {
            return false;
        }

        self.state = match session {
            Some(user) => GateState::Authenticated(user),
            None => GateState::Unauthenticated,
        };
        true
    }

    pub fn outcome(&self) -> GateOutcome {
        match &self.state {
            GateState::Checking => GateOutcome::Loading,
            GateState::Authenticated(user) => GateOutcome::Render(user.clone()),
            GateState::Unauthenticated => GateOutcome::Redirect(LOGIN_PATH),
        }
    }

    /// Waits for the next session report on a subscription and settles on it.
    /// A closed channel counts as signed out.
    pub async fn await_session(&mut self, subscription: &mut SessionSubscription) -> GateOutcome {
        while self.state == GateState::Checking {
            match subscription.recv().await {
                Ok(session) => {
                    self.resolve(session);
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Session gate lagged behind session events");
                }
                Err(RecvError::Closed) => {
                    self.resolve(None);
                }
            }
        }
        self.outcome()
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::broadcast;
    use uuid::Uuid;

    use super::*;

    fn admin() -> SessionUser {
        SessionUser {
            id: Uuid::new_v4(),
            email: "admin@example.com".into(),
            is_admin: true,
        }
    }

    #[test]
    fn checking_shows_loading() {
        assert_eq!(SessionGate::new().outcome(), GateOutcome::Loading);
    }

    #[test]
    fn no_session_redirects_to_login() {
        let mut gate = SessionGate::new();
        gate.resolve(None);

        assert_eq!(gate.outcome(), GateOutcome::Redirect("/login"));
    }

    #[test]
    fn session_renders_with_user() {
        let user = admin();
        let mut gate = SessionGate::new();
        gate.resolve(Some(user.clone()));

        assert_eq!(gate.outcome(), GateOutcome::Render(user));
    }

    #[test]
    fn later_reports_are_ignored() {
        let mut gate = SessionGate::new();
        assert!(gate.resolve(None));
        assert!(!gate.resolve(Some(admin())));

        assert_eq!(gate.state(), &GateState::Unauthenticated);
    }

    #[tokio::test]
    async fn settles_on_first_broadcast() {
        let (tx, mut rx) = broadcast::channel(4);
        let user = admin();
        tx.send(Some(user.clone())).unwrap();
        tx.send(None).unwrap();

        let mut gate = SessionGate::new();
        let outcome = gate.await_session(&mut rx).await;

        assert_eq!(outcome, GateOutcome::Render(user));
    }

    #[tokio::test]
    async fn closed_channel_redirects() {
        let (tx, mut rx) = broadcast::channel::<Option<SessionUser>>(1);
        drop(tx);

        let mut gate = SessionGate::new();
        assert_eq!(gate.await_session(&mut rx).await, GateOutcome::Redirect("/login"));
    }
}
