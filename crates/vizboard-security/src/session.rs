/// The "logged in" flag of one session.
///
/// Starts cleared. Only [`crate::AccessGate::login`] can raise it, and
/// nothing lowers it again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionFlag {
    logged_in: bool,
}

impl SessionFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    pub(crate) fn raise(&mut self) {
        self.logged_in = true;
    }
}
