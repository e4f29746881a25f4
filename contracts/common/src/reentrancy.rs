use soroban_sdk::{symbol_short, Env, Symbol};

const LOCKED: Symbol = symbol_short!("LOCKED");

/// Call-scoped lock held for the lifetime of one entry point.
///
/// [`ReentrancyGuard::enter`] sets the flag and returns the guard; dropping the
/// guard clears it, on the success path and on early `?` returns alike.
pub struct ReentrancyGuard {
    env: Env,
}

impl ReentrancyGuard {
    /// Returns `None` if another call into this contract is still in progress.
    pub fn enter(env: &Env) -> Option<Self> {
        if Self::is_locked(env) {
            return None;
        }
        env.storage().instance().set(&LOCKED, &true);
        Some(Self { env: env.clone() })
    }

    pub fn is_locked(env: &Env) -> bool {
        env.storage().instance().get(&LOCKED).unwrap_or(false)
    }
}

impl Drop for ReentrancyGuard {
    fn drop(&mut self) {
        self.env.storage().instance().remove(&LOCKED);
    }
}
