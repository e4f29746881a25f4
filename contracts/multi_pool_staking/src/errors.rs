use common::{AccessError, PauseError};

/// Error categories used to classify [`ContractError`] values for callers
/// and monitoring.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ErrorCategory {
    /// Contract or pool lifecycle problems: not initialized, unknown pool.
    Lifecycle = 1,
    /// The request breaks a pool or ledger rule. Retrying unchanged never helps.
    PolicyViolation = 2,
    /// Missing role, paused feature, or a nested call.
    AuthorizationFailure = 3,
    /// Nothing available yet, or not enough reward funding. May succeed later.
    ResourceExhaustion = 4,
    /// The registry would become inconsistent. Raised at pool creation only.
    IntegrityViolation = 5,
}

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    // ── Lifecycle (1–9) ──────────────────────────────────────
    NotInitialized = 1,
    AlreadyInitialized = 2,
    PoolNotFound = 3,

    // ── Authorization (10–19) ────────────────────────────────
    Unauthorized = 10,
    GloballyPaused = 11,
    FeaturePaused = 12,
    Reentrancy = 13,
    LastSuperAdmin = 14,

    // ── Policy (20–29) ───────────────────────────────────────
    BelowMinDeposit = 20,
    InvalidAmount = 21,
    InsufficientStake = 22,
    InvalidWeight = 23,
    InvalidLockPeriod = 24,
    InvalidRewardRate = 25,

    // ── Resources (30–39) ────────────────────────────────────
    NothingWithdrawable = 30,
    NothingToClaim = 31,
    InsufficientRewardBalance = 32,
    MathOverflow = 33,

    // ── Registry integrity (40–49) ───────────────────────────
    InvalidFirstPool = 40,
    DuplicateAsset = 41,
    TokensIdentical = 42,
}

impl ContractError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ContractError::NotInitialized
            | ContractError::AlreadyInitialized
            | ContractError::PoolNotFound => ErrorCategory::Lifecycle,

            ContractError::Unauthorized
            | ContractError::GloballyPaused
            | ContractError::FeaturePaused
            | ContractError::Reentrancy
            | ContractError::LastSuperAdmin => ErrorCategory::AuthorizationFailure,

            ContractError::BelowMinDeposit
            | ContractError::InvalidAmount
            | ContractError::InsufficientStake
            | ContractError::InvalidWeight
            | ContractError::InvalidLockPeriod
            | ContractError::InvalidRewardRate => ErrorCategory::PolicyViolation,

            ContractError::NothingWithdrawable
            | ContractError::NothingToClaim
            | ContractError::InsufficientRewardBalance
            | ContractError::MathOverflow => ErrorCategory::ResourceExhaustion,

            ContractError::InvalidFirstPool
            | ContractError::DuplicateAsset
            | ContractError::TokensIdentical => ErrorCategory::IntegrityViolation,
        }
    }

    /// Whether the identical call may succeed later without any change by
    /// the caller (more height elapsed, more reward funding, unpause).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ContractError::GloballyPaused
                | ContractError::FeaturePaused
                | ContractError::NothingWithdrawable
                | ContractError::NothingToClaim
                | ContractError::InsufficientRewardBalance
        )
    }
}

impl From<AccessError> for ContractError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::NotSuperAdmin => ContractError::Unauthorized,
            AccessError::LastSuperAdmin => ContractError::LastSuperAdmin,
        }
    }
}

impl From<PauseError> for ContractError {
    fn from(err: PauseError) -> Self {
        match err {
            PauseError::Global => ContractError::GloballyPaused,
            PauseError::Feature(_) => ContractError::FeaturePaused,
        }
    }
}

/// Maps a checked-arithmetic `None` to [`ContractError::MathOverflow`].
pub(crate) fn checked<T>(value: Option<T>) -> Result<T, ContractError> {
    value.ok_or(ContractError::MathOverflow)
}
