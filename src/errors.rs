//! Solidity-compatible errors and events shared by every engine in the crate.
//!
//! Errors are declared with `sol!` so each rejection carries the same 4-byte selector
//! and ABI payload a contract revert would, and are wrapped in [`Errors`] for use with `?`.

use alloy_sol_types::{sol, SolError};
use core::fmt;

// Declare Solidity error types and events
sol! {
    // Authorization
    error NotWhitelisted();
    error NotAdmin();
    error NotOwner();
    error NotTeam();
    error NotPauser();
    error NotSuperAdmin();
    error NotParticipant();

    // Time windows
    error NotOpen();
    error SaleClosed();
    error SaleNotClosed();
    error OnlyAfterListing();
    error Unchangeable();

    // Limits
    error BelowMinContribution();
    error AboveMaxContribution();
    error GlobalCapExceeded();
    error HardCapExceeded();
    error AllocationCapExceeded();
    error OutOfShare(uint256 available);
    error InsufficientStake();
    error MustDecrease();
    error InvalidExtension();
    error InvalidLimits();

    // Invariants
    error CapExceeded();
    error InvalidAddress();
    error InvalidAdvisor();
    error AdvisorExists();
    error AlreadyImported();
    error InsufficientBalance();
    error InsufficientAllowance();
    error Overflow();
    error ZeroValueArgumentInjected();
    error OracleUnavailable();
    error InvalidPrice();
    error UnknownContract();
    error TransferFailed();
    error InvalidConfig();
    error NotPausable();

    // Token
    event Transfer(address indexed from, address indexed to, uint256 value);
    event Approval(address indexed owner, address indexed spender, uint256 value);
    event OwnershipTransferred(address indexed previous_owner, address indexed new_owner);

    // Sale
    event TokensPurchased(address indexed participant, uint256 dollar_units, uint256 tokens);
    event PrivateAllocationSet(address indexed participant, uint256 amount);
    event ClosingTimeExtended(uint256 previous_closing_time, uint256 new_closing_time);
    event ReserveDecreased(uint256 previous_reserve, uint256 new_reserve);
    event PriceFeedChanged(uint8 kind, address feed);
    event StableAssetChanged(address asset);
    event Paused(address account);
    event Unpaused(address account);

    // Treasury
    event ListingTimeChanged(uint256 previous_listing_time, uint256 new_listing_time);
    event ShareWithdrawn(address indexed holder, uint8 bucket, uint256 amount);
    event AdvisorUpdated(address indexed advisor, uint256 increase_in_allowance);
    event AllocationsImported(address indexed sale, uint256 participants);

    // Staking
    event Staked(address indexed account, uint256 amount);
    event Unstaked(address indexed account, uint256 amount);
}

macro_rules! errors {
    ($($name:ident => $reason:tt,)*) => {
        /// Every rejection an engine operation can produce.
        #[derive(thiserror::Error)]
        pub enum Errors {
            $(
                #[error($reason)]
                $name($name),
            )*
        }

        impl Errors {
            /// ABI-encoded revert payload: selector followed by the error arguments.
            pub fn revert_data(&self) -> Vec<u8> {
                match self {
                    $(Errors::$name(e) => e.abi_encode(),)*
                }
            }

            /// 4-byte selector of the underlying Solidity error.
            pub fn selector(&self) -> [u8; 4] {
                match self {
                    $(Errors::$name(_) => <$name as SolError>::SELECTOR,)*
                }
            }

            /// Solidity name of the error, e.g. `HardCapExceeded`.
            pub fn name(&self) -> &'static str {
                match self {
                    $(Errors::$name(_) => stringify!($name),)*
                }
            }
        }
    };
}

errors! {
    NotWhitelisted => "caller does not have the whitelisted role",
    NotAdmin => "caller does not have the admin role",
    NotOwner => "caller is not the owner",
    NotTeam => "caller is not the team wallet",
    NotPauser => "caller does not have the pauser role",
    NotSuperAdmin => "caller is not the super admin",
    NotParticipant => "caller did not take part in the sale",
    NotOpen => "sale not open",
    SaleClosed => "sale is closed",
    SaleNotClosed => "sale is not closed yet",
    OnlyAfterListing => "only callable after listing",
    Unchangeable => "listing time unchangeable after listing",
    BelowMinContribution => "minimum contribution not reached",
    AboveMaxContribution => "contribution range for this round exceeded",
    GlobalCapExceeded => "participant contribution ceiling exceeded",
    HardCapExceeded => "hard cap exceeded",
    AllocationCapExceeded => "private allocation exceeds the allocation cap",
    OutOfShare => "insufficient unlocked share",
    InsufficientStake => "insufficient staked tokens",
    MustDecrease => "new reserve can only be decreased",
    InvalidExtension => "new closing time must be after the current one",
    InvalidLimits => "minimum contribution above maximum",
    CapExceeded => "cap exceeded",
    InvalidAddress => "zero address",
    InvalidAdvisor => "not an advisor",
    AdvisorExists => "advisor already registered",
    AlreadyImported => "allocations already imported from this sale",
    InsufficientBalance => "insufficient balance",
    InsufficientAllowance => "insufficient allowance",
    Overflow => "arithmetic overflow",
    ZeroValueArgumentInjected => "zero value argument",
    OracleUnavailable => "price feed unavailable",
    InvalidPrice => "price feed returned a non-positive answer",
    UnknownContract => "no contract at address",
    TransferFailed => "transfer failed",
    InvalidConfig => "invalid configuration",
    NotPausable => "sale cannot be paused",
}

impl fmt::Debug for Errors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{})", self.name(), hex::encode(self.revert_data()))
    }
}

/// Trace a rejected operation with its revert payload and hand the error back.
pub(crate) fn rejected(operation: &'static str, err: Errors) -> Errors {
    tracing::debug!(
        operation,
        reason = %err,
        revert = %hex::encode(err.revert_data()),
        "operation rejected"
    );
    err
}

impl From<Errors> for Vec<u8> {
    fn from(err: Errors) -> Vec<u8> {
        err.revert_data()
    }
}
