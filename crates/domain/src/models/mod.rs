pub mod agreement;
pub mod contract;
pub mod deal;
pub mod draft_pick;
pub mod fixed_asset;
pub mod player;
pub mod roster;
pub mod schedule;
pub mod swap_right;
pub mod transaction;

pub use agreement::{AgreementStatus, AssetLock, TradeAgreement};
pub use contract::{Contract, ContractOption, ContractStatus, OptionStatus, OptionType};
pub use deal::{parse_deal, canonicalize_deal, resolve_receiver, serialize_deal, Asset, Deal};
pub use draft_pick::{normalize_protection, DraftPick, PickCompensation, PickProtection};
pub use fixed_asset::FixedAsset;
pub use player::{ContractAction, Player, PlayerTradeMeta};
pub use roster::RosterEntry;
pub use schedule::{GamePhase, GameStatus, ScheduledGame};
pub use swap_right::SwapRight;
pub use transaction::TransactionEntry;
