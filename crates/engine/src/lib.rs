pub use accounts::{Account, AccountKind, InstituteType};
pub use activation_requests::{ActivationDecision, ActivationRequest};
pub use actor::Actor;
pub use allocation::allocate;
pub use commands::{
    BankDetailsInput, DonationRequestFilter, DonationRequestPatch, ItemInput, NewAccount,
    NewDonationRequest, NewPost, PaymentCmd, PostFilter, PostPatch,
};
pub use donation_items::{DonationItem, ItemStatus, UpdatedBy};
pub use donation_requests::{DonationRequest, RequestStatus};
pub use error::EngineError;
pub use ledger::{Transaction, TransactionKind, TransactionStatus};
pub use ops::{Engine, EngineBuilder, SweepReport, WalletView};
pub use post_comments::Comment;
pub use post_reactions::{LikeOutcome, SharePlatform};
pub use post_replies::Reply;
pub use posts::{Post, PostKind, PostStatus};
pub use wallets::{ActivationStatus, BankDetails, Wallet};
pub use withdraw_requests::{WithdrawDecision, WithdrawRequest};

mod accounts;
mod activation_requests;
mod actor;
mod allocation;
mod commands;
mod donation_items;
mod donation_requests;
mod error;
mod follows;
mod ledger;
mod lifecycle;
mod ops;
mod post_comments;
mod post_reactions;
mod post_replies;
mod posts;
mod util;
mod wallets;
mod withdraw_requests;

pub type ResultEngine<T> = Result<T, EngineError>;
