use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod donation {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ItemStatus {
        Pending,
        Taken,
        Awaited,
        Fulfilled,
        Collected,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum UpdatedBy {
        User,
        Institute,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum RequestStatus {
        Open,
        Closed,
    }

    /// One line of an item list.
    ///
    /// Send the `id` of an existing item to keep its status and holder;
    /// omit it to add a new item.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ItemNew {
        pub id: Option<Uuid>,
        pub title: String,
        pub description: Option<String>,
        pub quantity: i64,
        /// Unit price in minor units.
        pub price: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DonationRequestNew {
        pub title: String,
        pub description: String,
        pub items: Vec<ItemNew>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct DonationRequestEdit {
        pub title: Option<String>,
        pub description: Option<String>,
        pub status: Option<RequestStatus>,
        pub items: Option<Vec<ItemNew>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemsReplace {
        pub items: Vec<ItemNew>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemStatusChange {
        pub status: ItemStatus,
    }

    /// Query string of `GET /donations`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct DonationListQuery {
        pub status: Option<RequestStatus>,
        pub institute_id: Option<Uuid>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct DonationItemView {
        pub id: Uuid,
        pub title: String,
        pub description: String,
        pub quantity: i64,
        pub price: i64,
        pub total: i64,
        pub status: ItemStatus,
        pub updated_by: UpdatedBy,
        pub taken_by: Option<Uuid>,
        pub taken_at: Option<DateTime<Utc>>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct DonationRequestView {
        pub id: Uuid,
        pub institute_id: Uuid,
        pub title: String,
        pub description: String,
        pub items: Vec<DonationItemView>,
        pub total_price: i64,
        pub amount_received: i64,
        pub status: RequestStatus,
        pub version: i64,
        pub created_at: DateTime<Utc>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        Payment,
        Donation,
        Withdraw,
        Zakat,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionStatus {
        Pending,
        Accepted,
        Cancelled,
    }

    /// Body of `POST /transactions/pay/{institute_id}`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentNew {
        #[serde(rename = "type")]
        pub kind: TransactionKind,
        pub amount_minor: i64,
        pub fee_minor: Option<i64>,
        /// Payment provider reference.
        pub external_id: Option<String>,
        /// Required for `donation`.
        pub donation_request_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WithdrawNew {
        pub amount_minor: i64,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        #[serde(rename = "type")]
        pub kind: TransactionKind,
        pub status: TransactionStatus,
        pub from_account_id: Option<Uuid>,
        pub institute_id: Uuid,
        pub amount_minor: i64,
        pub fee_minor: Option<i64>,
        pub external_id: Option<String>,
        pub donation_request_id: Option<Uuid>,
        pub occurred_at: DateTime<Utc>,
    }
}

pub mod wallet {
    use super::*;
    use crate::transaction::TransactionView;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ActivationStatus {
        NotSubmitted,
        Pending,
        Accepted,
        Rejected,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct BankDetails {
        pub bank_name: String,
        pub account_holder_name: String,
        pub account_number: String,
        pub ifsc_code: String,
        pub finance_mobile: String,
    }

    /// Body of `POST /wallets/activation`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct WalletActivationNew {
        pub bank_name: String,
        pub account_holder_name: String,
        pub account_number: String,
        pub confirm_account_number: String,
        pub ifsc_code: String,
        pub finance_mobile: String,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct WalletView {
        pub institute_id: Uuid,
        pub balance_minor: i64,
        pub total_received_minor: i64,
        pub total_withdrawn_minor: i64,
        pub is_active: bool,
        pub activation_status: ActivationStatus,
        pub bank_details: Option<BankDetails>,
        pub transactions: Vec<TransactionView>,
    }
}

pub mod admin {
    use super::*;
    use crate::{transaction::TransactionStatus, wallet::ActivationStatus};

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum WithdrawDecision {
        Accept,
        Cancel,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ActivationDecision {
        Accept,
        Reject,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct WithdrawListQuery {
        pub status: Option<TransactionStatus>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ActivationListQuery {
        pub status: Option<ActivationStatus>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WithdrawReview {
        pub decision: WithdrawDecision,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ActivationReview {
        pub decision: ActivationDecision,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct WithdrawRequestView {
        pub id: Uuid,
        pub institute_id: Uuid,
        pub transaction_id: Uuid,
        pub amount_minor: i64,
        pub status: TransactionStatus,
        pub reviewed_by: Option<Uuid>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ActivationRequestView {
        pub id: Uuid,
        pub institute_id: Uuid,
        pub status: ActivationStatus,
        pub reviewed_by: Option<Uuid>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod account {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum AccountKind {
        User,
        Institute,
        Admin,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum InstituteType {
        Masjid,
        Madrasa,
        Khanqah,
        Kabristan,
    }

    /// Public profile of an account, as listed in follows.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: Uuid,
        pub username: String,
        pub kind: AccountKind,
        pub display_name: String,
        pub location: Option<String>,
        pub institute_type: Option<InstituteType>,
    }
}

pub mod post {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum PostKind {
        Quran,
        Hadith,
        Notice,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum PostStatus {
        Active,
        Inactive,
    }

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum SharePlatform {
        Facebook,
        Twitter,
        Whatsapp,
        Instagram,
        #[default]
        CopyLink,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum AuthorRole {
        User,
        Institute,
    }

    /// Body of `POST /posts`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PostNew {
        #[serde(rename = "type")]
        pub kind: PostKind,
        pub title: String,
        pub description: Option<String>,
        pub location: Option<String>,
    }

    /// Body of `PUT /posts/{id}`. Missing fields are left unchanged.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PostEdit {
        #[serde(rename = "type")]
        pub kind: Option<PostKind>,
        pub title: Option<String>,
        pub description: Option<String>,
        pub location: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PostStatusChange {
        pub status: PostStatus,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PostListQuery {
        pub institute_id: Option<Uuid>,
    }

    /// Body of comment and reply creation.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CommentNew {
        pub text: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ShareNew {
        #[serde(default)]
        pub platform: SharePlatform,
    }

    #[derive(Clone, Copy, Debug, Serialize, Deserialize)]
    pub struct Author {
        pub role: AuthorRole,
        pub id: Uuid,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ReplyView {
        pub id: Uuid,
        pub author: Author,
        pub text: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct CommentView {
        pub id: Uuid,
        pub author: Author,
        pub text: String,
        pub created_at: DateTime<Utc>,
        pub replies: Vec<ReplyView>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct PostView {
        pub id: Uuid,
        pub institute_id: Uuid,
        #[serde(rename = "type")]
        pub kind: PostKind,
        pub title: String,
        pub description: Option<String>,
        pub location: Option<String>,
        pub status: PostStatus,
        pub likes: u64,
        pub shares: u64,
        pub comments: Vec<CommentView>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Clone, Copy, Debug, Serialize, Deserialize)]
    pub struct LikeView {
        pub liked: bool,
        pub likes: u64,
    }

    #[derive(Clone, Copy, Debug, Serialize, Deserialize)]
    pub struct ShareView {
        pub shares: u64,
    }
}
