//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{AccountKind, InstituteType, PostKind, RequestStatus, TransactionKind};

/// Bootstrap a new account.
#[derive(Clone, Debug)]
pub struct NewAccount {
    pub username: String,
    pub password: String,
    pub kind: AccountKind,
    pub display_name: String,
    pub location: Option<String>,
    pub institute_type: Option<InstituteType>,
}

impl NewAccount {
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        kind: AccountKind,
    ) -> Self {
        let username = username.into();
        Self {
            display_name: username.clone(),
            username,
            password: password.into(),
            kind,
            location: None,
            institute_type: None,
        }
    }

    #[must_use]
    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    #[must_use]
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    #[must_use]
    pub fn institute_type(mut self, institute_type: InstituteType) -> Self {
        self.institute_type = Some(institute_type);
        self
    }
}

/// One line of an item list sent by an institute.
///
/// `id` refers to an item already stored in the request; items without an
/// id are created as new `pending` items.
#[derive(Clone, Debug)]
pub struct ItemInput {
    pub id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub quantity: i64,
    pub price: i64,
}

impl ItemInput {
    #[must_use]
    pub fn new(title: impl Into<String>, quantity: i64, price: i64) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: None,
            quantity,
            price,
        }
    }

    #[must_use]
    pub fn id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Create a donation request.
#[derive(Clone, Debug)]
pub struct NewDonationRequest {
    pub institute_id: Uuid,
    pub title: String,
    pub description: String,
    pub items: Vec<ItemInput>,
    pub created_at: DateTime<Utc>,
}

impl NewDonationRequest {
    #[must_use]
    pub fn new(
        institute_id: Uuid,
        title: impl Into<String>,
        description: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            institute_id,
            title: title.into(),
            description: description.into(),
            items: Vec::new(),
            created_at,
        }
    }

    #[must_use]
    pub fn item(mut self, item: ItemInput) -> Self {
        self.items.push(item);
        self
    }

    #[must_use]
    pub fn items(mut self, items: Vec<ItemInput>) -> Self {
        self.items = items;
        self
    }
}

/// Partial update of a donation request.
///
/// Unset fields are left unchanged. A non-empty `items` list replaces the
/// item list with the same semantics as [`Engine::edit_items`](crate::Engine::edit_items).
#[derive(Clone, Debug, Default)]
pub struct DonationRequestPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<RequestStatus>,
    pub items: Option<Vec<ItemInput>>,
}

impl DonationRequestPatch {
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn status(mut self, status: RequestStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn items(mut self, items: Vec<ItemInput>) -> Self {
        self.items = Some(items);
        self
    }
}

/// Filter for listing donation requests.
#[derive(Clone, Debug, Default)]
pub struct DonationRequestFilter {
    pub status: Option<RequestStatus>,
    pub institute_id: Option<Uuid>,
}

/// Record a payment from a user to an institute.
#[derive(Clone, Debug)]
pub struct PaymentCmd {
    pub user_id: Uuid,
    pub institute_id: Uuid,
    pub kind: TransactionKind,
    pub amount_minor: i64,
    pub fee_minor: Option<i64>,
    pub external_id: Option<String>,
    pub donation_request_id: Option<Uuid>,
    pub occurred_at: DateTime<Utc>,
}

impl PaymentCmd {
    #[must_use]
    pub fn new(
        user_id: Uuid,
        institute_id: Uuid,
        kind: TransactionKind,
        amount_minor: i64,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            institute_id,
            kind,
            amount_minor,
            fee_minor: None,
            external_id: None,
            donation_request_id: None,
            occurred_at,
        }
    }

    /// A `donation` payment credited to one of the institute's requests.
    #[must_use]
    pub fn donation(
        user_id: Uuid,
        institute_id: Uuid,
        donation_request_id: Uuid,
        amount_minor: i64,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self::new(
            user_id,
            institute_id,
            TransactionKind::Donation,
            amount_minor,
            occurred_at,
        )
        .donation_request_id(donation_request_id)
    }

    #[must_use]
    pub fn fee(mut self, fee_minor: i64) -> Self {
        self.fee_minor = Some(fee_minor);
        self
    }

    #[must_use]
    pub fn external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }

    #[must_use]
    pub fn donation_request_id(mut self, donation_request_id: Uuid) -> Self {
        self.donation_request_id = Some(donation_request_id);
        self
    }
}

/// Bank details submitted with a wallet activation request.
#[derive(Clone, Debug, Default)]
pub struct BankDetailsInput {
    pub bank_name: String,
    pub account_holder_name: String,
    pub account_number: String,
    pub confirm_account_number: String,
    pub ifsc_code: String,
    pub finance_mobile: String,
}

/// Publish a post for an institute.
#[derive(Clone, Debug)]
pub struct NewPost {
    pub institute_id: Uuid,
    pub kind: PostKind,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewPost {
    #[must_use]
    pub fn new(
        institute_id: Uuid,
        kind: PostKind,
        title: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            institute_id,
            kind,
            title: title.into(),
            description: None,
            location: None,
            created_at,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// Partial update of a post. Unset fields are left unchanged; a blank
/// description or location clears it.
#[derive(Clone, Debug, Default)]
pub struct PostPatch {
    pub kind: Option<PostKind>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
}

impl PostPatch {
    #[must_use]
    pub fn kind(mut self, kind: PostKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// Filter for listing active posts.
#[derive(Clone, Debug, Default)]
pub struct PostFilter {
    pub institute_id: Option<Uuid>,
    /// Posts this user blocked are left out.
    pub viewer: Option<Uuid>,
}
