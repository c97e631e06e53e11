//! The module contains the institute `Wallet` and its table.
//!
//! Every institute has exactly one wallet, keyed by the institute id. The
//! wallet tracks the spendable balance plus running totals, and the bank
//! details an admin must approve before withdrawals can be paid out.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationStatus {
    #[default]
    NotSubmitted,
    Pending,
    Accepted,
    Rejected,
}

impl ActivationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotSubmitted => "not_submitted",
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl TryFrom<&str> for ActivationStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "not_submitted" => Ok(Self::NotSubmitted),
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(EngineError::Validation(format!(
                "invalid activation status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankDetails {
    pub bank_name: String,
    pub account_holder_name: String,
    pub account_number: String,
    pub ifsc_code: String,
    pub finance_mobile: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub institute_id: Uuid,
    pub balance: i64,
    pub total_received: i64,
    pub total_withdrawn: i64,
    pub is_active: bool,
    pub activation_status: ActivationStatus,
    pub bank_details: Option<BankDetails>,
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    pub fn new(institute_id: Uuid, updated_at: DateTime<Utc>) -> Self {
        Self {
            institute_id,
            balance: 0,
            total_received: 0,
            total_withdrawn: 0,
            is_active: false,
            activation_status: ActivationStatus::NotSubmitted,
            bank_details: None,
            updated_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "wallets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub institute_id: String,
    pub balance: i64,
    pub total_received: i64,
    pub total_withdrawn: i64,
    pub is_active: bool,
    pub activation_status: String,
    pub bank_name: Option<String>,
    pub account_holder_name: Option<String>,
    pub account_number: Option<String>,
    pub ifsc_code: Option<String>,
    pub finance_mobile: Option<String>,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::InstituteId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Accounts,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Wallet> for ActiveModel {
    fn from(wallet: &Wallet) -> Self {
        let bank = wallet.bank_details.as_ref();
        Self {
            institute_id: ActiveValue::Set(wallet.institute_id.to_string()),
            balance: ActiveValue::Set(wallet.balance),
            total_received: ActiveValue::Set(wallet.total_received),
            total_withdrawn: ActiveValue::Set(wallet.total_withdrawn),
            is_active: ActiveValue::Set(wallet.is_active),
            activation_status: ActiveValue::Set(wallet.activation_status.as_str().to_string()),
            bank_name: ActiveValue::Set(bank.map(|b| b.bank_name.clone())),
            account_holder_name: ActiveValue::Set(bank.map(|b| b.account_holder_name.clone())),
            account_number: ActiveValue::Set(bank.map(|b| b.account_number.clone())),
            ifsc_code: ActiveValue::Set(bank.map(|b| b.ifsc_code.clone())),
            finance_mobile: ActiveValue::Set(bank.map(|b| b.finance_mobile.clone())),
            updated_at: ActiveValue::Set(wallet.updated_at),
        }
    }
}

impl TryFrom<Model> for Wallet {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let bank_details = match (
            model.bank_name,
            model.account_holder_name,
            model.account_number,
            model.ifsc_code,
            model.finance_mobile,
        ) {
            (
                Some(bank_name),
                Some(account_holder_name),
                Some(account_number),
                Some(ifsc_code),
                Some(finance_mobile),
            ) => Some(BankDetails {
                bank_name,
                account_holder_name,
                account_number,
                ifsc_code,
                finance_mobile,
            }),
            _ => None,
        };
        Ok(Self {
            institute_id: parse_uuid(&model.institute_id, "institute")?,
            activation_status: ActivationStatus::try_from(model.activation_status.as_str())?,
            balance: model.balance,
            total_received: model.total_received,
            total_withdrawn: model.total_withdrawn,
            is_active: model.is_active,
            bank_details,
            updated_at: model.updated_at,
        })
    }
}
