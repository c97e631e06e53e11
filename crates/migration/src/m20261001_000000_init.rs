//! Initial schema.
//!
//! - `accounts`: users, institutes and admins
//! - `wallets`: one per institute, with bank details
//! - `donation_requests`: itemized needs published by institutes
//! - `donation_items`: lines owned by a donation request
//! - `ledger_transactions`: payments, donations and withdrawals
//! - `withdraw_requests`: withdrawals waiting for an admin
//! - `wallet_activation_requests`: bank details waiting for an admin

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
    Username,
    Password,
    Kind,
    DisplayName,
    Location,
    InstituteType,
    CreatedAt,
}

#[derive(Iden)]
enum Wallets {
    Table,
    InstituteId,
    Balance,
    TotalReceived,
    TotalWithdrawn,
    IsActive,
    ActivationStatus,
    BankName,
    AccountHolderName,
    AccountNumber,
    IfscCode,
    FinanceMobile,
    UpdatedAt,
}

#[derive(Iden)]
enum DonationRequests {
    Table,
    Id,
    InstituteId,
    Title,
    Description,
    TotalPrice,
    AmountReceived,
    Status,
    Version,
    CreatedAt,
}

#[derive(Iden)]
enum DonationItems {
    Table,
    RequestId,
    Id,
    Position,
    Title,
    Description,
    Quantity,
    Price,
    Total,
    Status,
    UpdatedBy,
    TakenBy,
    TakenAt,
}

#[derive(Iden)]
enum LedgerTransactions {
    Table,
    Id,
    Kind,
    Status,
    FromAccountId,
    InstituteId,
    AmountMinor,
    FeeMinor,
    ExternalId,
    DonationRequestId,
    OccurredAt,
}

#[derive(Iden)]
enum WithdrawRequests {
    Table,
    Id,
    InstituteId,
    TransactionId,
    AmountMinor,
    Status,
    ReviewedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum WalletActivationRequests {
    Table,
    Id,
    InstituteId,
    Status,
    ReviewedBy,
    CreatedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Accounts::Id).string().not_null().primary_key())
                    .col(
                        ColumnDef::new(Accounts::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Accounts::Password).string().not_null())
                    .col(ColumnDef::new(Accounts::Kind).string().not_null())
                    .col(ColumnDef::new(Accounts::DisplayName).string().not_null())
                    .col(ColumnDef::new(Accounts::Location).string())
                    .col(ColumnDef::new(Accounts::InstituteType).string())
                    .col(ColumnDef::new(Accounts::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Wallets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Wallets::InstituteId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Wallets::Balance).big_integer().not_null())
                    .col(
                        ColumnDef::new(Wallets::TotalReceived)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Wallets::TotalWithdrawn)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Wallets::IsActive).boolean().not_null())
                    .col(
                        ColumnDef::new(Wallets::ActivationStatus)
                            .string()
                            .not_null()
                            .default("not_submitted"),
                    )
                    .col(ColumnDef::new(Wallets::BankName).string())
                    .col(ColumnDef::new(Wallets::AccountHolderName).string())
                    .col(ColumnDef::new(Wallets::AccountNumber).string())
                    .col(ColumnDef::new(Wallets::IfscCode).string())
                    .col(ColumnDef::new(Wallets::FinanceMobile).string())
                    .col(ColumnDef::new(Wallets::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-wallets-institute_id")
                            .from(Wallets::Table, Wallets::InstituteId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DonationRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DonationRequests::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DonationRequests::InstituteId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DonationRequests::Title).string().not_null())
                    .col(
                        ColumnDef::new(DonationRequests::Description)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DonationRequests::TotalPrice)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DonationRequests::AmountReceived)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DonationRequests::Status)
                            .string()
                            .not_null()
                            .default("open"),
                    )
                    .col(
                        ColumnDef::new(DonationRequests::Version)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DonationRequests::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-donation_requests-institute_id")
                            .from(DonationRequests::Table, DonationRequests::InstituteId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-donation_requests-institute_id-created_at")
                    .table(DonationRequests::Table)
                    .col(DonationRequests::InstituteId)
                    .col(DonationRequests::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DonationItems::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(DonationItems::RequestId).string().not_null())
                    .col(ColumnDef::new(DonationItems::Id).string().not_null())
                    .col(ColumnDef::new(DonationItems::Position).integer().not_null())
                    .col(ColumnDef::new(DonationItems::Title).string().not_null())
                    .col(
                        ColumnDef::new(DonationItems::Description)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(DonationItems::Quantity)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DonationItems::Price).big_integer().not_null())
                    .col(ColumnDef::new(DonationItems::Total).big_integer().not_null())
                    .col(
                        ColumnDef::new(DonationItems::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(DonationItems::UpdatedBy)
                            .string()
                            .not_null()
                            .default("institute"),
                    )
                    .col(ColumnDef::new(DonationItems::TakenBy).string())
                    .col(ColumnDef::new(DonationItems::TakenAt).timestamp())
                    .primary_key(
                        Index::create()
                            .col(DonationItems::RequestId)
                            .col(DonationItems::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-donation_items-request_id")
                            .from(DonationItems::Table, DonationItems::RequestId)
                            .to(DonationRequests::Table, DonationRequests::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // The sweep scans held items by age.
        manager
            .create_index(
                Index::create()
                    .name("idx-donation_items-status-taken_at")
                    .table(DonationItems::Table)
                    .col(DonationItems::Status)
                    .col(DonationItems::TakenAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LedgerTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LedgerTransactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LedgerTransactions::Kind).string().not_null())
                    .col(ColumnDef::new(LedgerTransactions::Status).string().not_null())
                    .col(ColumnDef::new(LedgerTransactions::FromAccountId).string())
                    .col(
                        ColumnDef::new(LedgerTransactions::InstituteId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerTransactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LedgerTransactions::FeeMinor).big_integer())
                    .col(ColumnDef::new(LedgerTransactions::ExternalId).string())
                    .col(ColumnDef::new(LedgerTransactions::DonationRequestId).string())
                    .col(
                        ColumnDef::new(LedgerTransactions::OccurredAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-ledger_transactions-institute_id")
                            .from(LedgerTransactions::Table, LedgerTransactions::InstituteId)
                            .to(Wallets::Table, Wallets::InstituteId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_transactions-institute_id-occurred_at")
                    .table(LedgerTransactions::Table)
                    .col(LedgerTransactions::InstituteId)
                    .col(LedgerTransactions::OccurredAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_transactions-from_account_id-occurred_at")
                    .table(LedgerTransactions::Table)
                    .col(LedgerTransactions::FromAccountId)
                    .col(LedgerTransactions::OccurredAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WithdrawRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WithdrawRequests::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(WithdrawRequests::InstituteId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WithdrawRequests::TransactionId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(WithdrawRequests::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(WithdrawRequests::Status).string().not_null())
                    .col(ColumnDef::new(WithdrawRequests::ReviewedBy).string())
                    .col(
                        ColumnDef::new(WithdrawRequests::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WithdrawRequests::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-withdraw_requests-transaction_id")
                            .from(WithdrawRequests::Table, WithdrawRequests::TransactionId)
                            .to(LedgerTransactions::Table, LedgerTransactions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WalletActivationRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WalletActivationRequests::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(WalletActivationRequests::InstituteId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WalletActivationRequests::Status)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(WalletActivationRequests::ReviewedBy).string())
                    .col(
                        ColumnDef::new(WalletActivationRequests::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WalletActivationRequests::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-wallet_activation_requests-institute_id")
                            .from(
                                WalletActivationRequests::Table,
                                WalletActivationRequests::InstituteId,
                            )
                            .to(Wallets::Table, Wallets::InstituteId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Reverse order of creation (FK dependencies)
        manager
            .drop_table(Table::drop().table(WalletActivationRequests::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WithdrawRequests::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LedgerTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DonationItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DonationRequests::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Wallets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        Ok(())
    }
}
