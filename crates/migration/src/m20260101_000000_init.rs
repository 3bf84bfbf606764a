//! Initial schema migration - creates all tables from scratch.
//!
//! Complete schema for the back office:
//!
//! - `users`: authentication and roles (admin, mentor, student)
//! - `courses`: catalog entries with a price
//! - `enrollments`: one (student, course) pair with the paid aggregate
//! - `payments`: financial transactions with commission/fee breakdown
//! - `mentor_assignments`: mentor-to-enrollment links
//! - `discounts`: redeemable codes
//! - `discount_applications`: one redeemed (discount, enrollment) pair

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
    Role,
    Email,
}

#[derive(Iden)]
enum Courses {
    Table,
    Id,
    Title,
    PriceMinor,
    Active,
}

#[derive(Iden)]
enum Enrollments {
    Table,
    Id,
    StudentId,
    CourseId,
    Status,
    TotalAmountMinor,
    PaidAmountMinor,
    StartDate,
    EndDate,
}

#[derive(Iden)]
enum Payments {
    Table,
    Id,
    EnrollmentId,
    AmountMinor,
    MentorCommissionMinor,
    PlatformFeeMinor,
    Status,
    PaidAt,
    PayerId,
    AssignmentId,
    GatewayReference,
}

#[derive(Iden)]
enum MentorAssignments {
    Table,
    Id,
    MentorId,
    StudentId,
    CourseId,
    EnrollmentId,
    CommissionBps,
    Status,
}

#[derive(Iden)]
enum Discounts {
    Table,
    Id,
    Code,
    Kind,
    Value,
    MinAmountMinor,
    MaxDiscountMinor,
    UsageLimit,
    UsedCount,
    Active,
    StartsAt,
    EndsAt,
}

#[derive(Iden)]
enum DiscountApplications {
    Table,
    Id,
    DiscountId,
    EnrollmentId,
    AmountMinor,
    AppliedBy,
    AppliedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string()
                            .not_null()
                            .default("student"),
                    )
                    .col(ColumnDef::new(Users::Email).string())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Courses
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Courses::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Courses::Title).string().not_null())
                    .col(
                        ColumnDef::new(Courses::PriceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Courses::Active).boolean().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Enrollments
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Enrollments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Enrollments::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Enrollments::StudentId).string().not_null())
                    .col(ColumnDef::new(Enrollments::CourseId).string().not_null())
                    .col(ColumnDef::new(Enrollments::Status).string().not_null())
                    .col(
                        ColumnDef::new(Enrollments::TotalAmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Enrollments::PaidAmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Enrollments::StartDate)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Enrollments::EndDate).timestamp())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-enrollments-student_id")
                            .from(Enrollments::Table, Enrollments::StudentId)
                            .to(Users::Table, Users::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-enrollments-course_id")
                            .from(Enrollments::Table, Enrollments::CourseId)
                            .to(Courses::Table, Courses::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-enrollments-student_id-course_id-unique")
                    .table(Enrollments::Table)
                    .col(Enrollments::StudentId)
                    .col(Enrollments::CourseId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Payments
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Payments::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Payments::EnrollmentId).string().not_null())
                    .col(
                        ColumnDef::new(Payments::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Payments::MentorCommissionMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Payments::PlatformFeeMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Payments::Status).string().not_null())
                    .col(ColumnDef::new(Payments::PaidAt).timestamp().not_null())
                    .col(ColumnDef::new(Payments::PayerId).string().not_null())
                    .col(ColumnDef::new(Payments::AssignmentId).string())
                    .col(ColumnDef::new(Payments::GatewayReference).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-payments-enrollment_id")
                            .from(Payments::Table, Payments::EnrollmentId)
                            .to(Enrollments::Table, Enrollments::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-payments-enrollment_id")
                    .table(Payments::Table)
                    .col(Payments::EnrollmentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-payments-gateway_reference-unique")
                    .table(Payments::Table)
                    .col(Payments::GatewayReference)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Mentor assignments
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(MentorAssignments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MentorAssignments::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MentorAssignments::MentorId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MentorAssignments::StudentId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MentorAssignments::CourseId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MentorAssignments::EnrollmentId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MentorAssignments::CommissionBps)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MentorAssignments::Status).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-mentor_assignments-mentor_id")
                            .from(MentorAssignments::Table, MentorAssignments::MentorId)
                            .to(Users::Table, Users::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-mentor_assignments-enrollment_id")
                            .from(MentorAssignments::Table, MentorAssignments::EnrollmentId)
                            .to(Enrollments::Table, Enrollments::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-mentor_assignments-mentor_id-enrollment_id-unique")
                    .table(MentorAssignments::Table)
                    .col(MentorAssignments::MentorId)
                    .col(MentorAssignments::EnrollmentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Discounts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Discounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Discounts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Discounts::Code).string().not_null())
                    .col(ColumnDef::new(Discounts::Kind).string().not_null())
                    .col(ColumnDef::new(Discounts::Value).big_integer().not_null())
                    .col(ColumnDef::new(Discounts::MinAmountMinor).big_integer())
                    .col(ColumnDef::new(Discounts::MaxDiscountMinor).big_integer())
                    .col(ColumnDef::new(Discounts::UsageLimit).integer())
                    .col(ColumnDef::new(Discounts::UsedCount).integer().not_null())
                    .col(ColumnDef::new(Discounts::Active).boolean().not_null())
                    .col(ColumnDef::new(Discounts::StartsAt).timestamp())
                    .col(ColumnDef::new(Discounts::EndsAt).timestamp())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-discounts-code-unique")
                    .table(Discounts::Table)
                    .col(Discounts::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Discount applications
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(DiscountApplications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DiscountApplications::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DiscountApplications::DiscountId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DiscountApplications::EnrollmentId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DiscountApplications::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DiscountApplications::AppliedBy)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DiscountApplications::AppliedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-discount_applications-discount_id")
                            .from(
                                DiscountApplications::Table,
                                DiscountApplications::DiscountId,
                            )
                            .to(Discounts::Table, Discounts::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-discount_applications-enrollment_id")
                            .from(
                                DiscountApplications::Table,
                                DiscountApplications::EnrollmentId,
                            )
                            .to(Enrollments::Table, Enrollments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-discount_applications-discount_id-enrollment_id-unique")
                    .table(DiscountApplications::Table)
                    .col(DiscountApplications::DiscountId)
                    .col(DiscountApplications::EnrollmentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(DiscountApplications::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Discounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MentorAssignments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Enrollments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
