//! Initial schema: billing tables and the seeded settings row.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Students::Table)
                    .if_not_exists()
                    .col(pk(Students::Id))
                    .col(ColumnDef::new(Students::FullName).string().not_null())
                    .col(ColumnDef::new(Students::Phone).string())
                    .col(ColumnDef::new(Students::Email).string())
                    .col(ColumnDef::new(Students::Note).text())
                    .col(ColumnDef::new(Students::IsActive).boolean().not_null().default(true))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(pk(Courses::Id))
                    .col(ColumnDef::new(Courses::Name).string().not_null())
                    .col(ColumnDef::new(Courses::CourseType).string_len(16).not_null())
                    .col(money(Courses::LessonPrice).not_null().default(0))
                    .col(money(Courses::SubscriptionPrice).not_null().default(0))
                    .col(ColumnDef::new(Courses::IsActive).boolean().not_null().default(true))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Enrollments::Table)
                    .if_not_exists()
                    .col(pk(Enrollments::Id))
                    .col(ColumnDef::new(Enrollments::StudentId).integer().not_null())
                    .col(ColumnDef::new(Enrollments::CourseId).integer().not_null())
                    .col(ColumnDef::new(Enrollments::BillingMode).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Enrollments::DiscountPct)
                            .decimal_len(5, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Enrollments::Note).text())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Enrollments::Table, Enrollments::StudentId)
                            .to(Students::Table, Students::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Enrollments::Table, Enrollments::CourseId)
                            .to(Courses::Table, Courses::Id),
                    )
                    .to_owned(),
            )
            .await?;
        unique_index(manager, "ux_enrollments_student_course", Enrollments::Table, &[
            Enrollments::StudentId,
            Enrollments::CourseId,
        ])
        .await?;

        manager
            .create_table(
                Table::create()
                    .table(PriceOverrides::Table)
                    .if_not_exists()
                    .col(pk(PriceOverrides::Id))
                    .col(ColumnDef::new(PriceOverrides::EnrollmentId).integer().not_null())
                    .col(ColumnDef::new(PriceOverrides::ValidFrom).date().not_null())
                    .col(ColumnDef::new(PriceOverrides::ValidTo).date())
                    .col(money(PriceOverrides::LessonPrice))
                    .col(money(PriceOverrides::SubscriptionPrice))
                    .foreign_key(
                        ForeignKey::create()
                            .from(PriceOverrides::Table, PriceOverrides::EnrollmentId)
                            .to(Enrollments::Table, Enrollments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_price_overrides_enrollment")
                    .table(PriceOverrides::Table)
                    .col(PriceOverrides::EnrollmentId)
                    .col(PriceOverrides::ValidFrom)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AttendanceMonths::Table)
                    .if_not_exists()
                    .col(pk(AttendanceMonths::Id))
                    .col(ColumnDef::new(AttendanceMonths::StudentId).integer().not_null())
                    .col(ColumnDef::new(AttendanceMonths::CourseId).integer().not_null())
                    .col(ColumnDef::new(AttendanceMonths::Year).integer().not_null())
                    .col(ColumnDef::new(AttendanceMonths::Month).integer().not_null())
                    .col(
                        ColumnDef::new(AttendanceMonths::LessonsCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(AttendanceMonths::Locked)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AttendanceMonths::Table, AttendanceMonths::StudentId)
                            .to(Students::Table, Students::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AttendanceMonths::Table, AttendanceMonths::CourseId)
                            .to(Courses::Table, Courses::Id),
                    )
                    .to_owned(),
            )
            .await?;
        unique_index(manager, "ux_attendance_student_course_period", AttendanceMonths::Table, &[
            AttendanceMonths::StudentId,
            AttendanceMonths::CourseId,
            AttendanceMonths::Year,
            AttendanceMonths::Month,
        ])
        .await?;

        manager
            .create_table(
                Table::create()
                    .table(Invoices::Table)
                    .if_not_exists()
                    .col(pk(Invoices::Id))
                    .col(ColumnDef::new(Invoices::StudentId).integer().not_null())
                    .col(ColumnDef::new(Invoices::PeriodYear).integer().not_null())
                    .col(ColumnDef::new(Invoices::PeriodMonth).integer().not_null())
                    .col(money(Invoices::TotalAmount).not_null().default(0))
                    .col(
                        ColumnDef::new(Invoices::Status)
                            .string_len(16)
                            .not_null()
                            .default("draft"),
                    )
                    .col(ColumnDef::new(Invoices::Number).string().unique_key())
                    .col(ColumnDef::new(Invoices::IssuedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Invoices::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Invoices::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Invoices::Table, Invoices::StudentId)
                            .to(Students::Table, Students::Id),
                    )
                    .to_owned(),
            )
            .await?;
        unique_index(manager, "ux_invoices_student_period", Invoices::Table, &[
            Invoices::StudentId,
            Invoices::PeriodYear,
            Invoices::PeriodMonth,
        ])
        .await?;

        manager
            .create_table(
                Table::create()
                    .table(InvoiceLines::Table)
                    .if_not_exists()
                    .col(pk(InvoiceLines::Id))
                    .col(ColumnDef::new(InvoiceLines::InvoiceId).integer().not_null())
                    .col(ColumnDef::new(InvoiceLines::EnrollmentId).integer().not_null())
                    .col(ColumnDef::new(InvoiceLines::Description).string().not_null())
                    .col(ColumnDef::new(InvoiceLines::Qty).integer().not_null())
                    .col(money(InvoiceLines::UnitPrice).not_null())
                    .col(money(InvoiceLines::Amount).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(InvoiceLines::Table, InvoiceLines::InvoiceId)
                            .to(Invoices::Table, Invoices::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(InvoiceLines::Table, InvoiceLines::EnrollmentId)
                            .to(Enrollments::Table, Enrollments::Id),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_invoice_lines_invoice")
                    .table(InvoiceLines::Table)
                    .col(InvoiceLines::InvoiceId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(pk(Payments::Id))
                    .col(ColumnDef::new(Payments::StudentId).integer().not_null())
                    .col(ColumnDef::new(Payments::InvoiceId).integer())
                    .col(ColumnDef::new(Payments::PaidAt).timestamp_with_time_zone().not_null())
                    .col(money(Payments::Amount).not_null())
                    .col(ColumnDef::new(Payments::Method).string_len(16).not_null())
                    .col(ColumnDef::new(Payments::Note).string().not_null().default(""))
                    .col(ColumnDef::new(Payments::CreatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Payments::Table, Payments::StudentId)
                            .to(Students::Table, Students::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Payments::Table, Payments::InvoiceId)
                            .to(Invoices::Table, Invoices::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_payments_invoice")
                    .table(Payments::Table)
                    .col(Payments::InvoiceId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_payments_student_paid_at")
                    .table(Payments::Table)
                    .col(Payments::StudentId)
                    .col(Payments::PaidAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Settings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Settings::Id).integer().not_null().primary_key())
                    .col(ColumnDef::new(Settings::OrgName).string().not_null().default(""))
                    .col(ColumnDef::new(Settings::Address).string().not_null().default(""))
                    .col(
                        ColumnDef::new(Settings::InvoicePrefix)
                            .string()
                            .not_null()
                            .default("LS"),
                    )
                    .col(ColumnDef::new(Settings::NextSeq).integer().not_null().default(1))
                    .col(ColumnDef::new(Settings::Currency).string().not_null().default("EUR"))
                    .col(ColumnDef::new(Settings::Locale).string().not_null().default("en"))
                    .to_owned(),
            )
            .await?;

        let seed = Query::insert()
            .into_table(Settings::Table)
            .columns([
                Settings::Id,
                Settings::OrgName,
                Settings::Address,
                Settings::InvoicePrefix,
                Settings::NextSeq,
                Settings::Currency,
                Settings::Locale,
            ])
            .values_panic([
                1.into(),
                "".into(),
                "".into(),
                "LS".into(),
                1.into(),
                "EUR".into(),
                "en".into(),
            ])
            .to_owned();
        manager.exec_stmt(seed).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            Payments::Table.into_iden(),
            InvoiceLines::Table.into_iden(),
            Invoices::Table.into_iden(),
            AttendanceMonths::Table.into_iden(),
            PriceOverrides::Table.into_iden(),
            Enrollments::Table.into_iden(),
            Courses::Table.into_iden(),
            Students::Table.into_iden(),
            Settings::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}

fn pk<T: IntoIden>(name: T) -> ColumnDef {
    ColumnDef::new(name)
        .integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn money<T: IntoIden>(name: T) -> ColumnDef {
    ColumnDef::new(name).decimal_len(12, 2).to_owned()
}

async fn unique_index<T>(
    manager: &SchemaManager<'_>,
    name: &str,
    table: T,
    cols: &[T],
) -> Result<(), DbErr>
where
    T: Iden + Copy + 'static,
{
    let mut index = Index::create();
    index.name(name).table(table).unique();
    for col in cols {
        index.col(*col);
    }
    manager.create_index(index.to_owned()).await
}

#[derive(DeriveIden, Clone, Copy)]
enum Students {
    Table,
    Id,
    FullName,
    Phone,
    Email,
    Note,
    IsActive,
}

#[derive(DeriveIden, Clone, Copy)]
enum Courses {
    Table,
    Id,
    Name,
    CourseType,
    LessonPrice,
    SubscriptionPrice,
    IsActive,
}

#[derive(DeriveIden, Clone, Copy)]
enum Enrollments {
    Table,
    Id,
    StudentId,
    CourseId,
    BillingMode,
    DiscountPct,
    Note,
}

#[derive(DeriveIden, Clone, Copy)]
enum PriceOverrides {
    Table,
    Id,
    EnrollmentId,
    ValidFrom,
    ValidTo,
    LessonPrice,
    SubscriptionPrice,
}

#[derive(DeriveIden, Clone, Copy)]
enum AttendanceMonths {
    Table,
    Id,
    StudentId,
    CourseId,
    Year,
    Month,
    LessonsCount,
    Locked,
}

#[derive(DeriveIden, Clone, Copy)]
enum Invoices {
    Table,
    Id,
    StudentId,
    PeriodYear,
    PeriodMonth,
    TotalAmount,
    Status,
    Number,
    IssuedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum InvoiceLines {
    Table,
    Id,
    InvoiceId,
    EnrollmentId,
    Description,
    Qty,
    UnitPrice,
    Amount,
}

#[derive(DeriveIden, Clone, Copy)]
enum Payments {
    Table,
    Id,
    StudentId,
    InvoiceId,
    PaidAt,
    Amount,
    Method,
    Note,
    CreatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum Settings {
    Table,
    Id,
    OrgName,
    Address,
    InvoicePrefix,
    NextSeq,
    Currency,
    Locale,
}
