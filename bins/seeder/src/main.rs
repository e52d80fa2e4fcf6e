//! Demo data seeder for Classbill development.
//!
//! Seeds organization settings, a handful of students, courses, enrollments
//! and attendance for the current month, so a billing run has something to do.
//! Student and attendance management live outside this service; this binary
//! only stands in for them locally.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::{Datelike, Utc};
use classbill_db::entities::{
    attendance_months, courses, enrollments, sea_orm_active_enums::CourseType, settings, students,
};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set};

/// (name, lesson price in cents, subscription price in cents, type)
const COURSES: [(&str, i64, i64, CourseType); 3] = [
    ("English A2 group", 1500, 0, CourseType::Group),
    ("Math private", 2500, 0, CourseType::Individual),
    ("Chess club", 0, 12000, CourseType::Group),
];

/// (student, course index, billing mode, discount %, lessons this month)
const ENROLLMENTS: [(&str, usize, &str, i64, i32); 5] = [
    ("Ana Kovac", 0, "per_lesson", 20, 8),
    ("Ana Kovac", 2, "subscription", 0, 0),
    ("Ivo Horvat", 1, "per_lesson", 0, 4),
    ("Mia Babic", 0, "per_lesson", 10, 6),
    ("Mia Babic", 2, "subscription", 50, 0),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    println!("Connecting to database...");
    let db = classbill_db::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    if students::Entity::find().count(&db).await? > 0 {
        println!("Students already present, skipping...");
        return Ok(());
    }

    println!("Seeding organization settings...");
    seed_settings(&db).await?;

    println!("Seeding courses...");
    let course_ids = seed_courses(&db).await?;

    println!("Seeding students, enrollments and attendance...");
    seed_enrollments(&db, &course_ids).await?;

    println!("Seeding complete!");
    Ok(())
}

async fn seed_settings(db: &DatabaseConnection) -> anyhow::Result<()> {
    let row = settings::Entity::find_by_id(settings::SINGLETON_ID)
        .one(db)
        .await?
        .context("settings row missing, run the migrator first")?;

    let mut active: settings::ActiveModel = row.into();
    active.org_name = Set("Demo Language School".to_string());
    active.address = Set("1 Main Street".to_string());
    active.update(db).await?;
    Ok(())
}

async fn seed_courses(db: &DatabaseConnection) -> anyhow::Result<Vec<i32>> {
    let mut ids = Vec::with_capacity(COURSES.len());
    for (name, lesson_cents, subscription_cents, course_type) in COURSES {
        let course = courses::ActiveModel {
            name: Set(name.to_string()),
            course_type: Set(course_type),
            lesson_price: Set(Decimal::new(lesson_cents, 2)),
            subscription_price: Set(Decimal::new(subscription_cents, 2)),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(db)
        .await?;
        println!("  Created course: {name}");
        ids.push(course.id);
    }
    Ok(ids)
}

async fn seed_enrollments(db: &DatabaseConnection, course_ids: &[i32]) -> anyhow::Result<()> {
    let today = Utc::now().date_naive();
    let month = i32::try_from(today.month()).context("month out of range")?;
    let mut student_ids: Vec<(&str, i32)> = Vec::new();

    for (name, course_idx, mode, discount, lessons) in ENROLLMENTS {
        let student_id = match student_ids.iter().find(|(n, _)| *n == name) {
            Some((_, id)) => *id,
            None => {
                let student = students::ActiveModel {
                    full_name: Set(name.to_string()),
                    phone: Set(None),
                    email: Set(None),
                    note: Set(None),
                    is_active: Set(true),
                    ..Default::default()
                }
                .insert(db)
                .await?;
                println!("  Created student: {name}");
                student_ids.push((name, student.id));
                student.id
            }
        };
        let course_id = *course_ids.get(course_idx).context("unknown course index")?;

        enrollments::ActiveModel {
            student_id: Set(student_id),
            course_id: Set(course_id),
            billing_mode: Set(mode.to_string()),
            discount_pct: Set(Decimal::from(discount)),
            note: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await?;

        if lessons > 0 {
            attendance_months::ActiveModel {
                student_id: Set(student_id),
                course_id: Set(course_id),
                year: Set(today.year()),
                month: Set(month),
                lessons_count: Set(lessons),
                locked: Set(false),
                ..Default::default()
            }
            .insert(db)
            .await?;
        }
    }
    Ok(())
}
