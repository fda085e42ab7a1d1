//! Reference dataset seeding.
//!
//! Seeds an admin account, the 2024/2025 academic year with both semesters,
//! five majors with their subjects, two sections per grade for the first
//! three majors, and optionally fake students for every seeded class.
//! Re-running the seeder skips rows that already exist.

pub mod calendar;
pub mod catalog;
pub mod classes;
pub mod models;
pub mod students;

use std::time::Instant;

use sqlx::PgPool;

use crate::CliResult;
use crate::accounts::{NewAdmin, create_admin};

pub use models::SeedConfig;

pub const SEED_ADMIN_EMAIL: &str = "admin@smkn1surabaya.sch.id";

pub async fn seed_all(db: &PgPool, config: SeedConfig) -> CliResult<()> {
    let start_time = Instant::now();
    println!("🌱 Seeding database...\n");

    seed_admin(db, &config.admin_password).await?;
    let academic_year_id = calendar::seed_academic_year(db).await?;
    let majors = catalog::seed_majors(db).await?;
    catalog::seed_subjects(db, &majors).await?;
    let classes = classes::seed_classes(db, academic_year_id, &majors).await?;

    if config.students_per_class > 0 {
        students::seed_students(db, &classes, config.students_per_class, &config.admin_password)
            .await?;
    }

    println!("\n✨ Seeding completed in {:?}", start_time.elapsed());
    println!("\n🔐 Admin credentials:");
    println!("   Email: {}", SEED_ADMIN_EMAIL);
    println!("   Password: {}", config.admin_password);
    Ok(())
}

async fn seed_admin(db: &PgPool, password: &str) -> CliResult<()> {
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(SEED_ADMIN_EMAIL)
            .fetch_one(db)
            .await?;
    if exists {
        println!("👤 Admin {} already exists, skipping", SEED_ADMIN_EMAIL);
        return Ok(());
    }

    create_admin(
        db,
        &NewAdmin {
            email: SEED_ADMIN_EMAIL.to_string(),
            name: "Administrator".to_string(),
            password: password.to_string(),
            position: Some("Kepala Sekolah".to_string()),
            phone: Some("031-1234567".to_string()),
        },
    )
    .await?;
    println!("👤 Created admin {}", SEED_ADMIN_EMAIL);
    Ok(())
}
