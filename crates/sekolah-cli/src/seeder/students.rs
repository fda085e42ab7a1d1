//! Fake student seeding.
//!
//! Students are generated in parallel and inserted in batches: users first,
//! then password credentials and student profiles keyed by the returned
//! user ids.

use std::collections::HashMap;
use std::time::Instant;

use chrono::NaiveDate;
use fake::Fake;
use fake::faker::address::en::StreetName;
use fake::faker::name::en::Name;
use rayon::prelude::*;
use sekolah_core::hash_password;
use sekolah_models::accounts::{Gender, Role};
use sekolah_models::ids::{ClassId, MajorId, UserId};
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

use super::models::{SeededClass, StudentSeed};
use crate::CliResult;

/// Intake year of the seeded grade 10 classes
const INTAKE_YEAR: i32 = 2024;
const EMAIL_DOMAIN: &str = "siswa.smkn1surabaya.sch.id";
const PLACES_OF_BIRTH: &[&str] = &[
    "Surabaya",
    "Sidoarjo",
    "Gresik",
    "Malang",
    "Mojokerto",
    "Pasuruan",
];

// 11 params per student profile
const BATCH_SIZE: usize = 500;

/// Generates `per_class` students for every class. `offset` keeps NIS, NISN
/// and email unique across repeated runs.
pub fn generate_students(
    classes: &[SeededClass],
    per_class: usize,
    offset: usize,
    password_hash: &str,
) -> Vec<StudentSeed> {
    classes
        .par_iter()
        .enumerate()
        .flat_map(|(class_idx, class)| {
            (0..per_class)
                .map(|student_idx| {
                    let serial = offset + class_idx * per_class + student_idx + 1;
                    generate_student(class, serial, password_hash)
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

fn generate_student(class: &SeededClass, serial: usize, password_hash: &str) -> StudentSeed {
    let enrollment_year = INTAKE_YEAR - i32::from(class.grade - 10);
    let birth_year = enrollment_year - 15;
    let date_of_birth = NaiveDate::from_ymd_opt(birth_year, (1..13).fake(), (1..29).fake())
        .unwrap_or_default();
    let gender = if (0..2).fake::<u8>() == 0 {
        Gender::Male
    } else {
        Gender::Female
    };
    let street: String = StreetName().fake();
    let place = PLACES_OF_BIRTH[(0..PLACES_OF_BIRTH.len()).fake::<usize>()];

    StudentSeed {
        password_hash: password_hash.to_string(),
        email: format!("siswa{:05}@{}", serial, EMAIL_DOMAIN),
        name: Name().fake(),
        nis: format!("{}{:05}", enrollment_year, serial),
        nisn: format!("{:010}", 9_000_000_000u64 + serial as u64),
        class_id: class.id,
        major_id: class.major_id,
        date_of_birth,
        place_of_birth: place.to_string(),
        gender,
        address: format!("Jl. {} No. {}", street, (1..200).fake::<u16>()),
        enrollment_year,
    }
}

/// Seeds fake students into every class in one transaction.
pub async fn seed_students(
    db: &PgPool,
    classes: &[SeededClass],
    per_class: usize,
    password: &str,
) -> CliResult<u64> {
    let start_time = Instant::now();
    println!(
        "🎒 Seeding {} students ({} per class)...",
        classes.len() * per_class,
        per_class
    );

    // Hashed once; every seeded student shares the password.
    let password_hash = hash_password(password).map_err(|e| e.error)?;
    let offset = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM students")
        .fetch_one(db)
        .await?;
    let students = generate_students(classes, per_class, offset as usize, &password_hash);

    let mut tx = db.begin().await?;
    let mut inserted = 0;
    for chunk in students.chunks(BATCH_SIZE) {
        inserted += insert_students_chunk(&mut tx, chunk).await?;
    }
    tx.commit().await?;

    println!(
        "   ✓ Inserted {} students in {:?}",
        inserted,
        start_time.elapsed()
    );
    Ok(inserted)
}

async fn insert_students_chunk(
    tx: &mut Transaction<'_, Postgres>,
    students: &[StudentSeed],
) -> CliResult<u64> {
    if students.is_empty() {
        return Ok(0);
    }

    let mut users = QueryBuilder::<Postgres>::new("INSERT INTO users (email, name, role) ");
    users.push_values(students, |mut row, student| {
        row.push_bind(&student.email)
            .push_bind(&student.name)
            .push_bind(Role::Student);
    });
    users.push(" RETURNING id, email");
    let rows: Vec<(UserId, String)> = users.build_query_as().fetch_all(&mut **tx).await?;
    let ids: HashMap<String, UserId> = rows.into_iter().map(|(id, email)| (email, id)).collect();

    let with_ids = students
        .iter()
        .map(|student| {
            ids.get(&student.email)
                .map(|id| (*id, student))
                .ok_or_else(|| format!("no user id returned for {}", student.email))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut credentials =
        QueryBuilder::<Postgres>::new("INSERT INTO credentials (user_id, provider, password_hash) ");
    credentials.push_values(&with_ids, |mut row, (user_id, student)| {
        row.push_bind(*user_id)
            .push_bind("password")
            .push_bind(&student.password_hash);
    });
    credentials.build().execute(&mut **tx).await?;

    let mut profiles = QueryBuilder::<Postgres>::new(
        "INSERT INTO students (user_id, nis, nisn, class_id, major_id, date_of_birth, \
         place_of_birth, gender, address, enrollment_year) ",
    );
    profiles.push_values(&with_ids, |mut row, (user_id, student)| {
        row.push_bind(*user_id)
            .push_bind(&student.nis)
            .push_bind(&student.nisn)
            .push_bind(student.class_id)
            .push_bind(student.major_id)
            .push_bind(student.date_of_birth)
            .push_bind(&student.place_of_birth)
            .push_bind(student.gender)
            .push_bind(&student.address)
            .push_bind(student.enrollment_year);
    });
    let result = profiles.build().execute(&mut **tx).await?;

    Ok(result.rows_affected())
}

/// Loads every class of the active academic year.
pub async fn active_year_classes(db: &PgPool) -> CliResult<Vec<SeededClass>> {
    let rows = sqlx::query_as::<_, (ClassId, MajorId, i16)>(
        r#"SELECT c.id, c.major_id, c.grade
           FROM classes c
           JOIN academic_years ay ON ay.id = c.academic_year_id
           WHERE ay.is_active AND c.is_active
           ORDER BY c.grade, c.section"#,
    )
    .fetch_all(db)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, major_id, grade)| SeededClass {
            id,
            major_id,
            grade,
        })
        .collect())
}

/// Deletes every seeded student account. Profiles and credentials cascade.
pub async fn clear_students(db: &PgPool) -> CliResult<u64> {
    let start_time = Instant::now();
    println!("🗑️  Clearing seeded students...");

    let result = sqlx::query("DELETE FROM users WHERE role = $1 AND email LIKE $2")
        .bind(Role::Student)
        .bind(format!("%@{}", EMAIL_DOMAIN))
        .execute(db)
        .await?
        .rows_affected();

    println!(
        "   ✓ Deleted {} students in {:?}",
        result,
        start_time.elapsed()
    );
    Ok(result)
}
