//! Sample classes for the first three majors.

use sekolah_models::classes::{DEFAULT_MAX_STUDENTS, default_class_name};
use sekolah_models::ids::{AcademicYearId, ClassId};
use sqlx::PgPool;

use super::models::{SeededClass, SeededMajor};
use crate::CliResult;

const MAJORS_WITH_CLASSES: usize = 3;
const SECTIONS_PER_GRADE: u8 = 2;

/// Seeds grades 10 to 12 with two sections each for the first three majors.
/// Returns every matching class, including ones that already existed.
pub async fn seed_classes(
    db: &PgPool,
    academic_year_id: AcademicYearId,
    majors: &[SeededMajor],
) -> CliResult<Vec<SeededClass>> {
    println!("🏫 Seeding classes...");
    let mut classes = Vec::new();

    for major in majors.iter().take(MAJORS_WITH_CLASSES) {
        for grade in 10..=12i16 {
            for section in 1..=SECTIONS_PER_GRADE {
                let section = section.to_string();
                let id = sqlx::query_scalar::<_, ClassId>(
                    r#"INSERT INTO classes
                           (academic_year_id, major_id, grade, section, name, max_students)
                       VALUES ($1, $2, $3, $4, $5, $6)
                       ON CONFLICT ON CONSTRAINT classes_year_major_grade_section_key
                       DO UPDATE SET section = EXCLUDED.section
                       RETURNING id"#,
                )
                .bind(academic_year_id)
                .bind(major.id)
                .bind(grade)
                .bind(&section)
                .bind(default_class_name(grade, &major.code, &section))
                .bind(DEFAULT_MAX_STUDENTS)
                .fetch_one(db)
                .await?;

                classes.push(SeededClass {
                    id,
                    major_id: major.id,
                    grade,
                });
            }
        }
    }

    println!("   ✓ {} classes ready", classes.len());
    Ok(classes)
}
