//! Majors and subjects of the reference curriculum.

use sekolah_models::ids::MajorId;
use sqlx::PgPool;

use super::models::{MajorSeed, SeededMajor, SubjectSeed};
use crate::CliResult;

pub const MAJORS: &[MajorSeed] = &[
    MajorSeed {
        code: "TKJ",
        name: "Teknik Komputer dan Jaringan",
        description: "Instalasi PC dan LAN, troubleshooting jaringan, dan keamanan jaringan.",
    },
    MajorSeed {
        code: "RPL",
        name: "Rekayasa Perangkat Lunak",
        description: "Pemrograman, pengembangan aplikasi web dan mobile, serta basis data.",
    },
    MajorSeed {
        code: "MM",
        name: "Multimedia",
        description: "Desain grafis, animasi, video editing, fotografi, dan konten multimedia.",
    },
    MajorSeed {
        code: "TKRO",
        name: "Teknik Kendaraan Ringan Otomotif",
        description: "Perawatan, perbaikan, dan teknologi kendaraan ringan.",
    },
    MajorSeed {
        code: "TEI",
        name: "Teknik Elektronika Industri",
        description: "Sistem kontrol elektronik, PLC, dan otomasi industri.",
    },
];

const fn common(code: &'static str, name: &'static str, credits: i32) -> SubjectSeed {
    SubjectSeed {
        code,
        name,
        major_code: None,
        credits,
    }
}

const fn major(
    major_code: &'static str,
    code: &'static str,
    name: &'static str,
    credits: i32,
) -> SubjectSeed {
    SubjectSeed {
        code,
        name,
        major_code: Some(major_code),
        credits,
    }
}

pub const SUBJECTS: &[SubjectSeed] = &[
    common("PAI", "Pendidikan Agama Islam", 3),
    common("PPKN", "Pendidikan Pancasila dan Kewarganegaraan", 2),
    common("BIND", "Bahasa Indonesia", 4),
    common("MTK", "Matematika", 4),
    common("BING", "Bahasa Inggris", 3),
    common("SEJARAH", "Sejarah Indonesia", 2),
    common("PJOK", "Pendidikan Jasmani, Olahraga, dan Kesehatan", 2),
    common("SBK", "Seni Budaya", 2),
    common("PKWU", "Prakarya dan Kewirausahaan", 2),
    major("TKJ", "TKJ-JARKOM", "Jaringan Komputer", 6),
    major("TKJ", "TKJ-SISKO", "Sistem Komputer", 4),
    major("TKJ", "TKJ-ADSIS", "Administrasi Sistem", 4),
    major("TKJ", "TKJ-KEAMANAN", "Keamanan Jaringan", 4),
    major("RPL", "RPL-PEMWEB", "Pemrograman Web", 6),
    major("RPL", "RPL-MOBILE", "Pemrograman Mobile", 6),
    major("RPL", "RPL-BASIS-DATA", "Basis Data", 4),
    major("RPL", "RPL-PBO", "Pemrograman Berorientasi Objek", 4),
    major("MM", "MM-DG", "Desain Grafis", 6),
    major("MM", "MM-ANIMASI", "Animasi 2D/3D", 6),
    major("MM", "MM-VIDEO", "Video Editing", 4),
    major("MM", "MM-FOTOGRAFI", "Fotografi", 4),
];

/// Seeds [`MAJORS`], keeping rows whose code already exists. Returns every
/// reference major in declaration order.
pub async fn seed_majors(db: &PgPool) -> CliResult<Vec<SeededMajor>> {
    println!("🎓 Seeding {} majors...", MAJORS.len());
    let mut seeded = Vec::with_capacity(MAJORS.len());

    for seed in MAJORS {
        let id = sqlx::query_scalar::<_, MajorId>(
            r#"INSERT INTO majors (code, name, description)
               VALUES ($1, $2, $3)
               ON CONFLICT ON CONSTRAINT majors_code_key DO UPDATE SET code = EXCLUDED.code
               RETURNING id"#,
        )
        .bind(seed.code)
        .bind(seed.name)
        .bind(seed.description)
        .fetch_one(db)
        .await?;

        seeded.push(SeededMajor {
            id,
            code: seed.code.to_string(),
        });
    }

    println!("   ✓ Majors ready");
    Ok(seeded)
}

/// Seeds [`SUBJECTS`]; core flag is set on every reference subject.
pub async fn seed_subjects(db: &PgPool, majors: &[SeededMajor]) -> CliResult<()> {
    println!("📖 Seeding {} subjects...", SUBJECTS.len());
    let mut inserted = 0;

    for seed in SUBJECTS {
        let major_id = match seed.major_code {
            Some(code) => Some(
                majors
                    .iter()
                    .find(|m| m.code == code)
                    .map(|m| m.id)
                    .ok_or_else(|| format!("major {} was not seeded", code))?,
            ),
            None => None,
        };

        let result = sqlx::query(
            r#"INSERT INTO subjects (code, name, major_id, is_core, credits)
               VALUES ($1, $2, $3, TRUE, $4)
               ON CONFLICT ON CONSTRAINT subjects_code_key DO NOTHING"#,
        )
        .bind(seed.code)
        .bind(seed.name)
        .bind(major_id)
        .bind(seed.credits)
        .execute(db)
        .await?;
        inserted += result.rows_affected();
    }

    println!("   ✓ Inserted {} new subjects", inserted);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_subject_codes_are_unique() {
        let codes: HashSet<_> = SUBJECTS.iter().map(|s| s.code).collect();
        assert_eq!(codes.len(), SUBJECTS.len());
    }

    #[test]
    fn test_major_subjects_reference_seeded_majors() {
        for subject in SUBJECTS {
            if let Some(code) = subject.major_code {
                assert!(MAJORS.iter().any(|m| m.code == code), "{}", subject.code);
            }
            assert!((1..=8).contains(&subject.credits));
        }
    }
}
