pub use sekolah_models::academic_years::*;
