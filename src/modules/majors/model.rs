pub use sekolah_models::majors::*;
