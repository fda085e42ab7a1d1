pub use sekolah_models::teachers::*;
