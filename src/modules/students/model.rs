pub use sekolah_models::students::*;
