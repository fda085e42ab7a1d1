pub use sekolah_models::classes::*;
