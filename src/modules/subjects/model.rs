pub use sekolah_models::subjects::*;
