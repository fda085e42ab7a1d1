pub use sekolah_models::auth::*;
