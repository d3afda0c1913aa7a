pub mod config;

use std::path::Path;

/// Loads `.env.local` and `.env` from `dir`. Variables already present in
/// the environment are kept, and `.env.local` wins over `.env`.
pub fn load_env_files(dir: &Path) {
    for name in [".env.local", ".env"] {
        let path = dir.join(name);
        match dotenvy::from_path(&path) {
            Ok(()) => tracing::debug!("Loaded {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => eprintln!("Ignoring {}: {}", path.display(), e),
        }
    }
}
