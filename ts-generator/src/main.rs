/*!
 * Standalone TypeScript type generator for the careflow frontend.
 *
 * Usage: cargo run (from ts-generator directory)
 */

use careflow_types::{ts_rs::TS, *};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // CARGO_MANIFEST_DIR points to the ts-generator directory, parent is workspace root
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR")?;
    let workspace_root = std::path::Path::new(&manifest_dir)
        .parent()
        .ok_or("Failed to get workspace root")?;
    let export_dir = workspace_root.join("frontend/src/generated");

    println!("🔧 Generating TypeScript bindings for the access control types...");

    // Catalog
    Permission::export_all_to(&export_dir)?;
    PermissionCategory::export_all_to(&export_dir)?;
    PermissionInfo::export_all_to(&export_dir)?;
    RoleName::export_all_to(&export_dir)?;
    RoleInfo::export_all_to(&export_dir)?;

    // Auth payloads
    UserProfile::export_all_to(&export_dir)?;
    LoginRequest::export_all_to(&export_dir)?;
    RegisterRequest::export_all_to(&export_dir)?;
    RefreshRequest::export_all_to(&export_dir)?;
    LogoutRequest::export_all_to(&export_dir)?;
    TokenPair::export_all_to(&export_dir)?;
    AuthSession::export_all_to(&export_dir)?;
    ApiResponse::<TokenPair>::export_all_to(&export_dir)?;

    println!("✅ TypeScript bindings generated successfully!");
    println!("📁 Generated files location: {}", export_dir.display());

    if export_dir.exists() {
        println!("\n📋 Generated files:");
        let mut entries: Vec<_> = std::fs::read_dir(&export_dir)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry
                    .path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| ext == "ts")
                    .unwrap_or(false)
            })
            .collect();

        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            println!("   - {}", entry.file_name().to_string_lossy());
        }
    }

    Ok(())
}
