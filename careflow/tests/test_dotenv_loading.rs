use careflow::settings::load_env_files;
use std::env;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_env_files_precedence() {
    let temp_dir = TempDir::new().unwrap();

    env::remove_var("CAREFLOW_DOTENV_ONLY_ENV");
    env::remove_var("CAREFLOW_DOTENV_LOCAL");
    env::set_var("CAREFLOW_DOTENV_PROCESS", "from_process");

    fs::write(
        temp_dir.path().join(".env"),
        "CAREFLOW_DOTENV_ONLY_ENV=from_env\nCAREFLOW_DOTENV_LOCAL=from_env\nCAREFLOW_DOTENV_PROCESS=from_env\n",
    )
    .unwrap();
    fs::write(
        temp_dir.path().join(".env.local"),
        "CAREFLOW_DOTENV_LOCAL=from_env_local\n",
    )
    .unwrap();

    load_env_files(temp_dir.path());

    assert_eq!(env::var("CAREFLOW_DOTENV_ONLY_ENV").unwrap(), "from_env");
    assert_eq!(env::var("CAREFLOW_DOTENV_LOCAL").unwrap(), "from_env_local");
    assert_eq!(env::var("CAREFLOW_DOTENV_PROCESS").unwrap(), "from_process");

    env::remove_var("CAREFLOW_DOTENV_ONLY_ENV");
    env::remove_var("CAREFLOW_DOTENV_LOCAL");
    env::remove_var("CAREFLOW_DOTENV_PROCESS");
}

#[test]
fn test_missing_env_files_are_ignored() {
    let temp_dir = TempDir::new().unwrap();
    load_env_files(temp_dir.path());
}
