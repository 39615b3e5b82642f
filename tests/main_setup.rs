use edu_portal::{AppConfig, config::Env};
use serial_test::serial;
use std::{env, panic, time::Duration};

const CONFIG_VARS: &[&str] = &[
    "APP_ENV",
    "EDU_API_BASE_URL",
    "PORTAL_BIND_ADDR",
    "EDU_API_TIMEOUT_SECS",
];

// --- Setup/Teardown Utilities ---

/// Utility to run a test function and restore environment variables afterward
fn run_with_env<T, R>(test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    // Save current environment variables
    let originals: Vec<(String, Option<String>)> = CONFIG_VARS
        .iter()
        .map(|&var| (var.to_string(), env::var(var).ok()))
        .collect();

    // Start every test from a clean slate
    unsafe {
        for var in CONFIG_VARS {
            env::remove_var(var);
        }
    }

    let result = panic::catch_unwind(test);

    // Restore original environment variables
    for (key, original_value) in originals.into_iter().rev() {
        unsafe {
            if let Some(val) = original_value {
                env::set_var(&key, val);
            } else {
                env::remove_var(&key);
            }
        }
    }

    // Re-panic if the test failed
    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
#[serial]
fn test_app_config_production_fail_fast() {
    // Production without an API base URL must refuse to start.
    let result = panic::catch_unwind(|| {
        run_with_env(|| {
            unsafe {
                env::set_var("APP_ENV", "production");
            }
            AppConfig::load()
        })
    });

    assert!(
        result.is_err(),
        "Production config loading should panic on a missing EDU_API_BASE_URL"
    );
}

#[test]
#[serial]
fn test_app_config_local_env_defaults() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "local");
        }
        AppConfig::load()
    });

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.api_base_url, "http://127.0.0.1:8000");
    assert_eq!(config.bind_addr, "0.0.0.0:3000");
    assert_eq!(config.api_timeout, Duration::from_secs(120));
    assert!(!config.secure_cookies());
}

#[test]
#[serial]
fn test_app_config_production_overrides() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "production");
            env::set_var("EDU_API_BASE_URL", "https://api.school.example/");
            env::set_var("PORTAL_BIND_ADDR", "127.0.0.1:8080");
            env::set_var("EDU_API_TIMEOUT_SECS", "30");
        }
        AppConfig::load()
    });

    assert_eq!(config.env, Env::Production);
    // Trailing slash is trimmed so paths join cleanly.
    assert_eq!(config.api_base_url, "https://api.school.example");
    assert_eq!(config.bind_addr, "127.0.0.1:8080");
    assert_eq!(config.api_timeout, Duration::from_secs(30));
    assert!(config.secure_cookies());
}

#[test]
#[serial]
fn test_app_config_rejects_malformed_timeout() {
    let result = panic::catch_unwind(|| {
        run_with_env(|| {
            unsafe {
                env::set_var("EDU_API_TIMEOUT_SECS", "soon");
            }
            AppConfig::load()
        })
    });
    assert!(result.is_err());
}
